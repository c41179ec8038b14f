//! Clap derive structures for the `cnwave` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// cnwave -- drive a cnWave mesh controller from the command line
#[derive(Debug, Parser)]
#[command(
    name = "cnwave",
    version,
    about = "Provision and inspect cnWave mesh networks",
    long_about = "Talks to a cnWave E2E controller over its HTTPS API.\n\n\
        Provisions two-node links, tunes TDD and MCS overrides, and waits\n\
        for links to come up and stay up.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Controller profile to use
    #[arg(long, short = 'p', env = "CNWAVE_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Controller address (overrides profile)
    #[arg(long, short = 'H', env = "CNWAVE_HOST", global = true)]
    pub host: Option<String>,

    /// Controller HTTPS port (overrides profile)
    #[arg(long, env = "CNWAVE_PORT", global = true)]
    pub port: Option<u16>,

    /// Login user (overrides profile)
    #[arg(long, short = 'u', env = "CNWAVE_USERNAME", global = true)]
    pub username: Option<String>,

    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', env = "CNWAVE_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "CNWAVE_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "CNWAVE_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the full topology (sites, nodes, links)
    #[command(alias = "topo")]
    Topology,

    /// List nodes with their online status
    Nodes,

    /// List links
    Links,

    /// Report whether the link between two nodes is alive
    LinkAlive {
        /// A-side node name
        a_node: String,
        /// Z-side node name
        z_node: String,
    },

    /// Provision links
    Link(LinkArgs),

    /// Read or set the network-wide TDD slot ratio
    Tdd(TddArgs),

    /// Read or set the maximum MCS index
    Mcs(McsArgs),

    /// Print a decoded override blob
    Overrides(OverridesArgs),

    /// Block until links come up
    Wait(WaitArgs),

    /// Firmware versions of the PoP and DN nodes
    Versions(VersionsArgs),

    /// Software and firmware of the controller host
    DeviceInfo,

    /// Inspect CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Link ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LinkArgs {
    #[command(subcommand)]
    pub command: LinkCommand,
}

#[derive(Debug, Subcommand)]
pub enum LinkCommand {
    /// Clear the topology, add both nodes and a wireless link, then
    /// wait for the link to come alive
    Create {
        /// JSON file holding {"node_a": {...}, "node_b": {...}}
        #[arg(long = "from-file", short = 'F')]
        from_file: PathBuf,
    },
}

// ── Overrides ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct TddArgs {
    #[command(subcommand)]
    pub command: TddCommand,
}

#[derive(Debug, Subcommand)]
pub enum TddCommand {
    /// Current tddSlotRatio
    Get,
    /// Write a new tddSlotRatio
    Set { value: i64 },
}

#[derive(Debug, Args)]
pub struct McsArgs {
    #[command(subcommand)]
    pub command: McsCommand,
}

#[derive(Debug, Subcommand)]
pub enum McsCommand {
    /// Current laMaxMcs of one node
    Get {
        /// Node name [default: PoP]
        #[arg(long)]
        node: Option<String>,
    },
    /// Write laMaxMcs on every node
    Set { value: i64 },
}

#[derive(Debug, Args)]
pub struct OverridesArgs {
    #[command(subcommand)]
    pub command: OverridesCommand,
}

#[derive(Debug, Subcommand)]
pub enum OverridesCommand {
    /// Network-wide overrides
    Network,
    /// Per-node overrides
    Node,
}

// ── Wait ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WaitArgs {
    #[command(subcommand)]
    pub command: WaitCommand,
}

#[derive(Debug, Subcommand)]
pub enum WaitCommand {
    /// Wait until any link reports alive
    LinkActive {
        /// Give up after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Wait until a link stays alive for a full window
    LinkStable {
        /// Give up after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
        /// Seconds between polls
        #[arg(long)]
        interval: Option<u64>,
        /// Seconds the link must stay alive
        #[arg(long)]
        window: Option<u64>,
    },
}

// ── Diagnostics ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct VersionsArgs {
    /// PoP node name [default: first PoP]
    #[arg(long)]
    pub pop: Option<String>,

    /// DN node name [default: first non-PoP]
    #[arg(long)]
    pub dn: Option<String>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,
    /// Print the effective configuration (passwords masked)
    Show,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
