//! Firmware and device diagnostics.

use tabled::Tabled;

use cnwave_core::{Controller, NodeVersion};

use crate::cli::VersionsArgs;
use crate::error::CliError;
use crate::output::{self, Output};

#[derive(Tabled)]
struct VersionRow {
    #[tabled(rename = "Node")]
    name: String,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "PoP")]
    pop: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Board")]
    board: String,
}

impl From<&NodeVersion> for VersionRow {
    fn from(v: &NodeVersion) -> Self {
        Self {
            name: v.name.clone(),
            mac: v.mac_addr.clone(),
            pop: if v.pop_node { "yes".into() } else { String::new() },
            version: v.version.clone(),
            board: v.hardware_board_id.clone().unwrap_or_default(),
        }
    }
}

/// PoP/DN summary; with `--output table` the per-node report follows.
pub async fn versions(controller: &Controller, args: VersionsArgs, out: &Output) -> Result<(), CliError> {
    let versions = controller
        .pop_dn_versions(args.pop.as_deref(), args.dn.as_deref())
        .await?;

    let rendered = output::render_single(
        out.format,
        &versions,
        |v| output::detail_lines(&[("PoP", v.pop.clone()), ("DN", v.dn.clone())]),
        |v| format!("{}\n{}", v.pop, v.dn),
    )?;
    out.print(&rendered);

    if out.format == crate::cli::OutputFormat::Table {
        let per_node = controller.node_versions().await?;
        if !per_node.is_empty() {
            let table = output::render_list(out.format, &per_node, |v| VersionRow::from(v), |v| v.name.clone())?;
            out.print(&format!("\n{table}"));
        }
    }
    Ok(())
}

pub async fn device_info(controller: &Controller, out: &Output) -> Result<(), CliError> {
    let info = controller.device_info().await?;
    let rendered = output::render_single(
        out.format,
        &info,
        |i| {
            output::detail_lines(&[
                ("Software", i.sw_ver.clone()),
                ("Firmware", i.fw_version.clone()),
                ("Model", i.model.clone()),
                ("Type", i.device_type.clone()),
            ])
        },
        |i| i.sw_ver.clone(),
    )?;
    out.print(&rendered);
    Ok(())
}
