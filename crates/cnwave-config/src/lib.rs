//! Shared configuration for the cnwave CLI.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext), and
//! translation to `cnwave_core::ControllerConfig`. The CLI layers its
//! flag overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use cnwave_core::{ControllerConfig, RetryPolicy, TlsVerification, WorkflowTimings};

/// Keyring service name; accounts are `<profile>/password`.
pub const KEYRING_SERVICE: &str = "cnwave";
pub const DEFAULT_PORT: u16 = 3443;

const ENV_PREFIX: &str = "CNWAVE_";
const PASSWORD_ENV: &str = "CNWAVE_PASSWORD";
const USERNAME_ENV: &str = "CNWAVE_USERNAME";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{name}' not found in config")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named controller profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    15
}

/// A named controller profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Controller address, without scheme.
    #[serde(default)]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Full controller URL. Takes precedence over `host` and `port`.
    pub url: Option<String>,

    pub username: Option<String>,

    /// Environment variable holding the password.
    pub password_env: Option<String>,

    /// Password in plaintext (prefer keyring or env).
    pub password: Option<String>,

    /// Accept self-signed certificates. Defaults to true for controllers.
    pub insecure: Option<bool>,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override the default request timeout (seconds).
    pub timeout: Option<u64>,

    #[serde(default)]
    pub retry: RetrySettings,

    #[serde(default)]
    pub workflow: WorkflowSettings,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

/// `[profiles.<name>.retry]`
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct RetrySettings {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay")]
    pub base_delay_secs: f64,
    #[serde(default = "default_max_jitter")]
    pub max_jitter_secs: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_secs: default_base_delay(),
            max_jitter_secs: default_max_jitter(),
        }
    }
}

fn default_max_attempts() -> u32 {
    5
}
fn default_base_delay() -> f64 {
    2.0
}
fn default_max_jitter() -> f64 {
    1.0
}

impl RetrySettings {
    pub fn to_policy(&self) -> Result<RetryPolicy, ConfigError> {
        Ok(
            RetryPolicy::new(self.max_attempts, seconds("retry.base_delay_secs", self.base_delay_secs)?)
                .with_jitter(seconds("retry.max_jitter_secs", self.max_jitter_secs)?),
        )
    }
}

/// `[profiles.<name>.workflow]`: one-touch polling budgets.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct WorkflowSettings {
    #[serde(default = "default_online_timeout")]
    pub online_timeout_secs: f64,
    #[serde(default = "default_online_interval")]
    pub online_interval_secs: f64,
    #[serde(default = "default_validate_timeout")]
    pub validate_timeout_secs: f64,
    #[serde(default = "default_validate_interval")]
    pub validate_interval_secs: f64,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            online_timeout_secs: default_online_timeout(),
            online_interval_secs: default_online_interval(),
            validate_timeout_secs: default_validate_timeout(),
            validate_interval_secs: default_validate_interval(),
        }
    }
}

fn default_online_timeout() -> f64 {
    300.0
}
fn default_online_interval() -> f64 {
    10.0
}
fn default_validate_timeout() -> f64 {
    120.0
}
fn default_validate_interval() -> f64 {
    5.0
}

impl WorkflowSettings {
    pub fn to_timings(&self) -> Result<WorkflowTimings, ConfigError> {
        Ok(WorkflowTimings {
            online_timeout: seconds("workflow.online_timeout_secs", self.online_timeout_secs)?,
            online_interval: seconds("workflow.online_interval_secs", self.online_interval_secs)?,
            validate_timeout: seconds("workflow.validate_timeout_secs", self.validate_timeout_secs)?,
            validate_interval: seconds("workflow.validate_interval_secs", self.validate_interval_secs)?,
        })
    }
}

fn seconds(field: &str, value: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(value).map_err(|e| ConfigError::Validation {
        field: field.into(),
        reason: e.to_string(),
    })
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "cnwave", "cnwave").map_or_else(
        || {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("cnwave");
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path`, merged over defaults and under `CNWAVE_` env vars.
///
/// Nested keys use a double underscore: `CNWAVE_DEFAULTS__OUTPUT=json`.
/// A missing file is not an error.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    Ok(figment.extract()?)
}

/// Load config, returning a default if it cannot be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

/// Copy of `config` with plaintext passwords masked.
pub fn redact(config: &Config) -> Config {
    let mut shown = config.clone();
    for profile in shown.profiles.values_mut() {
        if profile.password.is_some() {
            profile.password = Some("********".into());
        }
    }
    shown
}

/// Render `config` as TOML with plaintext passwords masked.
pub fn render_redacted(config: &Config) -> Result<String, ConfigError> {
    Ok(toml::to_string_pretty(&redact(config))?)
}

// ── Credential resolution ───────────────────────────────────────────

/// Username from the profile, else `CNWAVE_USERNAME`.
pub fn resolve_username(profile: &Profile, profile_name: &str) -> Result<String, ConfigError> {
    profile
        .username
        .clone()
        .or_else(|| std::env::var(USERNAME_ENV).ok())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })
}

/// Password from `password_env`, then `CNWAVE_PASSWORD`, then the system
/// keyring, then plaintext config.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    resolve_password_from(
        profile,
        profile_name,
        |name| std::env::var(name).ok(),
        |account| {
            keyring::Entry::new(KEYRING_SERVICE, account)
                .and_then(|entry| entry.get_password())
                .ok()
        },
    )
}

fn resolve_password_from(
    profile: &Profile,
    profile_name: &str,
    env: impl Fn(&str) -> Option<String>,
    keyring: impl Fn(&str) -> Option<String>,
) -> Result<SecretString, ConfigError> {
    let found = profile
        .password_env
        .as_deref()
        .and_then(&env)
        .or_else(|| env(PASSWORD_ENV))
        .or_else(|| keyring(&format!("{profile_name}/password")))
        .or_else(|| profile.password.clone());

    found
        .map(SecretString::from)
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })
}

/// Look up a profile by name.
pub fn find_profile<'a>(config: &'a Config, name: &str) -> Result<&'a Profile, ConfigError> {
    config
        .profiles
        .get(name)
        .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
}

/// `https://<host>:<port>` for a profile.
pub fn controller_url(host: &str, port: u16) -> Result<url::Url, ConfigError> {
    format!("https://{host}:{port}")
        .parse()
        .map_err(|e: url::ParseError| ConfigError::Validation {
            field: "host".into(),
            reason: format!("'{host}': {e}"),
        })
}

/// Build a `ControllerConfig` from a profile, with no flag overrides.
pub fn profile_to_controller_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ControllerConfig, ConfigError> {
    let url = match profile.url.as_deref() {
        Some(raw) => raw.parse().map_err(|e: url::ParseError| ConfigError::Validation {
            field: "url".into(),
            reason: format!("'{raw}': {e}"),
        })?,
        None if profile.host.trim().is_empty() => {
            return Err(ConfigError::Validation {
                field: "host".into(),
                reason: format!("profile '{profile_name}' has no host"),
            });
        }
        None => controller_url(&profile.host, profile.port)?,
    };
    let username = resolve_username(profile, profile_name)?;
    let password = resolve_password(profile, profile_name)?;

    let mut config = ControllerConfig::new(url, username, password);
    config.tls = tls_for(profile);
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.retry = profile.retry.to_policy()?;
    config.workflow = profile.workflow.to_timings()?;
    Ok(config)
}

fn tls_for(profile: &Profile) -> TlsVerification {
    match (&profile.ca_cert, profile.insecure) {
        (_, Some(true)) | (None, None) => TlsVerification::DangerAcceptInvalid,
        (Some(ca), _) => TlsVerification::CustomCa(ca.clone()),
        (None, Some(false)) => TlsVerification::SystemDefaults,
    }
}
