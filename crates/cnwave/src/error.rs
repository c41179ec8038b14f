//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with help
//! text and a process exit code.

use miette::Diagnostic;
use thiserror::Error;

use cnwave_config::ConfigError;
use cnwave_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const LINK_DOWN: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the controller: {reason}")]
    #[diagnostic(
        code(cnwave::connection_failed),
        help(
            "Check that the controller is up and the host/port are right.\n\
             Self-signed certificates need --insecure or a ca_cert in the profile."
        )
    )]
    ConnectionFailed { reason: String },

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(cnwave::auth_failed),
        help("Check the username and the password source (password_env, CNWAVE_PASSWORD, keyring).")
    )]
    AuthFailed { message: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(cnwave::no_credentials),
        help(
            "Set username/password_env in the profile, or export CNWAVE_USERNAME and CNWAVE_PASSWORD."
        )
    )]
    NoCredentials { profile: String },

    #[error("Controller request timed out: {message}")]
    #[diagnostic(
        code(cnwave::timeout),
        help("Increase the request timeout with --timeout.")
    )]
    Timeout { message: String },

    // ── Controller ───────────────────────────────────────────────────
    #[error("Controller rejected the request: {message}")]
    #[diagnostic(code(cnwave::api_error))]
    Api {
        message: String,
        /// Controller reply body, shown as help.
        #[help]
        reply: Option<String>,
    },

    #[error("{message}")]
    #[diagnostic(
        code(cnwave::override_rejected),
        help("Run: cnwave overrides network (or node) to inspect the stored blob.")
    )]
    OverrideRejected { message: String },

    #[error("Override value not set: {path}")]
    #[diagnostic(code(cnwave::override_missing))]
    OverrideMissing { path: String },

    // ── Workflow ─────────────────────────────────────────────────────
    #[error("Invalid {role} record: {message}")]
    #[diagnostic(code(cnwave::invalid_node))]
    InvalidNode { role: String, message: String },

    #[error("Node {node} did not come online within {timeout_secs}s")]
    #[diagnostic(
        code(cnwave::node_offline),
        help("The node was provisioned but never reported status 3. Check power and alignment.")
    )]
    NodeOffline { node: String, timeout_secs: u64 },

    #[error("{what}")]
    #[diagnostic(code(cnwave::link_down))]
    LinkDown { what: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(code(cnwave::profile_not_found), help("Available profiles: {available}"))]
    ProfileNotFound { name: String, available: String },

    #[error("No controller configured")]
    #[diagnostic(
        code(cnwave::no_config),
        help("Pass --host, or add a profile to {path}")
    )]
    NoConfig { path: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(cnwave::validation))]
    Validation { field: String, reason: String },

    #[error(transparent)]
    #[diagnostic(code(cnwave::config))]
    Config(ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(cnwave::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),

    #[error("Could not render YAML: {0}")]
    #[diagnostic(code(cnwave::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::Timeout { .. } | Self::NodeOffline { .. } => exit_code::TIMEOUT,
            Self::LinkDown { .. } => exit_code::LINK_DOWN,
            Self::Validation { .. } | Self::InvalidNode { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { reason } => CliError::ConnectionFailed { reason },
            CoreError::ControllerDisconnected => CliError::ConnectionFailed {
                reason: "not connected".into(),
            },
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::Timeout { message } => CliError::Timeout { message },
            CoreError::Api {
                message, details, ..
            } => CliError::Api {
                message,
                reply: details.map(|body| body.to_string()),
            },
            CoreError::UnexpectedResponse { message } => CliError::Api {
                message,
                reply: None,
            },
            CoreError::OverrideRejected { message } => CliError::OverrideRejected { message },
            CoreError::OverrideMissing { path } => CliError::OverrideMissing { path },
            CoreError::InvalidNodeSpec { role, message } => CliError::InvalidNode { role, message },
            CoreError::NodeOfflineTimeout { node, timeout_secs } => {
                CliError::NodeOffline { node, timeout_secs }
            }
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_kind() {
        let auth: CliError = CoreError::AuthenticationFailed {
            message: "bad password".into(),
        }
        .into();
        assert_eq!(auth.exit_code(), exit_code::AUTH);

        let offline: CliError = CoreError::NodeOfflineTimeout {
            node: "node-V3000-ddee02".into(),
            timeout_secs: 300,
        }
        .into();
        assert_eq!(offline.exit_code(), exit_code::TIMEOUT);

        let creds: CliError = ConfigError::NoCredentials {
            profile: "lab".into(),
        }
        .into();
        assert_eq!(creds.exit_code(), exit_code::AUTH);
    }
}
