// ── Core error types ──
//
// User-facing errors from cnwave-core. Callers see these instead of the
// raw controller taxonomy; the `From<cnwave_api::Error>` impl decides
// which bucket each transport or controller failure lands in.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to controller: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Controller not connected")]
    ControllerDisconnected,

    #[error("Controller request timed out: {message}")]
    Timeout { message: String },

    // ── Controller errors ────────────────────────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
        /// The controller's reply body, when it sent one.
        details: Option<serde_json::Value>,
    },

    #[error("Unexpected controller response: {message}")]
    UnexpectedResponse { message: String },

    // ── Override errors ──────────────────────────────────────────────
    #[error("Override update rejected: {message}")]
    OverrideRejected { message: String },

    #[error("Override value not set: {path}")]
    OverrideMissing { path: String },

    // ── Workflow errors ──────────────────────────────────────────────
    #[error("Invalid {role} record: {message}")]
    InvalidNodeSpec { role: String, message: String },

    #[error("Node {node} did not come online within {timeout_secs}s")]
    NodeOfflineTimeout { node: String, timeout_secs: u64 },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

// ── Conversion from controller errors ────────────────────────────────

impl From<cnwave_api::Error> for CoreError {
    fn from(err: cnwave_api::Error) -> Self {
        use cnwave_api::Error as Api;

        match err {
            Api::Authentication { message, .. } => CoreError::AuthenticationFailed { message },
            Api::ApiTimeout { message, .. } => CoreError::Timeout { message },
            Api::ApiConnection { message, .. } => CoreError::ConnectionFailed { reason: message },
            Api::ApiRequest {
                message,
                status,
                details,
            } => CoreError::Api {
                message,
                status,
                details,
            },
            err @ (Api::OverrideShape { .. } | Api::EmptyOverrides { .. }) => {
                CoreError::OverrideRejected {
                    message: err.to_string(),
                }
            }
            Api::Deserialization { message, .. } => CoreError::UnexpectedResponse { message },
            Api::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            Api::Tls(msg) => CoreError::ConnectionFailed {
                reason: format!("TLS error: {msg}"),
            },
        }
    }
}

impl CoreError {
    /// Structured controller reply attached to an API failure.
    pub fn details(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Api { details, .. } => details.as_ref(),
            _ => None,
        }
    }
}
