use thiserror::Error;

/// Top-level error type for the `cnwave-api` crate.
///
/// The first four variants are the controller taxonomy every caller sees,
/// no matter how many retries happened underneath. Each carries an optional
/// structured `details` payload (usually the controller's JSON body).
/// `cnwave-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Controller taxonomy ─────────────────────────────────────────
    /// Login rejected (bad credentials, unexpected login response, etc.)
    #[error("Authentication failed: {message}")]
    Authentication {
        message: String,
        details: Option<serde_json::Value>,
    },

    /// Non-2xx status, non-JSON body, or an application-level `success: false`.
    #[error("API request failed: {message}")]
    ApiRequest {
        message: String,
        status: Option<u16>,
        details: Option<serde_json::Value>,
    },

    /// Request exceeded the configured timeout.
    #[error("API timeout: {message}")]
    ApiTimeout {
        message: String,
        details: Option<serde_json::Value>,
    },

    /// Controller host unreachable (connection refused, DNS failure, etc.)
    #[error("API connection error: {message}")]
    ApiConnection {
        message: String,
        details: Option<serde_json::Value>,
    },

    // ── Override blobs ──────────────────────────────────────────────
    /// A strict override mutation found the blob missing required structure.
    #[error("Override blob is missing `{path}`; refusing to write")]
    OverrideShape { path: String },

    /// The controller returned no overrides to modify.
    #[error("{scope} overrides are empty; refusing to write")]
    EmptyOverrides { scope: &'static str },

    // ── Data ────────────────────────────────────────────────────────
    /// A successful response did not match the expected record shape.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Construction ────────────────────────────────────────────────
    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// HTTP client could not be built.
    #[error("TLS error: {0}")]
    Tls(String),
}

impl Error {
    /// Classify a transport failure into the controller taxonomy.
    pub(crate) fn from_transport(err: &reqwest::Error, context: &str) -> Self {
        if err.is_timeout() {
            Self::ApiTimeout {
                message: format!("{context} timed out"),
                details: None,
            }
        } else if err.is_connect() {
            Self::ApiConnection {
                message: format!("{context}: unable to connect to controller ({err})"),
                details: None,
            }
        } else {
            Self::ApiRequest {
                message: format!("{context}: {err}"),
                status: err.status().map(|s| s.as_u16()),
                details: None,
            }
        }
    }

    /// The structured payload attached to a taxonomy error, if any.
    pub fn details(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Authentication { details, .. }
            | Self::ApiRequest { details, .. }
            | Self::ApiTimeout { details, .. }
            | Self::ApiConnection { details, .. } => details.as_ref(),
            _ => None,
        }
    }

    /// HTTP status that produced this error, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ApiRequest { status, .. } => *status,
            _ => None,
        }
    }

    /// Returns `true` if the controller still rejected the token after
    /// re-authentication.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}
