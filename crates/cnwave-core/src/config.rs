// ── Runtime connection configuration ──
//
// Describes how to reach one controller and how patient to be with it.
// Carries credentials and tuning but never touches disk; the CLI builds
// a `ControllerConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use cnwave_api::{Credentials, RetryPolicy, TlsMode, TransportConfig};

use crate::monitor::{LINK_ACTIVE_TIMEOUT, StabilitySettings};
use crate::workflow::WorkflowTimings;

/// Pause after an MCS change before the radios are polled again.
pub const MCS_SETTLE_DELAY: Duration = Duration::from_secs(4);

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification. Controllers ship self-signed certificates.
    #[default]
    DangerAcceptInvalid,
}

/// Configuration for connecting to a single controller.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Controller URL (e.g., `https://10.0.0.1:3443`).
    pub url: Url,
    pub username: String,
    pub password: SecretString,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub workflow: WorkflowTimings,
    pub stability: StabilitySettings,
    pub link_active_timeout: Duration,
    pub mcs_settle_delay: Duration,
}

impl ControllerConfig {
    /// Config for `url` with default timeouts, retry and polling budgets.
    pub fn new(url: Url, username: impl Into<String>, password: SecretString) -> Self {
        Self {
            url,
            username: username.into(),
            password,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(15),
            retry: RetryPolicy::default(),
            workflow: WorkflowTimings::default(),
            stability: StabilitySettings::default(),
            link_active_timeout: LINK_ACTIVE_TIMEOUT,
            mcs_settle_delay: MCS_SETTLE_DELAY,
        }
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        TransportConfig {
            tls,
            timeout: self.timeout,
        }
    }

    pub(crate) fn credentials(&self) -> Credentials {
        Credentials::new(self.username.clone(), self.password.clone())
    }
}
