// cnwave-core: Link provisioning and stability monitoring on top of cnwave-api.

pub mod config;
pub mod controller;
pub mod error;
pub mod monitor;
pub mod node_spec;
pub mod workflow;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ControllerConfig, MCS_SETTLE_DELAY, TlsVerification};
pub use controller::Controller;
pub use error::CoreError;
pub use monitor::{
    LinkProbe, LinkStabilityMonitor, StabilitySettings, StabilityState, wait_for_link_active,
};
pub use node_spec::{NodeSpec, generate_node_name, generate_site_name, mac_suffix};
pub use workflow::{OneTouchWorkflow, WorkflowResult, WorkflowStatus, WorkflowTimings};

// Wire types callers render directly.
pub use cnwave_api::{
    DeviceInfo, FirmwareVersions, Link, NetworkOverrides, Node, NodeOverrides, NodeType,
    NodeVersion, RetryPolicy, Site, Topology,
};
