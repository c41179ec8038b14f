// cnwave-api: Async Rust client for the cnWave mesh controller HTTP API

pub mod auth;
pub mod client;
pub mod error;
pub mod executor;
pub mod models;
pub mod overrides;
pub mod retry;
pub mod transport;

mod settings;
mod system;
mod topology;

pub use auth::{AuthSession, Credentials};
pub use client::ControllerClient;
pub use error::Error;
pub use executor::RequestExecutor;
pub use models::{
    DeviceInfo, FirmwareVersions, IgnitionState, Link, LinkAction, LinkStatusRequest, Location,
    Node, NodeStatus, NodeType, NodeVersion, Site, StatusDump, StatusReport, Topology,
};
pub use overrides::{NetworkOverrides, NodeOverrides};
pub use retry::{RetryEvent, RetryObserver, RetryPolicy, TracingObserver};
pub use transport::{TlsMode, TransportConfig};
