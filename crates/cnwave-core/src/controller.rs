// ── Controller facade ──
//
// Connection lifecycle plus every operation the CLI exposes. The client
// is created on `connect()`; calls made before that fail with
// `ControllerDisconnected`.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info};

use cnwave_api::overrides::{FW_PARAMS, LA_MAX_MCS, LINK_PARAMS_BASE, RADIO_PARAMS_BASE, TDD_SLOT_RATIO};
use cnwave_api::{
    ControllerClient, DeviceInfo, FirmwareVersions, Link, NetworkOverrides, Node, NodeOverrides,
    NodeVersion, Topology,
};

use crate::config::ControllerConfig;
use crate::error::CoreError;
use crate::monitor::{LINK_ACTIVE_INTERVAL, LinkStabilityMonitor, StabilitySettings, wait_for_link_active};
use crate::node_spec::NodeSpec;
use crate::workflow::{OneTouchWorkflow, WorkflowResult};

/// Node whose overrides are read when no node is named.
pub const DEFAULT_MCS_NODE: &str = "PoP";

/// The main entry point for consumers.
///
/// Cheaply cloneable. Workflow runs against one controller are expected
/// to be serialized by the caller.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: ControllerConfig,
    client: Mutex<Option<Arc<ControllerClient>>>,
}

impl Controller {
    /// Create a controller handle. Does NOT connect.
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            inner: Arc::new(ControllerInner {
                config,
                client: Mutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Build the HTTP client and log in.
    pub async fn connect(&self) -> Result<(), CoreError> {
        let config = &self.inner.config;
        info!(url = %config.url, "connecting to controller");

        let client = ControllerClient::connect(
            config.url.clone(),
            config.credentials(),
            &config.transport(),
            config.retry,
        )
        .await?;

        *self.inner.client.lock().await = Some(Arc::new(client));
        info!(url = %config.url, "connected to controller");
        Ok(())
    }

    pub async fn disconnect(&self) {
        self.inner.client.lock().await.take();
        debug!("disconnected");
    }

    pub async fn is_connected(&self) -> bool {
        self.inner.client.lock().await.is_some()
    }

    async fn client(&self) -> Result<Arc<ControllerClient>, CoreError> {
        self.inner
            .client
            .lock()
            .await
            .clone()
            .ok_or(CoreError::ControllerDisconnected)
    }

    // ── Workflow ─────────────────────────────────────────────────

    /// Run the one-touch link workflow for `node_a` → `node_b`.
    pub async fn create_link_workflow(
        &self,
        node_a: &NodeSpec,
        node_b: &NodeSpec,
    ) -> Result<WorkflowResult, CoreError> {
        let client = self.client().await?;
        OneTouchWorkflow::new(&client, self.inner.config.workflow)
            .run(node_a, node_b)
            .await
    }

    // ── Topology ─────────────────────────────────────────────────

    pub async fn topology(&self) -> Result<Topology, CoreError> {
        Ok(self.client().await?.get_topology().await?)
    }

    pub async fn nodes(&self) -> Result<Vec<Node>, CoreError> {
        Ok(self.client().await?.get_nodes().await?)
    }

    pub async fn links(&self) -> Result<Vec<Link>, CoreError> {
        Ok(self.client().await?.get_links().await?)
    }

    pub async fn is_link_alive(&self, a_node: &str, z_node: &str) -> Result<bool, CoreError> {
        Ok(self.client().await?.is_link_alive(a_node, z_node).await?)
    }

    // ── Overrides ────────────────────────────────────────────────

    pub async fn network_overrides(&self) -> Result<NetworkOverrides, CoreError> {
        Ok(self.client().await?.get_network_overrides().await?)
    }

    pub async fn node_overrides(&self) -> Result<NodeOverrides, CoreError> {
        Ok(self.client().await?.get_node_overrides().await?)
    }

    /// Current `tddSlotRatio` from the network overrides.
    pub async fn current_tdd(&self) -> Result<i64, CoreError> {
        self.network_overrides()
            .await?
            .tdd_slot_ratio()
            .ok_or_else(|| CoreError::OverrideMissing {
                path: format!("{RADIO_PARAMS_BASE}.{FW_PARAMS}.{TDD_SLOT_RATIO}"),
            })
    }

    pub async fn set_tdd(&self, value: i64) -> Result<(), CoreError> {
        Ok(self.client().await?.update_tdd_slot_ratio(value).await?)
    }

    /// Current `laMaxMcs` for `node`, or the PoP when not given.
    pub async fn current_mcs(&self, node: Option<&str>) -> Result<i64, CoreError> {
        let node = node.unwrap_or(DEFAULT_MCS_NODE);
        self.node_overrides()
            .await?
            .max_mcs(node)
            .ok_or_else(|| CoreError::OverrideMissing {
                path: format!("{node}.{LINK_PARAMS_BASE}.{FW_PARAMS}.{LA_MAX_MCS}"),
            })
    }

    /// Set `laMaxMcs` on every node, then wait for the radios to settle.
    pub async fn set_mcs(&self, value: i64) -> Result<(), CoreError> {
        self.client().await?.update_mcs(value).await?;
        let settle = self.inner.config.mcs_settle_delay;
        debug!(settle_secs = settle.as_secs_f64(), "waiting for MCS change to settle");
        tokio::time::sleep(settle).await;
        Ok(())
    }

    // ── Waiting ──────────────────────────────────────────────────

    /// Wait until any link is alive. `None` uses the configured timeout.
    pub async fn wait_for_link_active(&self, timeout: Option<Duration>) -> Result<bool, CoreError> {
        let client = self.client().await?;
        let timeout = timeout.unwrap_or(self.inner.config.link_active_timeout);
        wait_for_link_active(client.as_ref(), timeout, LINK_ACTIVE_INTERVAL).await
    }

    /// Wait until a link has stayed alive for the stable window.
    pub async fn wait_for_link_stable(
        &self,
        settings: Option<StabilitySettings>,
    ) -> Result<bool, CoreError> {
        let client = self.client().await?;
        let settings = settings.unwrap_or(self.inner.config.stability);
        LinkStabilityMonitor::new(client.as_ref(), settings)
            .wait_until_stable()
            .await
    }

    // ── Diagnostics ──────────────────────────────────────────────

    pub async fn pop_dn_versions(
        &self,
        pop: Option<&str>,
        dn: Option<&str>,
    ) -> Result<FirmwareVersions, CoreError> {
        Ok(self.client().await?.get_pop_dn_versions(pop, dn).await)
    }

    pub async fn device_info(&self) -> Result<DeviceInfo, CoreError> {
        Ok(self.client().await?.get_device_info().await)
    }

    pub async fn node_versions(&self) -> Result<Vec<NodeVersion>, CoreError> {
        Ok(self.client().await?.node_versions().await?)
    }
}
