// Controller configuration and override blobs
//
// Override writes replace the whole blob, so every mutation here is a
// read-modify-write of the full document fetched moments before.

use serde_json::Value;
use tracing::{debug, info};

use crate::client::ControllerClient;
use crate::error::Error;
use crate::overrides::{NetworkOverrides, NodeOverrides};

const GET_NODE_OVERRIDES: &str = "/api/getNodeOverridesConfig";
const SET_NODE_OVERRIDES: &str = "/api/setNodeOverridesConfig";
const GET_NETWORK_OVERRIDES: &str = "/api/getNetworkOverridesConfig";
const SET_NETWORK_OVERRIDES: &str = "/api/setNetworkOverridesConfig";

impl ControllerClient {
    // ── Controller config ───────────────────────────────────────────

    /// `POST /internal/api/getControllerConfig`
    pub async fn get_controller_config(&self) -> Result<Value, Error> {
        debug!("fetching controller config");
        self.post_empty("/internal/api/getControllerConfig").await
    }

    /// `POST /internal/api/setControllerConfig`
    pub async fn set_controller_config(&self, config: &Value) -> Result<(), Error> {
        debug!("writing controller config");
        self.post("/internal/api/setControllerConfig", config)
            .await?;
        Ok(())
    }

    // ── Node overrides ──────────────────────────────────────────────

    pub async fn get_node_overrides(&self) -> Result<NodeOverrides, Error> {
        debug!("fetching node overrides");
        let envelope = self.post_empty(GET_NODE_OVERRIDES).await?;
        NodeOverrides::decode(&envelope)
    }

    /// Replace the node override blob.
    pub async fn set_node_overrides(&self, overrides: &NodeOverrides) -> Result<(), Error> {
        debug!("writing node overrides");
        self.post(SET_NODE_OVERRIDES, &overrides.encode()?).await?;
        Ok(())
    }

    /// Set `laMaxMcs` for every node in the node override blob.
    ///
    /// Creates missing `linkParamsBase.fwParams` blocks. Fails without
    /// writing if the controller holds no node overrides at all. Callers
    /// should give the radios a few seconds to settle afterwards.
    pub async fn update_mcs(&self, value: i64) -> Result<(), Error> {
        let mut overrides = self.get_node_overrides().await?;
        if overrides.is_empty() {
            return Err(Error::EmptyOverrides { scope: "node" });
        }
        overrides.set_max_mcs(value);
        info!(value, "updating max MCS on all nodes");
        self.set_node_overrides(&overrides).await
    }

    // ── Network overrides ───────────────────────────────────────────

    pub async fn get_network_overrides(&self) -> Result<NetworkOverrides, Error> {
        debug!("fetching network overrides");
        let envelope = self.post_empty(GET_NETWORK_OVERRIDES).await?;
        NetworkOverrides::decode(&envelope)
    }

    /// Replace the network override blob.
    pub async fn set_network_overrides(&self, overrides: &NetworkOverrides) -> Result<(), Error> {
        debug!("writing network overrides");
        self.post(SET_NETWORK_OVERRIDES, &overrides.encode()?)
            .await?;
        Ok(())
    }

    /// Change `radioParamsBase.fwParams.tddSlotRatio` and nothing else.
    ///
    /// Fails without writing if the blob is empty or either parent key is
    /// missing.
    pub async fn update_tdd_slot_ratio(&self, value: i64) -> Result<(), Error> {
        let mut overrides = self.get_network_overrides().await?;
        if overrides.is_empty() {
            return Err(Error::EmptyOverrides { scope: "network" });
        }
        overrides.set_tdd_slot_ratio(value)?;
        info!(value, "updating TDD slot ratio");
        self.set_network_overrides(&overrides).await
    }
}
