// ── One-touch link workflow ──
//
// Takes two node records and leaves the controller with exactly one
// wireless link between them: wipe the topology, create both sites and
// nodes, create the link, wait for the far node, then confirm the link
// is alive. Only "link never came alive" becomes a FAILED result; every
// other failure is returned as an error.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{error, info};

use cnwave_api::{ControllerClient, Link};

use crate::error::CoreError;
use crate::node_spec::NodeSpec;

pub const LINK_DOWN_REASON: &str = "Link did not come alive";

/// Polling budgets for the waiting steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowTimings {
    pub online_timeout: Duration,
    pub online_interval: Duration,
    pub validate_timeout: Duration,
    pub validate_interval: Duration,
}

impl Default for WorkflowTimings {
    fn default() -> Self {
        Self {
            online_timeout: Duration::from_secs(300),
            online_interval: Duration::from_secs(10),
            validate_timeout: Duration::from_secs(120),
            validate_interval: Duration::from_secs(5),
        }
    }
}

// ── Result ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowStatus {
    Success,
    Failed,
}

/// Outcome of one workflow run. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowResult {
    pub status: WorkflowStatus,
    pub node_a: String,
    pub node_b: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl WorkflowResult {
    fn success(node_a: String, node_b: String, link_name: String) -> Self {
        Self {
            status: WorkflowStatus::Success,
            node_a,
            node_b,
            link_name: Some(link_name),
            reason: None,
        }
    }

    fn failed(node_a: String, node_b: String, reason: &str) -> Self {
        Self {
            status: WorkflowStatus::Failed,
            node_a,
            node_b,
            link_name: None,
            reason: Some(reason.to_owned()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == WorkflowStatus::Success
    }
}

// ── Workflow ─────────────────────────────────────────────────────────

pub struct OneTouchWorkflow<'a> {
    client: &'a ControllerClient,
    timings: WorkflowTimings,
}

impl<'a> OneTouchWorkflow<'a> {
    pub fn new(client: &'a ControllerClient, timings: WorkflowTimings) -> Self {
        Self { client, timings }
    }

    /// Provision a link from `node_a` to `node_b`.
    pub async fn run(
        &self,
        node_a: &NodeSpec,
        node_b: &NodeSpec,
    ) -> Result<WorkflowResult, CoreError> {
        node_a.validate("node_a")?;
        node_b.validate("node_b")?;

        info!("starting one-touch link workflow");
        self.clear_topology().await?;

        let (name_a, name_b) = (node_a.node_name(), node_b.node_name());
        let link_name = self.provision(node_a, node_b).await?;

        self.wait_for_node_online(&name_b).await?;

        if !self.validate_link(&name_a, &name_b).await? {
            return Ok(WorkflowResult::failed(name_a, name_b, LINK_DOWN_REASON));
        }

        info!(link = %link_name, "one-touch link workflow completed");
        Ok(WorkflowResult::success(name_a, name_b, link_name))
    }

    /// Delete every link, then every node, then every site.
    ///
    /// Nothing is re-read afterwards to confirm the topology is empty.
    pub async fn clear_topology(&self) -> Result<(), CoreError> {
        info!("clearing existing topology");
        let topology = self.client.get_topology().await?;

        for link in &topology.links {
            self.client
                .delete_link(&link.a_node_name, &link.z_node_name, true)
                .await?;
        }
        for node in &topology.nodes {
            self.client.delete_node(&node.name, true).await?;
        }
        for site in &topology.sites {
            self.client.delete_site(&site.name).await?;
        }

        info!(
            links = topology.links.len(),
            nodes = topology.nodes.len(),
            sites = topology.sites.len(),
            "topology cleared"
        );
        Ok(())
    }

    /// Create both sites, both nodes, and the wireless link. Returns the
    /// link name.
    pub async fn provision(&self, node_a: &NodeSpec, node_b: &NodeSpec) -> Result<String, CoreError> {
        for spec in [node_a, node_b] {
            let site = spec.to_site();
            info!(site = %site.name, "adding site");
            self.client.add_site(&site).await?;
        }
        for spec in [node_a, node_b] {
            let node = spec.to_node();
            info!(node = %node.name, "adding node");
            self.client.add_node(&node).await?;
        }

        let link = Link::wireless(
            &node_a.node_name(),
            &node_b.node_name(),
            &node_a.wlan_mac,
            &node_b.wlan_mac,
        );
        info!(link = %link.name, "adding link");
        self.client.add_link(&link).await?;
        Ok(link.name)
    }

    /// Poll until `node` reports the online sentinel. Timing out is an error.
    pub async fn wait_for_node_online(&self, node: &str) -> Result<(), CoreError> {
        let WorkflowTimings {
            online_timeout,
            online_interval,
            ..
        } = self.timings;
        info!(node, "waiting for node to come online");

        let started = Instant::now();
        while started.elapsed() < online_timeout {
            if self
                .client
                .get_node(node)
                .await?
                .is_some_and(|n| n.is_online())
            {
                info!(node, "node is online");
                return Ok(());
            }
            tokio::time::sleep(online_interval).await;
        }

        Err(CoreError::NodeOfflineTimeout {
            node: node.to_owned(),
            timeout_secs: online_timeout.as_secs(),
        })
    }

    /// Poll `is_link_alive(a, z)` until it holds or the budget runs out.
    pub async fn validate_link(&self, a_node: &str, z_node: &str) -> Result<bool, CoreError> {
        let WorkflowTimings {
            validate_timeout,
            validate_interval,
            ..
        } = self.timings;
        info!(a_node, z_node, "validating link status");

        let started = Instant::now();
        while started.elapsed() < validate_timeout {
            if self.client.is_link_alive(a_node, z_node).await? {
                info!("link is alive");
                return Ok(true);
            }
            tokio::time::sleep(validate_interval).await;
        }

        error!(a_node, z_node, "link failed to come alive");
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn result_serializes_with_optional_fields() {
        let ok = WorkflowResult::success("node-a".into(), "node-b".into(), "link-node-a-node-b".into());
        assert!(ok.is_success());
        assert_eq!(
            serde_json::to_value(&ok).ok(),
            Some(json!({
                "status": "SUCCESS",
                "node_a": "node-a",
                "node_b": "node-b",
                "link_name": "link-node-a-node-b"
            }))
        );

        let failed = WorkflowResult::failed("node-a".into(), "node-b".into(), LINK_DOWN_REASON);
        assert_eq!(
            serde_json::to_value(&failed).ok(),
            Some(json!({
                "status": "FAILED",
                "node_a": "node-a",
                "node_b": "node-b",
                "reason": "Link did not come alive"
            }))
        );
    }
}
