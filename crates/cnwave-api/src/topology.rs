// Topology endpoints
//
// Reads always go to the controller; mutations address sites, nodes, and
// links by name. Add payloads are wrapped in a single-key envelope
// (`{"site": {...}}` and so on).

use serde_json::{Value, json};
use tracing::debug;

use crate::client::{ControllerClient, decode};
use crate::error::Error;
use crate::models::{IgnitionState, Link, LinkStatusRequest, Node, NodeType, Site, Topology};

impl ControllerClient {
    // ── Reads ───────────────────────────────────────────────────────

    /// Fetch the full topology.
    ///
    /// `POST /api/getTopology`. Some controller builds wrap the document
    /// in `message`; both forms are accepted.
    pub async fn get_topology(&self) -> Result<Topology, Error> {
        let path = "/api/getTopology";
        debug!("fetching topology");
        let response = self.post_empty(path).await?;
        match response.get("message") {
            Some(inner @ Value::Object(_)) => decode(path, inner),
            _ => decode(path, &response),
        }
    }

    /// List nodes with their live status.
    ///
    /// `GET /api/getNodes`
    pub async fn get_nodes(&self) -> Result<Vec<Node>, Error> {
        let path = "/api/getNodes";
        debug!("listing nodes");
        let response = self.get(path).await?;
        match response.get("nodes") {
            Some(nodes) => decode(path, nodes),
            None => Ok(Vec::new()),
        }
    }

    pub async fn get_links(&self) -> Result<Vec<Link>, Error> {
        Ok(self.get_topology().await?.links)
    }

    /// Look up a node by exact name.
    pub async fn get_node(&self, name: &str) -> Result<Option<Node>, Error> {
        Ok(self.get_nodes().await?.into_iter().find(|n| n.name == name))
    }

    /// Alive flag of the first link from `a_node` to `z_node`.
    ///
    /// A missing link reads as not alive.
    pub async fn is_link_alive(&self, a_node: &str, z_node: &str) -> Result<bool, Error> {
        let alive = self
            .get_links()
            .await?
            .iter()
            .find(|l| l.connects(a_node, z_node))
            .is_some_and(|l| l.is_alive);
        debug!(a_node, z_node, alive, "link liveness");
        Ok(alive)
    }

    /// MAC of the first DN reported by `/api/getNodes`.
    pub async fn get_dn_radio_mac(&self) -> Result<Option<String>, Error> {
        Ok(self
            .get_nodes()
            .await?
            .into_iter()
            .find(|n| n.node_type == NodeType::Dn)
            .map(|n| n.mac_addr))
    }

    // ── Mutations ───────────────────────────────────────────────────

    /// `POST /internal/api/addSite`
    pub async fn add_site(&self, site: &Site) -> Result<(), Error> {
        debug!(name = %site.name, "adding site");
        self.post("/internal/api/addSite", &json!({ "site": site }))
            .await?;
        Ok(())
    }

    /// `POST /internal/api/addNode`
    pub async fn add_node(&self, node: &Node) -> Result<(), Error> {
        debug!(name = %node.name, "adding node");
        self.post("/internal/api/addNode", &json!({ "node": node }))
            .await?;
        Ok(())
    }

    /// `POST /internal/api/addLink`
    ///
    /// Liveness is controller-owned, so `is_alive` is not sent.
    pub async fn add_link(&self, link: &Link) -> Result<(), Error> {
        debug!(name = %link.name, "adding link");
        let body = json!({
            "link": {
                "name": link.name,
                "a_node_name": link.a_node_name,
                "z_node_name": link.z_node_name,
                "a_node_mac": link.a_node_mac,
                "z_node_mac": link.z_node_mac,
                "link_type": link.link_type,
            }
        });
        self.post("/internal/api/addLink", &body).await?;
        Ok(())
    }

    /// `POST /internal/api/delLink`
    pub async fn delete_link(&self, a_node: &str, z_node: &str, force: bool) -> Result<(), Error> {
        debug!(a_node, z_node, force, "deleting link");
        self.post(
            "/internal/api/delLink",
            &json!({
                "aNodeName": a_node,
                "zNodeName": z_node,
                "force": force,
            }),
        )
        .await?;
        Ok(())
    }

    /// `POST /internal/api/delNode`
    pub async fn delete_node(&self, name: &str, force: bool) -> Result<(), Error> {
        debug!(name, force, "deleting node");
        self.post(
            "/internal/api/delNode",
            &json!({ "nodeName": name, "force": force }),
        )
        .await?;
        Ok(())
    }

    /// `POST /internal/api/delSite`
    pub async fn delete_site(&self, name: &str) -> Result<(), Error> {
        debug!(name, "deleting site");
        self.post("/internal/api/delSite", &json!({ "siteName": name }))
            .await?;
        Ok(())
    }

    // ── Link control ────────────────────────────────────────────────

    /// `POST /internal/api/setIgnitionState`
    pub async fn set_ignition_state(&self, state: &IgnitionState) -> Result<(), Error> {
        debug!(enable = state.enable, "setting ignition state");
        let body = serde_json::to_value(state).map_err(|e| Error::Deserialization {
            message: format!("failed to encode ignition state: {e}"),
            body: String::new(),
        })?;
        self.post("/internal/api/setIgnitionState", &body).await?;
        Ok(())
    }

    /// `POST /internal/api/setLinkStatus`
    pub async fn set_link_status(&self, request: &LinkStatusRequest) -> Result<(), Error> {
        debug!(
            initiator = %request.initiator_node_name,
            responder = %request.responder_node_name,
            action = ?request.action,
            "setting link status"
        );
        let body = serde_json::to_value(request).map_err(|e| Error::Deserialization {
            message: format!("failed to encode link status request: {e}"),
            body: String::new(),
        })?;
        self.post("/internal/api/setLinkStatus", &body).await?;
        Ok(())
    }
}
