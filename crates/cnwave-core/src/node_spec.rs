// ── Node records ──
//
// The workflow's input describes one radio per end of the link. Records
// are validated before anything touches the controller, and all names
// the workflow creates are derived from them deterministically.

use serde::{Deserialize, Serialize};

use cnwave_api::{Location, Node, NodeType, Site};

use crate::error::CoreError;

/// Number of trailing MAC hex digits used in generated names.
const SUFFIX_LEN: usize = 6;

/// One end of a link to provision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Node (management) MAC address.
    pub mac: String,
    /// Hardware model, e.g. `V5000`.
    pub model: String,
    /// Radio MAC the link is built on.
    pub wlan_mac: String,
    pub latitude: f64,
    pub longitude: f64,
    pub node_type: NodeType,
    /// Required: a record without it is rejected.
    pub is_pop: bool,
}

impl NodeSpec {
    /// Check shape and content. `role` names the record in the error.
    pub fn validate(&self, role: &str) -> Result<(), CoreError> {
        let invalid = |message: String| CoreError::InvalidNodeSpec {
            role: role.to_owned(),
            message,
        };

        check_mac(&self.mac).map_err(|m| invalid(format!("mac: {m}")))?;
        check_mac(&self.wlan_mac).map_err(|m| invalid(format!("wlan_mac: {m}")))?;

        if self.model.trim().is_empty() {
            return Err(invalid("model is empty".into()));
        }
        if self.model.chars().any(char::is_whitespace) {
            return Err(invalid(format!("model '{}' contains whitespace", self.model)));
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(invalid(format!("latitude {} out of range", self.latitude)));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(invalid(format!("longitude {} out of range", self.longitude)));
        }
        Ok(())
    }

    pub fn site_name(&self) -> String {
        generate_site_name(&self.mac, &self.model)
    }

    pub fn node_name(&self) -> String {
        generate_node_name(&self.mac, &self.model)
    }

    /// Site record placed at this node's coordinates.
    pub fn to_site(&self) -> Site {
        Site {
            name: self.site_name(),
            location: Location::new(self.latitude, self.longitude),
        }
    }

    /// Node record attached to [`site_name`](Self::site_name).
    pub fn to_node(&self) -> Node {
        Node {
            name: self.node_name(),
            node_type: self.node_type,
            mac_addr: self.mac.clone(),
            wlan_mac_addrs: vec![self.wlan_mac.clone()],
            pop_node: self.is_pop,
            site_name: self.site_name(),
            hw_model: Some(self.model.clone()),
            status: None,
        }
    }
}

/// Accepts `aa:bb:cc:dd:ee:ff` or bare hex, 12 digits either way.
fn check_mac(mac: &str) -> Result<(), String> {
    let digits: Vec<char> = mac.chars().filter(|c| *c != ':').collect();
    if digits.len() != 12 {
        return Err(format!("'{mac}' is not a 6-byte MAC address"));
    }
    if let Some(bad) = digits.iter().find(|c| !c.is_ascii_hexdigit()) {
        return Err(format!("'{mac}' contains non-hex character '{bad}'"));
    }
    Ok(())
}

/// Last six hex digits of a MAC, colons stripped, lowercased.
pub fn mac_suffix(mac: &str) -> String {
    let digits: Vec<char> = mac.chars().filter(|c| *c != ':').collect();
    let start = digits.len().saturating_sub(SUFFIX_LEN);
    digits[start..].iter().collect::<String>().to_lowercase()
}

pub fn generate_site_name(mac: &str, model: &str) -> String {
    format!("site-{model}-{}", mac_suffix(mac))
}

pub fn generate_node_name(mac: &str, model: &str) -> String {
    format!("node-{model}-{}", mac_suffix(mac))
}
