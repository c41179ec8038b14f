// ── Controller wire records ──
//
// Topology payloads use snake_case keys; `/api/getNodes` answers with
// camelCase on some firmware, so reads accept both spellings.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ── Node ────────────────────────────────────────────────────────────

/// Node role in the mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// Client node.
    Cn,
    /// Distribution node.
    Dn,
}

impl NodeType {
    /// Integer code used on the wire.
    pub fn code(self) -> u8 {
        match self {
            Self::Cn => 1,
            Self::Dn => 2,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Cn),
            2 => Some(Self::Dn),
            _ => None,
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cn => f.write_str("CN"),
            Self::Dn => f.write_str("DN"),
        }
    }
}

impl std::str::FromStr for NodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CN" | "1" => Ok(Self::Cn),
            "DN" | "2" => Ok(Self::Dn),
            other => Err(format!("unknown node type '{other}' (expected CN or DN)")),
        }
    }
}

impl Serialize for NodeType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for NodeType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Code(i64),
            Name(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Code(code) => Self::from_code(code)
                .ok_or_else(|| serde::de::Error::custom(format!("unknown node type code {code}"))),
            Raw::Name(name) => name.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Node status as reported by the controller.
///
/// Only [`OnlineInitiator`](Self::OnlineInitiator) (code 3) counts as online
/// for provisioning purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum NodeStatus {
    Offline,
    Online,
    OnlineInitiator,
    Unknown(i64),
}

impl NodeStatus {
    pub const ONLINE_SENTINEL: i64 = 3;

    pub fn is_online(self) -> bool {
        i64::from(self) == Self::ONLINE_SENTINEL
    }
}

impl From<i64> for NodeStatus {
    fn from(code: i64) -> Self {
        match code {
            1 => Self::Offline,
            2 => Self::Online,
            3 => Self::OnlineInitiator,
            other => Self::Unknown(other),
        }
    }
}

impl From<NodeStatus> for i64 {
    fn from(status: NodeStatus) -> Self {
        match status {
            NodeStatus::Offline => 1,
            NodeStatus::Online => 2,
            NodeStatus::OnlineInitiator => 3,
            NodeStatus::Unknown(code) => code,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    #[serde(alias = "nodeType")]
    pub node_type: NodeType,
    #[serde(alias = "macAddr", default)]
    pub mac_addr: String,
    #[serde(alias = "wlanMacAddrs", default)]
    pub wlan_mac_addrs: Vec<String>,
    #[serde(alias = "popNode", default)]
    pub pop_node: bool,
    #[serde(alias = "siteName", default)]
    pub site_name: String,
    #[serde(alias = "hwModel", default, skip_serializing_if = "Option::is_none")]
    pub hw_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<NodeStatus>,
}

impl Node {
    pub fn is_online(&self) -> bool {
        self.status.is_some_and(NodeStatus::is_online)
    }
}

// ── Link ────────────────────────────────────────────────────────────

/// Wireless link type code.
pub const LINK_TYPE_WIRELESS: u8 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub name: String,
    #[serde(alias = "aNodeName")]
    pub a_node_name: String,
    #[serde(alias = "zNodeName")]
    pub z_node_name: String,
    #[serde(alias = "aNodeMac", default)]
    pub a_node_mac: String,
    #[serde(alias = "zNodeMac", default)]
    pub z_node_mac: String,
    #[serde(alias = "linkType", default = "default_link_type")]
    pub link_type: u8,
    #[serde(alias = "isAlive", default)]
    pub is_alive: bool,
}

fn default_link_type() -> u8 {
    LINK_TYPE_WIRELESS
}

impl Link {
    /// Canonical link name for an A→Z pair.
    pub fn name_for(a_node: &str, z_node: &str) -> String {
        format!("link-{a_node}-{z_node}")
    }

    /// A new wireless link record between two nodes' WLAN MACs.
    pub fn wireless(a_node: &str, z_node: &str, a_mac: &str, z_mac: &str) -> Self {
        Self {
            name: Self::name_for(a_node, z_node),
            a_node_name: a_node.to_owned(),
            z_node_name: z_node.to_owned(),
            a_node_mac: a_mac.to_owned(),
            z_node_mac: z_mac.to_owned(),
            link_type: LINK_TYPE_WIRELESS,
            is_alive: false,
        }
    }

    pub fn connects(&self, a_node: &str, z_node: &str) -> bool {
        self.a_node_name == a_node && self.z_node_name == z_node
    }
}

// ── Site ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub altitude: f64,
    #[serde(default)]
    pub accuracy: f64,
}

impl Location {
    /// Accuracy the controller expects for a hand-placed site.
    pub const DEFAULT_ACCURACY: f64 = 10_000.0;

    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude: 0.0,
            accuracy: Self::DEFAULT_ACCURACY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub name: String,
    pub location: Location,
}

// ── Topology ────────────────────────────────────────────────────────

/// A fresh read of the controller's topology. Never cached.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sites: Vec<Site>,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl Topology {
    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn any_link_alive(&self) -> bool {
        self.links.iter().any(|l| l.is_alive)
    }
}

// ── Link control ────────────────────────────────────────────────────

/// `setIgnitionState` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IgnitionState {
    /// Network-wide auto-ignition switch.
    pub enable: bool,
    /// Per-link auto-ignition overrides keyed by link name.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub link_auto_ignite: HashMap<String, bool>,
}

/// Requested link state for `setLinkStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkAction {
    Up,
    Down,
}

impl Serialize for LinkAction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(match self {
            Self::Up => 1,
            Self::Down => 2,
        })
    }
}

/// `setLinkStatus` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkStatusRequest {
    pub action: LinkAction,
    pub initiator_node_name: String,
    pub responder_node_name: String,
}

// ── Diagnostics ─────────────────────────────────────────────────────

/// Per-MAC status report from `getCtrlStatusDump`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub cambium_version: Option<String>,
    pub hardware_board_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusDump {
    #[serde(default)]
    pub status_reports: HashMap<String, StatusReport>,
}

impl StatusDump {
    pub fn version_for(&self, mac: &str) -> Option<&str> {
        self.status_reports
            .get(mac)
            .and_then(|r| r.cambium_version.as_deref())
    }
}

/// Placeholder for versions the controller did not report.
pub const UNKNOWN_VERSION: &str = "unknown";

/// Firmware versions resolved per role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirmwareVersions {
    pub pop: String,
    pub dn: String,
}

impl Default for FirmwareVersions {
    fn default() -> Self {
        Self {
            pop: UNKNOWN_VERSION.into(),
            dn: UNKNOWN_VERSION.into(),
        }
    }
}

/// One row of the per-node version report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeVersion {
    pub name: String,
    pub mac_addr: String,
    pub pop_node: bool,
    pub version: String,
    pub hardware_board_id: Option<String>,
}

/// `getDeviceInfo` response. Missing fields read as `"unknown"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    #[serde(default = "unknown")]
    pub sw_ver: String,
    #[serde(default = "unknown")]
    pub fw_version: String,
    #[serde(default = "unknown")]
    pub model: String,
    #[serde(rename = "type", default = "unknown")]
    pub device_type: String,
}

fn unknown() -> String {
    UNKNOWN_VERSION.into()
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self {
            sw_ver: unknown(),
            fw_version: unknown(),
            model: unknown(),
            device_type: unknown(),
        }
    }
}
