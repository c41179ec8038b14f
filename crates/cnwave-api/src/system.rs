// Diagnostic endpoints
//
// Version lookups are best-effort: a failure is logged and reported as
// "unknown" so reporting callers never abort on them.

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::client::{ControllerClient, decode};
use crate::error::Error;
use crate::models::{
    DeviceInfo, FirmwareVersions, NodeVersion, StatusDump, Topology, UNKNOWN_VERSION,
};

impl ControllerClient {
    /// `POST /api/getNodeInfo`
    pub async fn get_node_info(&self) -> Result<Value, Error> {
        let info = self.post_empty("/api/getNodeInfo").await?;
        debug!(response = %info, "node info");
        Ok(info)
    }

    /// `POST /local/getSystemCapability`
    pub async fn get_system_capability(&self) -> Result<Value, Error> {
        let capability = self.post_empty("/local/getSystemCapability").await?;
        debug!(response = %capability, "system capability");
        Ok(capability)
    }

    /// Per-MAC status reports.
    ///
    /// `POST /api/getCtrlStatusDump`
    pub async fn get_status_dump(&self) -> Result<StatusDump, Error> {
        let path = "/api/getCtrlStatusDump";
        debug!("fetching status dump");
        let dump = self.post_empty(path).await?;
        decode(path, &dump)
    }

    /// Firmware versions of the PoP and the DN.
    ///
    /// `pop` and `dn` pick nodes by name; `None` takes the first node of
    /// that role. Roles that cannot be resolved read as `"unknown"`, and
    /// so does everything if the lookup fails.
    pub async fn get_pop_dn_versions(&self, pop: Option<&str>, dn: Option<&str>) -> FirmwareVersions {
        let lookup = async {
            let dump = self.get_status_dump().await?;
            let topology = self.get_topology().await?;
            Ok::<_, Error>(resolve_versions(&topology, &dump, pop, dn))
        };

        match lookup.await {
            Ok(versions) => {
                info!(pop = %versions.pop, dn = %versions.dn, "resolved firmware versions");
                versions
            }
            Err(e) => {
                warn!(error = %e, "could not get firmware versions");
                FirmwareVersions::default()
            }
        }
    }

    /// Software identity of the controller host.
    ///
    /// `POST /local/getDeviceInfo`. Never fails: errors degrade to all
    /// fields `"unknown"`.
    pub async fn get_device_info(&self) -> DeviceInfo {
        let path = "/local/getDeviceInfo";
        let result = self
            .post_empty(path)
            .await
            .and_then(|response| decode::<DeviceInfo>(path, &response));

        match result {
            Ok(mut info) => {
                info.sw_ver = info.sw_ver.trim().to_owned();
                info.fw_version = info.fw_version.trim().to_owned();
                info
            }
            Err(e) => {
                warn!(error = %e, "could not get device info");
                DeviceInfo::default()
            }
        }
    }

    /// Topology nodes joined with their status reports by MAC.
    pub async fn node_versions(&self) -> Result<Vec<NodeVersion>, Error> {
        let topology = self.get_topology().await?;
        let dump = self.get_status_dump().await?;
        Ok(topology
            .nodes
            .iter()
            .map(|node| {
                let report = dump.status_reports.get(&node.mac_addr);
                NodeVersion {
                    name: node.name.clone(),
                    mac_addr: node.mac_addr.clone(),
                    pop_node: node.pop_node,
                    version: report
                        .and_then(|r| r.cambium_version.clone())
                        .unwrap_or_else(|| UNKNOWN_VERSION.into()),
                    hardware_board_id: report.and_then(|r| r.hardware_board_id.clone()),
                }
            })
            .collect())
    }
}

/// First PoP and first non-PoP node matching the requested names.
fn resolve_versions(
    topology: &Topology,
    dump: &StatusDump,
    pop: Option<&str>,
    dn: Option<&str>,
) -> FirmwareVersions {
    let version_of = |want_pop: bool, name: Option<&str>| {
        topology
            .nodes
            .iter()
            .filter(|n| n.pop_node == want_pop)
            .find(|n| name.is_none_or(|wanted| n.name == wanted))
            .and_then(|n| dump.version_for(&n.mac_addr))
            .unwrap_or(UNKNOWN_VERSION)
            .to_owned()
    };

    FirmwareVersions {
        pop: version_of(true, pop),
        dn: version_of(false, dn),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn fixture() -> (Topology, StatusDump) {
        let topology: Topology = serde_json::from_value(json!({
            "nodes": [
                { "name": "pop-1", "node_type": 2, "mac_addr": "00:00:00:00:00:01", "pop_node": true },
                { "name": "dn-1", "node_type": 2, "mac_addr": "00:00:00:00:00:02", "pop_node": false },
                { "name": "dn-2", "node_type": 2, "mac_addr": "00:00:00:00:00:03", "pop_node": false }
            ]
        }))
        .unwrap();
        let dump: StatusDump = serde_json::from_value(json!({
            "statusReports": {
                "00:00:00:00:00:01": { "cambiumVersion": "1.2.0" },
                "00:00:00:00:00:03": { "cambiumVersion": "1.1.4" }
            }
        }))
        .unwrap();
        (topology, dump)
    }

    #[test]
    fn first_node_of_each_role_when_unnamed() {
        let (topology, dump) = fixture();
        let versions = resolve_versions(&topology, &dump, None, None);
        assert_eq!(versions.pop, "1.2.0");
        // dn-1 has no status report.
        assert_eq!(versions.dn, UNKNOWN_VERSION);
    }

    #[test]
    fn named_lookup_and_unknown_name() {
        let (topology, dump) = fixture();
        let versions = resolve_versions(&topology, &dump, Some("nope"), Some("dn-2"));
        assert_eq!(versions.pop, UNKNOWN_VERSION);
        assert_eq!(versions.dn, "1.1.4");
    }
}
