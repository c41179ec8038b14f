//! `link create`: run the one-touch workflow from a record file.

use std::path::Path;

use serde::Deserialize;

use cnwave_core::{Controller, NodeSpec, WorkflowResult};

use crate::cli::{LinkArgs, LinkCommand};
use crate::error::CliError;
use crate::output::{self, Output};

/// `{"node_a": {...}, "node_b": {...}}`
#[derive(Debug, Deserialize)]
pub struct NodePair {
    pub node_a: NodeSpec,
    pub node_b: NodeSpec,
}

pub fn read_pair(path: &Path) -> Result<NodePair, CliError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

pub async fn handle(controller: &Controller, args: LinkArgs, out: &Output) -> Result<(), CliError> {
    match args.command {
        LinkCommand::Create { from_file } => {
            let pair = read_pair(&from_file)?;
            controller.connect().await?;

            let result = controller
                .create_link_workflow(&pair.node_a, &pair.node_b)
                .await?;
            let rendered = output::render_single(
                out.format,
                &result,
                |r| result_detail(r, out),
                |r| r.link_name.clone().unwrap_or_default(),
            )?;
            out.print(&rendered);

            if result.is_success() {
                Ok(())
            } else {
                Err(CliError::LinkDown {
                    what: result
                        .reason
                        .unwrap_or_else(|| "link workflow failed".into()),
                })
            }
        }
    }
}

fn result_detail(r: &WorkflowResult, out: &Output) -> String {
    let status = serde_json::to_value(r.status)
        .ok()
        .and_then(|v| v.as_str().map(str::to_owned))
        .unwrap_or_default();
    let mut pairs = vec![
        ("Status", out.status(&status, r.is_success())),
        ("Node A", r.node_a.clone()),
        ("Node B", r.node_b.clone()),
    ];
    if let Some(link) = &r.link_name {
        pairs.push(("Link", link.clone()));
    }
    if let Some(reason) = &r.reason {
        pairs.push(("Reason", reason.clone()));
    }
    output::detail_lines(&pairs)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn reads_pair_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "node_a": {{ "mac": "aa:bb:cc:dd:ee:01", "model": "V5000", "wlan_mac": "aa:bb:cc:dd:ef:01",
                            "latitude": 12.9, "longitude": 77.5, "node_type": "DN", "is_pop": true }},
                "node_b": {{ "mac": "aa:bb:cc:dd:ee:02", "model": "V3000", "wlan_mac": "aa:bb:cc:dd:ef:02",
                            "latitude": 12.9, "longitude": 77.5, "node_type": 1, "is_pop": false }}
            }}"#
        )
        .unwrap();

        let pair = read_pair(file.path()).unwrap();
        assert!(pair.node_a.is_pop);
        assert!(!pair.node_b.is_pop);
        assert_eq!(pair.node_b.model, "V3000");
    }

    #[test]
    fn malformed_pair_file_is_a_json_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "node_a": {{}} }}"#).unwrap();
        assert!(matches!(read_pair(file.path()), Err(CliError::Json(_))));
    }
}
