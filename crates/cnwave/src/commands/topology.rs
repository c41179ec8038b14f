//! Topology, node and link listings.

use tabled::Tabled;

use cnwave_core::{Controller, Link, Node, Topology};

use crate::error::CliError;
use crate::output::{self, Output};

#[derive(Tabled)]
struct NodeRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    node_type: String,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "PoP")]
    pop: String,
    #[tabled(rename = "Site")]
    site: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl From<&Node> for NodeRow {
    fn from(n: &Node) -> Self {
        Self {
            name: n.name.clone(),
            node_type: n.node_type.to_string(),
            mac: n.mac_addr.clone(),
            pop: if n.pop_node { "yes".into() } else { String::new() },
            site: n.site_name.clone(),
            status: n
                .status
                .map_or_else(|| "-".into(), |s| i64::from(s).to_string()),
        }
    }
}

#[derive(Tabled)]
struct LinkRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "A")]
    a_node: String,
    #[tabled(rename = "Z")]
    z_node: String,
    #[tabled(rename = "Alive")]
    alive: String,
}

impl From<&Link> for LinkRow {
    fn from(l: &Link) -> Self {
        Self {
            name: l.name.clone(),
            a_node: l.a_node_name.clone(),
            z_node: l.z_node_name.clone(),
            alive: if l.is_alive { "yes".into() } else { "no".into() },
        }
    }
}

pub async fn show(controller: &Controller, out: &Output) -> Result<(), CliError> {
    let topology = controller.topology().await?;
    let rendered = output::render_single(
        out.format,
        &topology,
        topology_detail,
        |t| t.name.clone().unwrap_or_default(),
    )?;
    out.print(&rendered);
    Ok(())
}

fn topology_detail(t: &Topology) -> String {
    let header = output::detail_lines(&[
        ("Name", t.name.clone().unwrap_or_else(|| "-".into())),
        ("Sites", t.sites.len().to_string()),
        ("Nodes", t.nodes.len().to_string()),
        ("Links", t.links.len().to_string()),
    ]);
    let nodes: Vec<NodeRow> = t.nodes.iter().map(NodeRow::from).collect();
    let links: Vec<LinkRow> = t.links.iter().map(LinkRow::from).collect();
    let style = tabled::settings::Style::rounded();
    format!(
        "{header}\n\n{}\n\n{}",
        tabled::Table::new(nodes).with(style.clone()),
        tabled::Table::new(links).with(style)
    )
}

pub async fn nodes(controller: &Controller, out: &Output) -> Result<(), CliError> {
    let nodes = controller.nodes().await?;
    let rendered = output::render_list(out.format, &nodes, |n| NodeRow::from(n), |n| n.name.clone())?;
    out.print(&rendered);
    Ok(())
}

pub async fn links(controller: &Controller, out: &Output) -> Result<(), CliError> {
    let links = controller.links().await?;
    let rendered = output::render_list(out.format, &links, |l| LinkRow::from(l), |l| l.name.clone())?;
    out.print(&rendered);
    Ok(())
}

#[derive(serde::Serialize)]
struct LinkAlive<'a> {
    a_node: &'a str,
    z_node: &'a str,
    alive: bool,
}

pub async fn link_alive(
    controller: &Controller,
    a_node: &str,
    z_node: &str,
    out: &Output,
) -> Result<(), CliError> {
    let alive = controller.is_link_alive(a_node, z_node).await?;
    let report = LinkAlive {
        a_node,
        z_node,
        alive,
    };
    let rendered = output::render_single(
        out.format,
        &report,
        |r| {
            let label = if r.alive { "alive" } else { "down" };
            format!("{} -> {}: {}", r.a_node, r.z_node, out.status(label, r.alive))
        },
        |r| r.alive.to_string(),
    )?;
    out.print(&rendered);
    Ok(())
}
