//! TDD, MCS and raw override handlers.

use serde::Serialize;

use cnwave_core::{Controller, controller::DEFAULT_MCS_NODE};

use crate::cli::{McsArgs, McsCommand, OverridesArgs, OverridesCommand, TddArgs, TddCommand};
use crate::error::CliError;
use crate::output::{self, Output};

#[derive(Serialize)]
struct Setting<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    node: Option<&'a str>,
    value: i64,
}

fn print_setting(out: &Output, setting: &Setting<'_>) -> Result<(), CliError> {
    let rendered = output::render_single(
        out.format,
        setting,
        |s| match s.node {
            Some(node) => format!("{} ({node}): {}", s.name, s.value),
            None => format!("{}: {}", s.name, s.value),
        },
        |s| s.value.to_string(),
    )?;
    out.print(&rendered);
    Ok(())
}

pub async fn tdd(controller: &Controller, args: TddArgs, out: &Output) -> Result<(), CliError> {
    let value = match args.command {
        TddCommand::Get => controller.current_tdd().await?,
        TddCommand::Set { value } => {
            controller.set_tdd(value).await?;
            value
        }
    };
    print_setting(
        out,
        &Setting {
            name: "tddSlotRatio",
            node: None,
            value,
        },
    )
}

pub async fn mcs(controller: &Controller, args: McsArgs, out: &Output) -> Result<(), CliError> {
    match args.command {
        McsCommand::Get { node } => {
            let value = controller.current_mcs(node.as_deref()).await?;
            print_setting(
                out,
                &Setting {
                    name: "laMaxMcs",
                    node: Some(node.as_deref().unwrap_or(DEFAULT_MCS_NODE)),
                    value,
                },
            )
        }
        McsCommand::Set { value } => {
            controller.set_mcs(value).await?;
            print_setting(
                out,
                &Setting {
                    name: "laMaxMcs",
                    node: None,
                    value,
                },
            )
        }
    }
}

pub async fn show(controller: &Controller, args: OverridesArgs, out: &Output) -> Result<(), CliError> {
    let rendered = match args.command {
        OverridesCommand::Network => {
            output::render_document(out.format, &controller.network_overrides().await?)?
        }
        OverridesCommand::Node => {
            output::render_document(out.format, &controller.node_overrides().await?)?
        }
    };
    out.print(&rendered);
    Ok(())
}
