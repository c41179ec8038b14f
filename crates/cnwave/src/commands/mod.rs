//! Command dispatch: bridges CLI args -> `Controller` calls -> output.

pub mod config_cmd;
pub mod link;
pub mod overrides;
pub mod system;
pub mod topology;
pub mod wait;

use cnwave_core::Controller;

use crate::cli::Command;
use crate::error::CliError;
use crate::output::Output;

/// Dispatch a controller-bound command to its handler.
pub async fn dispatch(cmd: Command, controller: &Controller, out: &Output) -> Result<(), CliError> {
    match cmd {
        // Reads its record file before logging in.
        Command::Link(args) => link::handle(controller, args, out).await,
        other => {
            controller.connect().await?;
            run_connected(other, controller, out).await
        }
    }
}

async fn run_connected(cmd: Command, controller: &Controller, out: &Output) -> Result<(), CliError> {
    match cmd {
        Command::Topology => topology::show(controller, out).await,
        Command::Nodes => topology::nodes(controller, out).await,
        Command::Links => topology::links(controller, out).await,
        Command::LinkAlive { a_node, z_node } => {
            topology::link_alive(controller, &a_node, &z_node, out).await
        }
        Command::Tdd(args) => overrides::tdd(controller, args, out).await,
        Command::Mcs(args) => overrides::mcs(controller, args, out).await,
        Command::Overrides(args) => overrides::show(controller, args, out).await,
        Command::Wait(args) => wait::handle(controller, args, out).await,
        Command::Versions(args) => system::versions(controller, args, out).await,
        Command::DeviceInfo => system::device_info(controller, out).await,
        // Handled before a controller exists
        Command::Link(_) | Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
