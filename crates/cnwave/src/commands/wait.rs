//! Blocking waits on link state. A timeout exits non-zero.

use std::time::Duration;

use serde::Serialize;

use cnwave_core::{Controller, StabilitySettings};

use crate::cli::{WaitArgs, WaitCommand};
use crate::error::CliError;
use crate::output::{self, Output};

#[derive(Serialize)]
struct WaitOutcome {
    condition: &'static str,
    reached: bool,
}

pub async fn handle(controller: &Controller, args: WaitArgs, out: &Output) -> Result<(), CliError> {
    let outcome = match args.command {
        WaitCommand::LinkActive { timeout } => WaitOutcome {
            condition: "link-active",
            reached: controller
                .wait_for_link_active(timeout.map(Duration::from_secs))
                .await?,
        },
        WaitCommand::LinkStable {
            timeout,
            interval,
            window,
        } => {
            let settings = stability_settings(controller.config().stability, timeout, interval, window);
            WaitOutcome {
                condition: "link-stable",
                reached: controller.wait_for_link_stable(Some(settings)).await?,
            }
        }
    };

    let rendered = output::render_single(
        out.format,
        &outcome,
        |o| {
            let label = if o.reached { "reached" } else { "timed out" };
            format!("{}: {}", o.condition, out.status(label, o.reached))
        },
        |o| o.reached.to_string(),
    )?;
    out.print(&rendered);

    if outcome.reached {
        Ok(())
    } else {
        Err(CliError::LinkDown {
            what: format!("{} not reached before the deadline", outcome.condition),
        })
    }
}

fn stability_settings(
    base: StabilitySettings,
    timeout: Option<u64>,
    interval: Option<u64>,
    window: Option<u64>,
) -> StabilitySettings {
    StabilitySettings {
        interval: interval.map_or(base.interval, Duration::from_secs),
        timeout: timeout.map_or(base.timeout, Duration::from_secs),
        window: window.map_or(base.window, Duration::from_secs),
    }
}
