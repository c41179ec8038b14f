//! Profile selection and flag overrides on top of `cnwave_config`.

use std::time::Duration;

use clap::ValueEnum;

use cnwave_config::{Config, Profile};
use cnwave_core::ControllerConfig;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// `--output`, else `defaults.output`, else table.
pub fn output_format(global: &GlobalOpts, config: &Config) -> OutputFormat {
    global.output.unwrap_or_else(|| {
        OutputFormat::from_str(&config.defaults.output, true).unwrap_or(OutputFormat::Table)
    })
}

/// Build a `ControllerConfig` from the config file, profile, and flags.
///
/// Without a matching profile, `--host` alone is enough; credentials then
/// come from `--username` and the environment.
pub fn build_controller_config(
    global: &GlobalOpts,
    config: &Config,
) -> Result<ControllerConfig, CliError> {
    let name = active_profile_name(global, config);

    let base = match config.profiles.get(&name) {
        Some(profile) => profile.clone(),
        None if global.host.is_some() => Profile {
            port: cnwave_config::DEFAULT_PORT,
            ..Profile::default()
        },
        None if global.profile.is_some() => {
            let mut available: Vec<&str> = config.profiles.keys().map(String::as_str).collect();
            available.sort_unstable();
            return Err(CliError::ProfileNotFound {
                name,
                available: available.join(", "),
            });
        }
        None => {
            return Err(CliError::NoConfig {
                path: cnwave_config::config_path().display().to_string(),
            });
        }
    };

    let profile = apply_overrides(base, global);
    let mut controller = cnwave_config::profile_to_controller_config(&profile, &name, &config.defaults)?;
    if let Some(secs) = global.timeout {
        controller.timeout = Duration::from_secs(secs);
    }
    Ok(controller)
}

fn apply_overrides(mut profile: Profile, global: &GlobalOpts) -> Profile {
    if let Some(host) = &global.host {
        profile.host.clone_from(host);
        profile.url = None;
    }
    if let Some(port) = global.port {
        profile.port = port;
    }
    if let Some(username) = &global.username {
        profile.username = Some(username.clone());
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    profile
}
