//! Config subcommand handlers.

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config;
use crate::error::CliError;
use crate::output::{self, Output};

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            println!("{}", cnwave_config::config_path().display());
            Ok(())
        }

        // A missing config file renders the defaults.
        ConfigCommand::Show => {
            let cfg = cnwave_config::load_config()?;
            let format = config::output_format(global, &cfg);
            let out = Output::new(format, global.color, global.quiet);

            let rendered = match format {
                OutputFormat::Table => cnwave_config::render_redacted(&cfg)?,
                OutputFormat::Plain => {
                    let mut names: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
                    names.sort_unstable();
                    names.join("\n")
                }
                structured => output::render_document(structured, &cnwave_config::redact(&cfg))?,
            };
            out.print(&rendered);
            Ok(())
        }
    }
}
