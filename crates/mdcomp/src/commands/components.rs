//! `mdcomp components` command implementation.

use std::path::PathBuf;

use clap::Args;
use mdcomp_config::Config;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the components command.
#[derive(Args)]
pub(crate) struct ComponentsArgs {
    /// Path to configuration file (default: auto-discover mdcomp.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl ComponentsArgs {
    /// Execute the components command.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::stdout();
        let config = Config::load(self.config.as_deref(), None)?;

        if config.components.is_empty() {
            output.muted("No components configured.");
            return Ok(());
        }

        for (name, component) in &config.components {
            if component.aliases.is_empty() {
                output.success(name);
            } else {
                output.success(&format!("{name} (aliases: {})", component.aliases.join(", ")));
            }
            match &component.template_path {
                Some(path) => output.muted(&format!("  template: {}", path.display())),
                None => output.muted("  template: inline"),
            }
            for (param, spec) in &component.params {
                let required = if spec.required() { ", required" } else { "" };
                output.info(&format!("  {param}: {}{required}", spec.param_type()));
            }
        }

        Ok(())
    }
}
