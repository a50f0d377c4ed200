//! `mdcomp render` command implementation.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use mdcomp_components::{ComponentRenderer, HostConfig};
use mdcomp_config::{CliSettings, Config};

use super::read_input;
use crate::error::CliError;
use crate::output::Output;
use crate::templates::component_set;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markdown file to render, or `-` for stdin.
    input: PathBuf,

    /// Write HTML to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover mdcomp.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Disable GFM extensions (overrides config).
    #[arg(long)]
    no_gfm: bool,

    /// Component invocation timeout in milliseconds, 0 to wait forever (overrides config).
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, template compilation or I/O fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            gfm: self.no_gfm.then_some(false),
            timeout_ms: self.timeout_ms,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let host_config = HostConfig::default()
            .with_queue_capacity(config.render.queue_capacity)
            .with_timeout(config.render.timeout());
        let (registry, host) = component_set(&config)?.build(host_config)?;
        let renderer = ComponentRenderer::new(Arc::new(registry), host).with_gfm(config.render.gfm);

        let markdown = read_input(&self.input)?;
        let rendered = renderer.render(&markdown);

        for warning in &rendered.warnings {
            output.warning(&format!("Warning: {warning}"));
        }
        tracing::info!(
            input = %self.input.display(),
            bytes = rendered.html.len(),
            warnings = rendered.warnings.len(),
            "Rendered document"
        );

        match &self.output {
            Some(path) => {
                std::fs::write(path, &rendered.html)?;
                output.success(&format!("Wrote {}", path.display()));
            }
            None => std::io::stdout().lock().write_all(rendered.html.as_bytes())?,
        }

        Ok(())
    }
}
