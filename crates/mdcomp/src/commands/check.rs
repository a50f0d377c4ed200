//! `mdcomp check` command implementation.

use std::path::PathBuf;

use clap::Args;
use mdcomp_components::{collect_tags, scan};
use mdcomp_config::Config;
use mdcomp_renderer::MarkdownRenderer;

use super::read_input;
use crate::error::CliError;
use crate::output::Output;
use crate::templates::registry;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    /// Markdown file to check, or `-` for stdin.
    input: PathBuf,

    /// Path to configuration file (default: auto-discover mdcomp.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl CheckArgs {
    /// Execute the check command.
    ///
    /// # Errors
    ///
    /// Returns an error if the document uses unregistered component tags, or
    /// if configuration or I/O fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::stdout();
        let diagnostics = Output::new();

        let config = Config::load(self.config.as_deref(), None)?;
        let registry = registry(&config);
        let markdown = read_input(&self.input)?;

        let scanned = scan(&markdown);
        let options = MarkdownRenderer::new()
            .with_gfm(config.render.gfm)
            .parser_options();
        let tags = collect_tags(&scanned.nodes, options);

        let mut unregistered = 0;
        for tag in &tags {
            let placement = if tag.inline { " (inline)" } else { "" };
            let line = format!("{:>5}  <{}>{placement}", tag.line, tag.name);
            if registry.is_registered(&tag.name) {
                output.success(&format!("{line}  registered"));
            } else {
                unregistered += 1;
                output.warning(&format!("{line}  not registered"));
            }
        }
        for warning in &scanned.warnings {
            diagnostics.warning(&format!("Warning: {warning}"));
        }

        output.muted(&format!(
            "{} component tag(s), {unregistered} not registered",
            tags.len()
        ));

        if unregistered > 0 {
            return Err(CliError::Validation(format!(
                "{unregistered} component tag(s) are not registered"
            )));
        }
        Ok(())
    }
}
