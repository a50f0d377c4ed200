//! mdcomp CLI - markdown component tags.
//!
//! Provides commands for:
//! - `render`: Render a markdown document with configured template components
//! - `check`: List the component tags a document uses
//! - `components`: List configured components and their parameters

mod commands;
mod error;
mod output;
mod templates;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{CheckArgs, ComponentsArgs, RenderArgs};
use output::Output;

/// mdcomp - Markdown component tags.
#[derive(Parser)]
#[command(name = "mdcomp", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a markdown document to HTML.
    Render(RenderArgs),
    /// Check which component tags a document uses.
    Check(CheckArgs),
    /// List configured components.
    Components(ComponentsArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let verbose = matches!(&cli.command, Commands::Render(args) if args.verbose);
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Render(args) => args.execute(),
        Commands::Check(args) => args.execute(),
        Commands::Components(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
