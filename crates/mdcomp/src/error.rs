//! CLI error types.

use mdcomp_components::{SetupError, TemplateError};
use mdcomp_config::ConfigError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Template(#[from] TemplateError),

    #[error("{0}")]
    Setup(#[from] SetupError),

    #[error("{0}")]
    Validation(String),
}
