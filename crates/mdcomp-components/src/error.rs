//! Error types for component rendering and setup.

use std::io;
use std::time::Duration;

use crate::schema::SchemaError;

/// Failure of a single component invocation.
///
/// These never abort a document render: the pipeline writes the literal
/// fallback tag followed by an HTML comment carrying the error message.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ComponentError {
    /// A required value parameter was not supplied.
    #[error("missing required parameter '{0}'")]
    MissingParameter(String),
    /// The component reported an error.
    #[error("{0}")]
    Failed(String),
    /// The component panicked while rendering.
    #[error("component panicked: {0}")]
    Panicked(String),
    /// The host thread is gone.
    #[error("component host is unavailable")]
    HostUnavailable,
    /// No reply within the configured timeout.
    #[error("component did not respond within {0:?}")]
    Timeout(Duration),
    /// The host has no component registered under this name.
    #[error("no component is hosted under the name '{0}'")]
    NotHosted(String),
}

impl ComponentError {
    /// Create a [`ComponentError::Failed`] from any message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Error building registries and hosts from a [`ComponentSet`](crate::ComponentSet).
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("invalid component name '{0}': names must match [A-Z][A-Za-z0-9]*")]
    InvalidName(String),
    #[error("failed to start component host thread: {0}")]
    Spawn(#[from] io::Error),
}
