//! CLI error types.

use graphyte_confluence::PublishError;
use graphyte_module::ModuleError;
use graphyte_site::{BuildError, ModelError};

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Model(#[from] ModelError),

    #[error("{0}")]
    Module(#[from] ModuleError),

    #[error("{0}")]
    Build(#[from] BuildError),

    #[error("{0}")]
    Publish(#[from] PublishError),

    #[error("{0}")]
    Validation(String),
}

impl CliError {
    /// Line shown to the user. Numbered model errors already read
    /// `Error <code>: ...` and are printed as they are.
    pub(crate) fn report(&self) -> String {
        match self {
            Self::Model(err) if err.code().is_some() => err.to_string(),
            other => format!("Error: {other}"),
        }
    }
}
