//! Error types for Confluence publishing.

use std::path::PathBuf;

/// Error talking to the Confluence REST API.
#[derive(Debug, thiserror::Error)]
pub enum ConfluenceError {
    /// Transport failure: connection, TLS, timeout.
    #[error("HTTP request failed")]
    HttpRequest(#[from] ureq::Error),

    /// The server answered with a 4xx or 5xx status.
    #[error("HTTP error: {status} - {body}")]
    HttpResponse { status: u16, body: String },

    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    /// The server answered without a field the client needs.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

/// Error publishing a built model.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error(transparent)]
    Confluence(#[from] ConfluenceError),

    /// Missing or invalid `[confluence]` section.
    #[error(transparent)]
    Config(#[from] graphyte_config::ConfigError),

    /// The authorization sheet could not be read.
    #[error(transparent)]
    Sheet(#[from] graphyte_params::SheetError),

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The model was built without a zip archive.
    #[error("Publishing requires a packaged model; build with --zip or --id")]
    MissingArchive,
}
