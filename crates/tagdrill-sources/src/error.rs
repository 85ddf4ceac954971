//! Source error types.

use thiserror::Error;

/// Errors that can occur when fetching a reference table.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The server returned an error response other than 404.
    #[error("HTTP {status} fetching {url}")]
    Http { status: u16, url: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    Network(String),

    /// The table exists but could not be read.
    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },
}
