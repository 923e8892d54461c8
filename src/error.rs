use std::path::PathBuf;
use thiserror::Error;
#[derive(Debug, Error)]
pub enum MediaTreeError {
    #[error("Path not found: {path}")]
    NotFound { path: String },
    #[error("Listing request failed with status {status}: {body}")]
    Transport { status: u16, body: String },
    #[error("Could not decode listing for {path}: {message}")]
    Decode { path: String, message: String },
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Invalid exclude pattern: {0}")]
    Pattern(String),
    #[error("JSON serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}
impl MediaTreeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MediaTreeError::Io {
            path: path.into(),
            source,
        }
    }
    pub(crate) fn not_found(path: impl Into<String>) -> Self {
        MediaTreeError::NotFound { path: path.into() }
    }
}
pub type Result<T> = std::result::Result<T, MediaTreeError>;
