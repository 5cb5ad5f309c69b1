//! Error types for repo-ferry

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for ferry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for ferry operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Input file does not exist
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required secret is not available
    #[error("Missing secret: {0}")]
    MissingSecret(String),

    /// Language model invocation error
    #[error("Language model error: {0}")]
    Model(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}
