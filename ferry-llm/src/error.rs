//! Error types for language model calls

use thiserror::Error;

/// Result type for language model operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to a language model
#[derive(Error, Debug)]
pub enum Error {
    /// Transport failure, including timeouts
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response body did not have the expected shape
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// The prompt was blocked or no candidate came back
    #[error("Empty response: {0}")]
    Empty(String),

    /// Client construction failed
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<Error> for ferry_core::Error {
    fn from(err: Error) -> Self {
        ferry_core::Error::Model(err.to_string())
    }
}
