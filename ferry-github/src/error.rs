//! Error types for GitHub operations

use thiserror::Error;

/// Result type for GitHub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during GitHub operations
#[derive(Error, Debug)]
pub enum Error {
    /// GitHub API error not covered by a more specific variant
    #[error("GitHub API error: {0}")]
    Api(octocrab::Error),

    /// Authentication error
    #[error("GitHub authentication error: {0}")]
    Auth(String),

    /// Token lacks the scope for this operation (403)
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Resource does not exist or is not visible (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Feature disabled for the repository, e.g. issues turned off (410)
    #[error("Gone: {0}")]
    Gone(String),

    /// Validation failed, e.g. the label already exists (422)
    #[error("Validation failed: {0}")]
    Unprocessable(String),

    /// Transport error outside octocrab (GraphQL requests)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map a status code and message to the matching variant
    pub(crate) fn from_status(status: u16, message: String) -> Option<Self> {
        match status {
            403 => Some(Error::Forbidden(message)),
            404 => Some(Error::NotFound(message)),
            410 => Some(Error::Gone(message)),
            422 => Some(Error::Unprocessable(message)),
            _ => None,
        }
    }
}

impl From<octocrab::Error> for Error {
    fn from(err: octocrab::Error) -> Self {
        match err {
            octocrab::Error::GitHub { source, backtrace } => {
                let status = source.status_code.as_u16();
                Error::from_status(status, source.message.clone()).unwrap_or(Error::Api(
                    octocrab::Error::GitHub { source, backtrace },
                ))
            }
            other => Error::Api(other),
        }
    }
}
