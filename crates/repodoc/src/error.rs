//! Error types for RepoDoc

use thiserror::Error;

/// Message returned to callers whenever the submitted link is unusable
pub const INVALID_INPUT_MESSAGE: &str = "Invalid GitHub repository URL.";

/// Errors that can occur while generating documentation
///
/// Every stage of the pipeline returns one of these; the relay maps them to
/// an HTTP status with [`DocError::status_code`].
#[derive(Debug, Error)]
pub enum DocError {
    /// The request payload has no usable repository link
    #[error("Invalid GitHub repository URL.")]
    InvalidInput,

    /// GitHub answered with a non-success status
    #[error("GitHub {resource} fetch failed: {status}")]
    UpstreamFetch {
        /// Which resource was requested ("README", "tree", "repository")
        resource: &'static str,
        /// HTTP status code returned by GitHub
        status: u16,
    },

    /// GitHub could not be reached, or returned something that isn't JSON
    #[error("GitHub {resource} request failed: {message}")]
    UpstreamRequest {
        /// Which resource was requested
        resource: &'static str,
        /// Transport or decoding error
        message: String,
    },

    /// Completion provider failed or returned an error payload
    #[error("Completion request failed: {0}")]
    Completion(String),

    /// Failed to build an HTTP client
    #[error("Failed to create HTTP client")]
    ClientBuildError(#[source] reqwest::Error),

    /// Anything else
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl DocError {
    /// Create an upstream error from a reqwest error
    pub fn upstream(resource: &'static str, err: reqwest::Error) -> Self {
        DocError::UpstreamRequest {
            resource,
            message: err.to_string(),
        }
    }

    /// HTTP status the relay should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            DocError::InvalidInput => 400,
            _ => 500,
        }
    }

    /// Returns true when the caller, not an upstream service, is at fault
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}
