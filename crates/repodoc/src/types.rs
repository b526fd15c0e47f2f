//! Wire types for the generate endpoint

use crate::error::DocError;
use serde::{Deserialize, Serialize};

/// Request body for `POST /api/generate`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Link to a GitHub repository
    #[serde(rename = "repoLink")]
    pub repo_link: String,
}

impl GenerateRequest {
    /// Create a new request with the given link
    pub fn new(repo_link: impl Into<String>) -> Self {
        Self {
            repo_link: repo_link.into(),
        }
    }
}

/// Successful response body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// Generated markdown
    pub text: String,
}

/// Failure response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message
    pub error: String,
}

impl From<&DocError> for ErrorResponse {
    fn from(err: &DocError) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}
