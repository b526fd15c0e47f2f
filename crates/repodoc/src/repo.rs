//! Repository link validation
//!
//! Extracts the owner/name pair from a submitted GitHub link. Only the
//! `github.com/<owner>/<name>` shape is checked; trailing slashes, letter
//! case and `.git` suffixes are passed through untouched.

use crate::error::DocError;
use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::LazyLock;

/// Field of the inbound JSON payload that carries the link
pub const REPO_LINK_FIELD: &str = "repoLink";

static REPO_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"github\.com/([^/]+)/([^/]+)").expect("repository pattern is valid")
});

/// Owner/name pair identifying a repository on GitHub
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryReference {
    /// User or organization
    pub owner: String,
    /// Repository name
    pub name: String,
}

impl RepositoryReference {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parse a link such as `https://github.com/rust-lang/rust`
    pub fn parse(link: &str) -> Result<Self, DocError> {
        let captures = REPO_PATTERN.captures(link).ok_or(DocError::InvalidInput)?;

        Ok(Self::new(&captures[1], &captures[2]))
    }

    /// Extract and parse the link from a request payload
    ///
    /// Fails with [`DocError::InvalidInput`] when the field is absent, is not a
    /// string, or does not look like a GitHub repository link.
    pub fn from_payload(payload: &Value) -> Result<Self, DocError> {
        let link = payload
            .get(REPO_LINK_FIELD)
            .and_then(Value::as_str)
            .ok_or(DocError::InvalidInput)?;

        Self::parse(link)
    }
}

impl fmt::Display for RepositoryReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
