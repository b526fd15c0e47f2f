//! Repository metadata fetchers
//!
//! Design: a fetcher turns an owner/name pair into the two pieces of text the
//! prompt needs (README and file list). The generator only sees the
//! [`MetadataSource`] trait, so tests can swap in a stub.

mod github;

pub use github::{BranchPolicy, GitHubFetcher, GitHubFetcherBuilder, DEFAULT_BRANCH};

use crate::error::DocError;
use crate::repo::RepositoryReference;
use async_trait::async_trait;

/// Placeholder used when a repository has no README content
pub const MISSING_README: &str = "**No README.md found in this repository.**";

/// Text gathered from the hosting provider for one repository
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoMetadata {
    /// Decoded README, or [`MISSING_README`]
    pub readme: String,
    /// File paths joined with `\n`; empty when no tree was returned
    pub file_list: String,
}

/// Source of README and file tree for a repository
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Unique identifier for this source (for logging/debugging)
    fn name(&self) -> &'static str;

    /// Fetch README and file tree
    ///
    /// Fails on the first upstream error; a missing README or an empty tree
    /// are not errors.
    async fn fetch(&self, repo: &RepositoryReference) -> Result<RepoMetadata, DocError>;
}
