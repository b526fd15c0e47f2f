//! GitHub metadata fetcher
//!
//! Reads the README and the recursive file tree of a repository through the
//! GitHub REST API.
//!
//! The tree is requested for a fixed branch name (`main` unless configured).
//! Repositories whose default branch differs fail the tree request with a
//! 404. [`BranchPolicy::Resolve`] opts into an extra lookup of the
//! repository's real default branch.

use crate::error::DocError;
use crate::fetchers::{MetadataSource, RepoMetadata, MISSING_README};
use crate::repo::RepositoryReference;
use crate::{DEFAULT_USER_AGENT, GITHUB_API_URL};
use async_trait::async_trait;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Media type pinned on every GitHub request
const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

/// Branch assumed when none is configured
pub const DEFAULT_BRANCH: &str = "main";

/// GitHub wraps base64 at 60 columns and is not strict about padding
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// How the tree request picks its branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchPolicy {
    /// Always use this branch name
    Fixed(String),
    /// Look up the repository's default branch first, using `fallback` if
    /// the lookup fails
    Resolve {
        /// Branch used when the lookup fails
        fallback: String,
    },
}

impl Default for BranchPolicy {
    fn default() -> Self {
        BranchPolicy::Fixed(DEFAULT_BRANCH.to_string())
    }
}

/// GitHub API repository response (partial)
#[derive(Debug, Deserialize)]
struct GitHubRepo {
    default_branch: String,
}

/// Builder for [`GitHubFetcher`]
#[derive(Debug, Clone, Default)]
pub struct GitHubFetcherBuilder {
    api_base: Option<Url>,
    user_agent: Option<String>,
    token: Option<String>,
    branch: BranchPolicy,
    timeout: Option<Duration>,
}

impl GitHubFetcherBuilder {
    /// Override the API base URL (default `https://api.github.com`)
    pub fn api_base(mut self, url: Url) -> Self {
        self.api_base = Some(url);
        self
    }

    /// Set custom User-Agent
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Authenticate with a personal access token
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Choose how the tree branch is picked
    pub fn branch(mut self, branch: BranchPolicy) -> Self {
        self.branch = branch;
        self
    }

    /// Apply a total timeout to every request. No timeout by default.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the fetcher
    pub fn build(self) -> Result<GitHubFetcher, DocError> {
        let mut headers = HeaderMap::new();
        let user_agent = self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT)),
        );
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));

        if let Some(token) = self.token.as_deref() {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
                DocError::Unexpected("GitHub token contains invalid characters".to_string())
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(DocError::ClientBuildError)?;

        let api_base = self
            .api_base
            .map(|url| url.as_str().trim_end_matches('/').to_string())
            .unwrap_or_else(|| GITHUB_API_URL.to_string());

        Ok(GitHubFetcher {
            client,
            api_base,
            branch: self.branch,
        })
    }
}

/// GitHub metadata fetcher
pub struct GitHubFetcher {
    client: reqwest::Client,
    api_base: String,
    branch: BranchPolicy,
}

impl GitHubFetcher {
    /// Create a new builder
    pub fn builder() -> GitHubFetcherBuilder {
        GitHubFetcherBuilder::default()
    }

    /// Fetch and decode the README
    ///
    /// Returns [`MISSING_README`] when the payload carries no content.
    pub async fn fetch_readme(&self, repo: &RepositoryReference) -> Result<String, DocError> {
        let url = format!("{}/repos/{}/{}/readme", self.api_base, repo.owner, repo.name);
        let payload = self.get_json("README", &url).await?;
        Ok(readme_from_payload(&payload))
    }

    /// Fetch the recursive tree and join its paths with newlines
    pub async fn fetch_file_list(&self, repo: &RepositoryReference) -> Result<String, DocError> {
        let branch = self.branch_for(repo).await;
        let url = format!(
            "{}/repos/{}/{}/git/trees/{}?recursive=1",
            self.api_base, repo.owner, repo.name, branch
        );
        let payload = self.get_json("tree", &url).await?;

        if payload.get("truncated").and_then(Value::as_bool) == Some(true) {
            warn!(repo = %repo, "GitHub truncated the file tree");
        }

        Ok(file_list_from_payload(&payload))
    }

    async fn branch_for(&self, repo: &RepositoryReference) -> String {
        match &self.branch {
            BranchPolicy::Fixed(branch) => branch.clone(),
            BranchPolicy::Resolve { fallback } => match self.resolve_default_branch(repo).await {
                Ok(branch) => branch,
                Err(e) => {
                    warn!(
                        repo = %repo,
                        error = %e,
                        fallback = %fallback,
                        "Default branch lookup failed"
                    );
                    fallback.clone()
                }
            },
        }
    }

    async fn resolve_default_branch(&self, repo: &RepositoryReference) -> Result<String, DocError> {
        let url = format!("{}/repos/{}/{}", self.api_base, repo.owner, repo.name);
        let payload = self.get_json("repository", &url).await?;
        let repo_data: GitHubRepo =
            serde_json::from_value(payload).map_err(|e| DocError::UpstreamRequest {
                resource: "repository",
                message: format!("Failed to parse repo data: {}", e),
            })?;

        debug!(repo = %repo, branch = %repo_data.default_branch, "Resolved default branch");
        Ok(repo_data.default_branch)
    }

    async fn get_json(&self, resource: &'static str, url: &str) -> Result<Value, DocError> {
        debug!(resource, url, "Requesting GitHub API");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DocError::upstream(resource, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DocError::UpstreamFetch {
                resource,
                status: status.as_u16(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| DocError::upstream(resource, e))
    }
}

#[async_trait]
impl MetadataSource for GitHubFetcher {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn fetch(&self, repo: &RepositoryReference) -> Result<RepoMetadata, DocError> {
        // The two requests don't depend on each other
        let (readme, file_list) =
            futures::try_join!(self.fetch_readme(repo), self.fetch_file_list(repo))?;

        Ok(RepoMetadata { readme, file_list })
    }
}

/// Extract README text from a contents API payload
fn readme_from_payload(payload: &Value) -> String {
    let encoded = payload
        .get("content")
        .and_then(Value::as_str)
        .filter(|content| !content.is_empty());

    match encoded {
        Some(encoded) => decode_base64_content(encoded).unwrap_or_else(|| {
            warn!("README content is not valid base64");
            MISSING_README.to_string()
        }),
        None => MISSING_README.to_string(),
    }
}

/// Decode base64-encoded content (GitHub API returns README as base64)
fn decode_base64_content(encoded: &str) -> Option<String> {
    // GitHub base64 has newlines, remove them
    let cleaned: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();

    let decoded = LENIENT_BASE64.decode(cleaned.as_bytes()).ok()?;
    Some(String::from_utf8_lossy(&decoded).into_owned())
}

/// Join tree entry paths; anything other than an array yields an empty list
fn file_list_from_payload(payload: &Value) -> String {
    match payload.get("tree") {
        Some(Value::Array(entries)) => entries
            .iter()
            .map(|entry| entry.get("path").and_then(Value::as_str).unwrap_or_default())
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_base64_content() {
        assert_eq!(decode_base64_content("SGVsbG8="), Some("Hello".to_string()));

        // Line-wrapped like the contents API
        assert_eq!(
            decode_base64_content("SGVsbG8s\nIFdvcmxk\nIQ==\n"),
            Some("Hello, World!".to_string())
        );

        // Missing padding
        assert_eq!(decode_base64_content("SGVsbG8"), Some("Hello".to_string()));

        assert_eq!(decode_base64_content("not base64!"), None);
    }

    #[test]
    fn test_decode_invalid_utf8_is_lossy() {
        // 0xff 0xfe
        assert_eq!(decode_base64_content("//4="), Some("\u{fffd}\u{fffd}".to_string()));
    }

    #[test]
    fn test_readme_from_payload() {
        let payload = json!({ "content": "SGVsbG8=", "encoding": "base64" });
        assert_eq!(readme_from_payload(&payload), "Hello");
    }

    #[test]
    fn test_readme_placeholder_when_absent() {
        assert_eq!(readme_from_payload(&json!({})), MISSING_README);
        assert_eq!(readme_from_payload(&json!({ "content": "" })), MISSING_README);
        assert_eq!(readme_from_payload(&json!({ "content": null })), MISSING_README);
    }

    #[test]
    fn test_file_list_from_payload() {
        let payload = json!({
            "sha": "abc",
            "tree": [
                { "path": "a.ts", "type": "blob" },
                { "path": "src", "type": "tree" },
                { "path": "src/b.ts", "type": "blob" }
            ],
            "truncated": false
        });
        assert_eq!(file_list_from_payload(&payload), "a.ts\nsrc\nsrc/b.ts");
    }

    #[test]
    fn test_file_list_non_array_tree() {
        assert_eq!(file_list_from_payload(&json!({})), "");
        assert_eq!(file_list_from_payload(&json!({ "tree": null })), "");
        assert_eq!(file_list_from_payload(&json!({ "tree": "a.ts" })), "");
        assert_eq!(file_list_from_payload(&json!({ "tree": { "path": "a.ts" } })), "");
    }

    #[test]
    fn test_file_list_entry_without_path() {
        let payload = json!({ "tree": [{ "path": "a.ts" }, { "sha": "x" }, { "path": "b.ts" }] });
        assert_eq!(file_list_from_payload(&payload), "a.ts\n\nb.ts");
    }

    #[test]
    fn test_branch_policy_default() {
        assert_eq!(BranchPolicy::default(), BranchPolicy::Fixed("main".to_string()));
    }

    #[test]
    fn test_builder_api_base_trailing_slash() {
        let fetcher = GitHubFetcher::builder()
            .api_base(Url::parse("http://127.0.0.1:8080/").unwrap())
            .build()
            .unwrap();
        assert_eq!(fetcher.api_base, "http://127.0.0.1:8080");

        let fetcher = GitHubFetcher::builder().build().unwrap();
        assert_eq!(fetcher.api_base, GITHUB_API_URL);
    }

    #[test]
    fn test_builder_rejects_bad_token() {
        let result = GitHubFetcher::builder().token("bad\ntoken").build();
        assert!(matches!(result, Err(DocError::Unexpected(_))));
    }
}
