//! Documentation generator
//!
//! Runs one request through validate, fetch, assemble and complete. Each
//! call is independent; the generator only holds shared, immutable clients.

use crate::completion::CompletionClient;
use crate::error::DocError;
use crate::fetchers::MetadataSource;
use crate::prompt::{build_prompt, SYSTEM_INSTRUCTION};
use crate::repo::RepositoryReference;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// Pipeline from repository link to generated documentation
#[derive(Clone)]
pub struct DocGenerator {
    source: Arc<dyn MetadataSource>,
    completion: Arc<dyn CompletionClient>,
}

impl DocGenerator {
    /// Create a generator from a metadata source and a completion client
    pub fn new(source: Arc<dyn MetadataSource>, completion: Arc<dyn CompletionClient>) -> Self {
        Self { source, completion }
    }

    /// Generate documentation for a raw request payload
    ///
    /// The payload must carry a `repoLink` string; anything else fails with
    /// [`DocError::InvalidInput`] before any outbound call is made.
    pub async fn generate(&self, payload: &Value) -> Result<String, DocError> {
        let repo = RepositoryReference::from_payload(payload)?;
        self.generate_for(&repo).await
    }

    /// Generate documentation for a repository link
    pub async fn generate_link(&self, link: &str) -> Result<String, DocError> {
        let repo = RepositoryReference::parse(link)?;
        self.generate_for(&repo).await
    }

    /// Generate documentation for an already validated repository
    pub async fn generate_for(&self, repo: &RepositoryReference) -> Result<String, DocError> {
        let prompt = self.prompt_for(repo).await?;

        let text = self.completion.complete(SYSTEM_INSTRUCTION, &prompt).await?;
        info!(
            repo = %repo,
            model = self.completion.model(),
            chars = text.len(),
            "Generated documentation"
        );

        Ok(text)
    }

    /// Fetch metadata and assemble the prompt without calling the model
    pub async fn prompt_for(&self, repo: &RepositoryReference) -> Result<String, DocError> {
        debug!(repo = %repo, source = self.source.name(), "Fetching repository metadata");
        let metadata = self.source.fetch(repo).await?;

        let prompt = build_prompt(&metadata.readme, &metadata.file_list);
        debug!(repo = %repo, prompt_len = prompt.len(), "Assembled prompt");

        Ok(prompt)
    }
}
