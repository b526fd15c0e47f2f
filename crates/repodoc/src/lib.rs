//! RepoDoc - repository documentation generator
//!
//! This crate turns a GitHub repository link into LLM-written documentation:
//! it validates the link, reads the README and file tree through the GitHub
//! REST API, assembles a fixed prompt, and forwards it to a chat-completion
//! provider.
//!
//! ## Components
//!
//! - [`RepositoryReference`] - owner/name extraction from a link
//! - [`MetadataSource`] / [`GitHubFetcher`] - README and file tree retrieval
//! - [`build_prompt`] - prompt template
//! - [`CompletionClient`] / [`OpenAiClient`] - chat-completion call
//! - [`DocGenerator`] - the pipeline tying them together
//!
//! Both outbound clients are injected into [`DocGenerator`], so tests can
//! substitute stubs without touching the environment.

pub mod completion;
mod error;
pub mod fetchers;
mod generator;
mod prompt;
mod repo;
mod types;

pub use completion::{CompletionClient, OpenAiClient, OpenAiClientBuilder};
pub use error::{DocError, INVALID_INPUT_MESSAGE};
pub use fetchers::{
    BranchPolicy, GitHubFetcher, GitHubFetcherBuilder, MetadataSource, RepoMetadata,
    DEFAULT_BRANCH, MISSING_README,
};
pub use generator::DocGenerator;
pub use prompt::{build_prompt, SYSTEM_INSTRUCTION};
pub use repo::{RepositoryReference, REPO_LINK_FIELD};
pub use types::{ErrorResponse, GenerateRequest, GenerateResponse};

/// Default User-Agent string
pub const DEFAULT_USER_AGENT: &str = "RepoDoc/1.0";

/// GitHub REST API base URL
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// OpenAI API base URL
pub const OPENAI_API_URL: &str = "https://api.openai.com/v1";

/// Model used when none is configured
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Low temperature keeps the analysis close to deterministic
pub const DEFAULT_TEMPERATURE: f32 = 0.2;
