//! RepoDoc CLI - generate repository documentation from the command line or over HTTP

mod server;

use clap::{Args, Parser, Subcommand, ValueEnum};
use repodoc::{
    BranchPolicy, DocError, DocGenerator, ErrorResponse, GenerateResponse, GitHubFetcher,
    OpenAiClient,
};
use std::io::{self, Write};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Output format for generate subcommand
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    /// Generated markdown as-is
    #[default]
    Md,
    /// `{"text": ...}` or `{"error": ...}`
    Json,
}

/// RepoDoc - turn a GitHub repository into LLM-written documentation
#[derive(Parser, Debug)]
#[command(name = "repodoc")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the web UI and the generate endpoint
    Serve {
        /// Address to listen on
        #[arg(long, env = "REPODOC_BIND", default_value = "127.0.0.1:3000")]
        bind: SocketAddr,

        #[command(flatten)]
        generator: GeneratorArgs,
    },
    /// Generate documentation for one repository and print it
    Generate {
        /// GitHub repository URL
        url: String,

        /// Output format
        #[arg(long, short, default_value = "md")]
        output: OutputFormat,

        #[command(flatten)]
        generator: GeneratorArgs,
    },
}

/// Settings for the upstream clients
#[derive(Args, Debug, Clone)]
struct GeneratorArgs {
    /// Completion provider API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Completion provider base URL
    #[arg(long, env = "OPENAI_BASE_URL", default_value = repodoc::OPENAI_API_URL)]
    openai_base_url: Url,

    /// Model identifier
    #[arg(long, env = "REPODOC_MODEL", default_value = repodoc::DEFAULT_MODEL)]
    model: String,

    /// Sampling temperature
    #[arg(long, env = "REPODOC_TEMPERATURE", default_value_t = repodoc::DEFAULT_TEMPERATURE)]
    temperature: f32,

    /// GitHub REST API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = repodoc::GITHUB_API_URL)]
    github_api_url: Url,

    /// GitHub token, raises the API rate limit
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,

    /// Branch whose tree is listed
    #[arg(long, env = "REPODOC_DEFAULT_BRANCH", default_value = repodoc::DEFAULT_BRANCH)]
    default_branch: String,

    /// Look up each repository's default branch instead of assuming --default-branch
    #[arg(long, env = "REPODOC_RESOLVE_DEFAULT_BRANCH")]
    resolve_default_branch: bool,

    /// Timeout for each upstream request, in seconds (none by default)
    #[arg(long, env = "REPODOC_UPSTREAM_TIMEOUT_SECS")]
    upstream_timeout_secs: Option<u64>,

    /// Custom User-Agent
    #[arg(long)]
    user_agent: Option<String>,
}

impl GeneratorArgs {
    fn branch_policy(&self) -> BranchPolicy {
        if self.resolve_default_branch {
            BranchPolicy::Resolve {
                fallback: self.default_branch.clone(),
            }
        } else {
            BranchPolicy::Fixed(self.default_branch.clone())
        }
    }

    /// Build the generator with both upstream clients
    fn build(&self) -> Result<DocGenerator, DocError> {
        if self.api_key.trim().is_empty() {
            return Err(DocError::Unexpected(
                "OPENAI_API_KEY must not be empty".to_string(),
            ));
        }

        let timeout = self.upstream_timeout_secs.map(Duration::from_secs);

        let mut github = GitHubFetcher::builder()
            .api_base(self.github_api_url.clone())
            .branch(self.branch_policy());
        if let Some(token) = &self.github_token {
            github = github.token(token);
        }

        let mut openai = OpenAiClient::builder(&self.api_key)
            .base_url(self.openai_base_url.clone())
            .model(&self.model)
            .temperature(self.temperature);

        if let Some(ua) = &self.user_agent {
            github = github.user_agent(ua);
            openai = openai.user_agent(ua);
        }
        if let Some(timeout) = timeout {
            github = github.timeout(timeout);
            openai = openai.timeout(timeout);
        }

        Ok(DocGenerator::new(
            Arc::new(github.build()?),
            Arc::new(openai.build()?),
        ))
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();

    match cli.command {
        Commands::Serve { bind, generator } => {
            let generator = build_or_exit(&generator);
            if let Err(e) = server::run_server(bind, generator).await {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Generate {
            url,
            output,
            generator,
        } => {
            let generator = build_or_exit(&generator);
            run_generate(&generator, &url, output).await;
        }
    }
}

fn build_or_exit(args: &GeneratorArgs) -> DocGenerator {
    args.build().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    })
}

async fn run_generate(generator: &DocGenerator, url: &str, output: OutputFormat) {
    let result = generator.generate_link(url).await;

    match output {
        OutputFormat::Md => match result {
            Ok(text) => writeln_safe(&text),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        OutputFormat::Json => {
            let failed = result.is_err();
            writeln_safe(&format_json(&result));
            if failed {
                std::process::exit(1);
            }
        }
    }
}

/// Render a generate result with the same body shapes the HTTP endpoint uses
fn format_json(result: &Result<String, DocError>) -> String {
    let body = match result {
        Ok(text) => serde_json::to_string_pretty(&GenerateResponse { text: text.clone() }),
        Err(e) => serde_json::to_string_pretty(&ErrorResponse::from(e)),
    };
    body.unwrap_or_else(|e| {
        eprintln!("Error serializing response: {}", e);
        std::process::exit(1);
    })
}

/// Write to stdout, exit silently on broken pipe
fn writeln_safe(s: &str) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = writeln!(handle, "{}", s) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        eprintln!("Error writing to stdout: {}", e);
        std::process::exit(1);
    }
}
