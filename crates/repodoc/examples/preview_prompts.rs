//! Example: Fetch live repository metadata and preview the assembled prompts
//!
//! Run with: cargo run -p repodoc --example preview_prompts
//!
//! No completion call is made, so no API key is needed. Set GITHUB_TOKEN to
//! avoid the anonymous rate limit.

use repodoc::{
    BranchPolicy, DocError, GitHubFetcher, MetadataSource, RepositoryReference, MISSING_README,
};

/// Test case definition
struct TestCase {
    link: &'static str,
    description: &'static str,
    expect_readme: bool,
    expect_path: Option<&'static str>,
}

/// Define test cases here
const TEST_CASES: &[TestCase] = &[
    TestCase {
        link: "https://github.com/tokio-rs/axum",
        description: "Repository on the assumed default branch",
        expect_readme: true,
        expect_path: Some("Cargo.toml"),
    },
    TestCase {
        link: "https://github.com/serde-rs/json",
        description: "Repository whose default branch is master (resolved)",
        expect_readme: true,
        expect_path: Some("src/lib.rs"),
    },
];

#[tokio::main]
async fn main() {
    println!("RepoDoc Prompt Preview");
    println!("======================\n");

    let mut builder = GitHubFetcher::builder().branch(BranchPolicy::Resolve {
        fallback: repodoc::DEFAULT_BRANCH.to_string(),
    });
    if let Ok(token) = std::env::var("GITHUB_TOKEN") {
        builder = builder.token(token);
    }
    let fetcher = match builder.build() {
        Ok(fetcher) => fetcher,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let mut passed = 0;
    let mut failed = 0;

    for (i, case) in TEST_CASES.iter().enumerate() {
        println!("{}. {}", i + 1, case.description);
        println!("   URL: {}", case.link);

        match preview(&fetcher, case).await {
            Ok(true) => {
                println!("   ✓ PASS\n");
                passed += 1;
            }
            Ok(false) => {
                println!("   ✗ FAIL (expectations not met)\n");
                failed += 1;
            }
            Err(e) => {
                println!("   Error: {}", e);
                println!("   ✗ FAIL\n");
                failed += 1;
            }
        }
    }

    println!("======================");
    println!("Results: {} passed, {} failed", passed, failed);

    if failed > 0 {
        std::process::exit(1);
    }
}

async fn preview(fetcher: &GitHubFetcher, case: &TestCase) -> Result<bool, DocError> {
    let repo = RepositoryReference::parse(case.link)?;
    let metadata = fetcher.fetch(&repo).await?;
    let prompt = repodoc::build_prompt(&metadata.readme, &metadata.file_list);

    let preview = metadata.readme.chars().take(100).collect::<String>();
    println!("   README: {}", preview.replace('\n', " "));
    println!("   Files: {}", metadata.file_list.lines().count());
    println!("   Prompt: {} bytes", prompt.len());

    if case.expect_readme && metadata.readme == MISSING_README {
        println!("   Expected a README");
        return Ok(false);
    }

    if let Some(expected) = case.expect_path {
        if !metadata.file_list.lines().any(|path| path == expected) {
            println!("   Expected file list to contain '{}'", expected);
            return Ok(false);
        }
    }

    Ok(true)
}
