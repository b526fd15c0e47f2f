//! Prompt assembly

/// System role instruction sent with every completion request
pub const SYSTEM_INSTRUCTION: &str = "You are a helpful and precise repo analyzer.";

/// Analysis instructions placed ahead of the repository contents
const ANALYSIS_INSTRUCTIONS: &str = r#"
You are a technical repository analyzer. I will give you the contents of a GitHub repo; please provide a structured analysis with these sections:

1. OVERVIEW:
   - Core purpose
   - Problem it solves
   - Target users
   - Development status

2. KEY FEATURES:
   - Main functionality
   - Unique selling points
   - API/integration capabilities

3. TECHNICAL ARCHITECTURE:
   - Folder structure
   - Key files & purposes
   - Patterns used
   - Data flow

4. TECHNOLOGY STACK:
   - Languages
   - Frameworks/libraries
   - Databases
   - External services

5. SETUP INSTRUCTIONS:
   - Prerequisites
   - Installation steps
   - Configuration
   - Running locally

6. CONTRIBUTION GUIDELINES:
   - How to contribute
   - Coding standards
   - Testing procedures

7. ADDITIONAL RESOURCES:
   - Documentation links
   - Related projects
   - Community channels

---
"#;

/// Build the user prompt from the decoded README and the newline-joined file list
///
/// Both values are embedded verbatim inside fenced blocks. The output is a
/// pure function of its inputs.
pub fn build_prompt(readme: &str, file_list: &str) -> String {
    let mut prompt =
        String::with_capacity(ANALYSIS_INSTRUCTIONS.len() + readme.len() + file_list.len() + 64);

    prompt.push_str(ANALYSIS_INSTRUCTIONS);
    prompt.push_str("\n### README.md\n```\n");
    prompt.push_str(readme);
    prompt.push_str("\n```\n\n### File list\n```\n");
    prompt.push_str(file_list);
    prompt.push_str("\n```\n");

    prompt
}
