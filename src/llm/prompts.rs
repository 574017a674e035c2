//! Prompt construction for the two service operations.

use super::{ChatMessage, ChatRequest};
use crate::models::RepositoryInput;
use crate::util::truncate_chars;

/// Characters of repository content embedded in the generate prompt.
pub const GENERATE_CONTENT_CHARS: usize = 500;
/// Characters of repository content embedded in the analyze prompt.
pub const ANALYZE_CONTENT_CHARS: usize = 1000;

pub const GENERATE_TEMPERATURE: f64 = 0.7;
pub const GENERATE_MAX_TOKENS: u32 = 3000;
pub const ANALYZE_TEMPERATURE: f64 = 0.3;
pub const ANALYZE_MAX_TOKENS: u32 = 500;

pub const GENERATE_SYSTEM_PROMPT: &str = "You are an expert DevOps engineer specializing in CI/CD pipeline design and comprehensive testing strategies. Always respond with valid JSON only.";

pub const ANALYZE_SYSTEM_PROMPT: &str =
    "You are a code analysis expert. Respond with valid JSON only.";

const GENERATE_INSTRUCTIONS: &str = r#"Generate a detailed pipeline with the following test stages:
1. **Unit Tests (Backend)**: Tests for individual backend components, functions, and classes
2. **Unit Tests (Frontend)**: Tests for individual frontend components and functions
3. **Integration Tests (Backend)**: Tests for API endpoints, database interactions, and service integrations
4. **Integration Tests (Frontend)**: Tests for component interactions, API calls, and user flows
5. **Code Quality Analysis**: Static code analysis, linting, code coverage, and security scanning (SonarQube-like)
6. **Performance Tests**: Load testing, stress testing, and performance benchmarks
7. **Security Tests**: Vulnerability scanning, dependency checks, and security best practices

For each stage, provide:
- Stage name
- Type (unit_test_backend, unit_test_frontend, integration_test_backend, integration_test_frontend, code_quality, performance_test, security_test)
- Description
- Specific commands to run
- Tools/frameworks to use
- Estimated duration

Also provide:
- A summary of the pipeline
- Recommendations for improving test coverage

Return ONLY a valid JSON object with this exact structure (no markdown, no code blocks):
{
    "stages": [
        {
            "name": "Stage Name",
            "type": "stage_type",
            "description": "Description",
            "commands": ["command1", "command2"],
            "tools": ["tool1", "tool2"],
            "estimatedDuration": "duration"
        }
    ],
    "summary": "Pipeline summary",
    "recommendations": ["recommendation1", "recommendation2"]
}"#;

const ANALYZE_RESPONSE_SHAPE: &str = r#"Return ONLY valid JSON:
{
    "language": "detected language",
    "framework": "detected framework",
    "projectType": "project type",
    "recommendedTools": ["tool1", "tool2"]
}"#;

/// A field's value, or `placeholder` when it is missing or empty. Whitespace
/// is a value and is embedded as given.
fn or_placeholder<'a>(value: Option<&'a str>, placeholder: &'a str) -> &'a str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => placeholder,
    }
}

fn content_sample(input: &RepositoryInput, max_chars: usize) -> &str {
    or_placeholder(
        input
            .repository_content
            .as_deref()
            .map(|content| truncate_chars(content, max_chars)),
        "Not provided",
    )
}

pub fn generate_pipeline_prompt(input: &RepositoryInput) -> String {
    format!(
        "You are an expert DevOps and Testing engineer. Analyze the following repository information and generate a comprehensive CI/CD test pipeline that covers all testing aspects.\n\
         \n\
         Repository Information:\n\
         - URL: {url}\n\
         - Language: {language}\n\
         - Framework: {framework}\n\
         - Content Sample: {content}\n\
         \n\
         {instructions}\n",
        url = or_placeholder(input.repository_url.as_deref(), "Not provided"),
        language = or_placeholder(input.language.as_deref(), "Auto-detect"),
        framework = or_placeholder(input.framework.as_deref(), "Auto-detect"),
        content = content_sample(input, GENERATE_CONTENT_CHARS),
        instructions = GENERATE_INSTRUCTIONS,
    )
}

pub fn analyze_repository_prompt(input: &RepositoryInput) -> String {
    format!(
        "Analyze this code repository and provide:\n\
         1. Primary programming language\n\
         2. Framework/technology stack\n\
         3. Project type (web app, API, library, etc.)\n\
         4. Recommended testing tools\n\
         \n\
         Repository URL: {url}\n\
         Code Sample: {content}\n\
         \n\
         {shape}\n",
        url = or_placeholder(input.repository_url.as_deref(), "Not provided"),
        content = content_sample(input, ANALYZE_CONTENT_CHARS),
        shape = ANALYZE_RESPONSE_SHAPE,
    )
}

pub fn generate_pipeline_request(input: &RepositoryInput) -> ChatRequest {
    ChatRequest {
        messages: vec![
            ChatMessage::system(GENERATE_SYSTEM_PROMPT),
            ChatMessage::user(generate_pipeline_prompt(input)),
        ],
        temperature: GENERATE_TEMPERATURE,
        max_tokens: GENERATE_MAX_TOKENS,
    }
}

pub fn analyze_repository_request(input: &RepositoryInput) -> ChatRequest {
    ChatRequest {
        messages: vec![
            ChatMessage::system(ANALYZE_SYSTEM_PROMPT),
            ChatMessage::user(analyze_repository_prompt(input)),
        ],
        temperature: ANALYZE_TEMPERATURE,
        max_tokens: ANALYZE_MAX_TOKENS,
    }
}
