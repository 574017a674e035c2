use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ChatMessage, ChatRequest, LanguageModel};
use crate::config::LlmSection;
use crate::errors::GenerationError;

/// Chat-completions client for OpenAI-compatible providers.
///
/// A missing API key is reported per request rather than at construction, so
/// the service can start (and answer `/health`) without one.
#[derive(Clone)]
pub struct OpenAiChatModel {
    client: reqwest::Client,
    api_base: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ProviderErrorBody {
    error: ProviderError,
}

#[derive(Deserialize)]
struct ProviderError {
    message: String,
}

impl OpenAiChatModel {
    pub fn new(api_base: impl Into<String>, model: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.into(),
            model: model.into(),
            api_key,
        }
    }

    pub fn from_config(llm: &LlmSection) -> Self {
        Self::new(llm.api_base.clone(), llm.model.clone(), llm.api_key.clone())
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }
}

#[async_trait]
impl LanguageModel for OpenAiChatModel {
    async fn complete(&self, request: &ChatRequest) -> Result<String, GenerationError> {
        let api_key = self.api_key.as_deref().ok_or(GenerationError::MissingApiKey)?;

        let body = CompletionBody {
            model: &self.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        tracing::debug!(model = %self.model, max_tokens = request.max_tokens, "sending completion request");
        let resp = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ProviderErrorBody>(&text)
                .map(|b| b.error.message)
                .unwrap_or(text);
            tracing::warn!(status = status.as_u16(), "language model request failed");
            return Err(GenerationError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let completion: CompletionResponse = resp.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(GenerationError::EmptyCompletion)
    }
}
