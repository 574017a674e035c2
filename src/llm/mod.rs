//! Language-model access for the pipeline service.
//!
//! The service only needs one capability from a provider: turn a system +
//! user prompt pair into a completion string. That capability is the
//! [`LanguageModel`] trait; [`openai::OpenAiChatModel`] is the production
//! implementation and tests plug in scripted models.

pub mod openai;
pub mod prompts;

use async_trait::async_trait;
use serde::Serialize;

use crate::errors::GenerationError;

pub use openai::OpenAiChatModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A single completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub max_tokens: u32,
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Return the raw completion text for `request`.
    async fn complete(&self, request: &ChatRequest) -> Result<String, GenerationError>;
}
