/*!
 * Chat-completion backends.
 *
 * The pipeline talks to its language model through the `ChatClient` trait:
 * - `openai`: OpenAI-compatible HTTP API (hosted or local servers)
 * - `mock`: scripted client for tests
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::errors::ProviderError;

/// A single chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,
    /// Content of the message
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Sampling parameters sent with every request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub temperature: f32,
    pub top_p: f32,
    /// Maximum number of tokens to generate
    pub max_tokens: u32,
    pub frequency_penalty: f32,
}

/// A backend-agnostic completion request
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub sampling: SamplingParams,
}

/// Token usage reported by the backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

/// A completed request
#[derive(Debug, Clone, PartialEq)]
pub struct ChatResponse {
    /// Text of the first choice
    pub text: String,
    pub usage: TokenUsage,
    /// Response body as received, kept for diagnostics
    pub raw: String,
}

/// Chat-completion capability consumed by the enrichment tasks
#[async_trait]
pub trait ChatClient: Send + Sync + Debug {
    /// Complete a request
    ///
    /// # Arguments
    /// * `request` - Model, messages and sampling parameters
    ///
    /// # Returns
    /// * `Result<ChatResponse, ProviderError>` - The completion or a transport/API error
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError>;
}

pub mod mock;
pub mod openai;
