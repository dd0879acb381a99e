//! LLM provider trait — common interface for chat-completion backends.

use async_trait::async_trait;
use serde_json::Value;

pub use crate::llm::openai::{ChatOutcome, LlmError, Message};

// ── Common Parameters ──────────────────────────────────

/// Per-call knobs. The reply pipeline uses three fixed profiles of these
/// (primary, continuation, repair), each a single bounded attempt.
#[derive(Debug, Clone, Default)]
pub struct CallParams {
    pub temperature: f32,
    pub max_tokens: u32,
    pub stop: Option<Vec<String>>,
    /// Raw `tools` array for servers that support forced function calling.
    pub tools: Option<Value>,
    pub tool_choice: Option<Value>,
}

/// Common interface for chat-completion providers.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Non-streaming chat completion.
    async fn chat(
        &self,
        messages: Vec<Message>,
        params: &CallParams,
    ) -> Result<ChatOutcome, LlmError>;

    /// Provider identifier (e.g. "openai").
    fn id(&self) -> &str;
}

// ── OpenAI adapter ─────────────────────────────────────

use crate::llm::openai::OpenAIClient;

/// Wraps `OpenAIClient` to implement `LlmProvider`.
pub struct OpenAIProvider {
    client: OpenAIClient,
    provider_id: String,
}

impl OpenAIProvider {
    pub fn new(client: OpenAIClient) -> Self {
        Self {
            client,
            provider_id: "openai".to_string(),
        }
    }

    pub fn from_config(config: &crate::llm::config::LlmConfig) -> Self {
        Self::new(OpenAIClient::from_config(config))
    }
}

#[async_trait]
impl LlmProvider for OpenAIProvider {
    async fn chat(
        &self,
        messages: Vec<Message>,
        params: &CallParams,
    ) -> Result<ChatOutcome, LlmError> {
        self.client.chat(messages, params).await
    }

    fn id(&self) -> &str {
        &self.provider_id
    }
}
