//! Hand-rolled client for OpenAI-compatible chat-completion servers.
//!
//! Non-streaming only: the reply pipeline needs the whole completion (and its
//! finish reason) before it can normalize anything. Each call is one bounded
//! attempt; transport failure is terminal for that call slot.

use super::provider::CallParams;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

// ── Errors ─────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum LlmError {
    /// Server unreachable, connection reset, timeout.
    #[error("LLM request failed: {0}")]
    Transport(String),
    /// Non-success HTTP status from the completion server.
    #[error("LLM {0}")]
    Status(u16),
    /// Body that cannot be parsed into the expected completion shape.
    #[error("LLM bad response: {0}")]
    Malformed(String),
}

// ── Wire Types ─────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    // Alternate text fields some servers expose instead of `content`.
    output_text: Option<String>,
    reasoning_content: Option<String>,
    tool_calls: Option<Vec<ToolCallEntry>>,
}

#[derive(Debug, Deserialize)]
struct ToolCallEntry {
    #[serde(rename = "type")]
    kind: Option<String>,
    function: Option<FunctionCall>,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

// ── Outcome ────────────────────────────────────────────

/// How the server says the completion ended. Anything that is not a clean
/// `stop` or an explicit `length` cutoff is lumped into `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    Length,
    Other,
}

impl FinishReason {
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            Some("stop") => FinishReason::Stop,
            Some("length") => FinishReason::Length,
            _ => FinishReason::Other,
        }
    }
}

/// First forced function call in the completion, payload unparsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallPayload {
    pub name: String,
    pub arguments: String,
}

/// One completion, reduced to the fields the reply pipeline consumes.
/// Ephemeral: built per call, dropped after candidate extraction.
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub content: Option<String>,
    pub output_text: Option<String>,
    pub reasoning_content: Option<String>,
    pub tool_call: Option<ToolCallPayload>,
    pub finish: FinishReason,
}

impl ChatOutcome {
    /// Convenience for tests and fixtures: a plain `stop` completion.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            output_text: None,
            reasoning_content: None,
            tool_call: None,
            finish: FinishReason::Stop,
        }
    }
}

// ── Client ─────────────────────────────────────────────

pub struct OpenAIClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl OpenAIClient {
    pub fn new(
        api_key: Option<String>,
        base_url: String,
        model: String,
        timeout_secs: u64,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_key,
            base_url,
            model,
        }
    }

    pub fn from_config(config: &super::config::LlmConfig) -> Self {
        Self::new(
            config.resolve_api_key(),
            config.base_url.clone(),
            config.model.clone(),
            config.timeout_secs,
        )
    }

    /// One chat-completion call. Returns the reduced `ChatOutcome` or a
    /// terminal `LlmError`; never retries.
    pub async fn chat(
        &self,
        messages: Vec<Message>,
        params: &CallParams,
    ) -> Result<ChatOutcome, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request_body = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            stop: params.stop.clone(),
            tools: params.tools.clone(),
            tool_choice: params.tool_choice.clone(),
        };

        let mut request = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request_body);
        if let Some(ref key) = self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request
            .send()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        let status = response.status();
        let raw = response
            .text()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        if !status.is_success() {
            tracing::error!("[LLM] non-success status {}: {}", status, truncate(&raw, 200));
            return Err(LlmError::Status(status.as_u16()));
        }

        let parsed: ChatCompletionResponse =
            serde_json::from_str(&raw).map_err(|e| LlmError::Malformed(e.to_string()))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::Malformed("response has no choices".to_string()))?;

        let finish = FinishReason::from_raw(choice.finish_reason.as_deref());
        let tool_call = choice.message.tool_calls.and_then(|calls| {
            calls.into_iter().find_map(|c| {
                if c.kind.as_deref() != Some("function") {
                    return None;
                }
                c.function.map(|f| ToolCallPayload {
                    name: f.name,
                    arguments: f.arguments,
                })
            })
        });

        Ok(ChatOutcome {
            content: choice.message.content,
            output_text: choice.message.output_text,
            reasoning_content: choice.message.reasoning_content,
            tool_call,
            finish,
        })
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
