pub mod config;
pub mod openai;
pub mod provider;

pub use config::{load_config, LlmConfig};
pub use openai::{ChatOutcome, FinishReason, LlmError, Message, OpenAIClient, ToolCallPayload};
pub use provider::{CallParams, LlmProvider, OpenAIProvider};
