//! LLM configuration — persisted to `llm_config.json`.

use crate::config;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible chat-completions server.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    pub api_key: Option<String>,

    /// Environment variable consulted when `api_key` is unset or empty.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: Option<String>,

    /// Hard per-request timeout. Every call is a single bounded attempt.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl LlmConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        config::resolve_api_key(&self.api_key, &self.api_key_env)
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key: None,
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    // LM Studio's local endpoint; any OpenAI-compatible server works.
    "http://127.0.0.1:1234/v1".to_string()
}

fn default_model() -> String {
    "deepseek/deepseek-r1-0528-qwen3-8b".to_string()
}

fn default_api_key_env() -> Option<String> {
    Some("OPENAI_API_KEY".to_string())
}

fn default_timeout_secs() -> u64 {
    60
}

pub fn load_config(path: &Path) -> LlmConfig {
    config::load_json_config(path, "LLM")
}
