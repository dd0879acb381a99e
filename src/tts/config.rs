//! TTS configuration — persisted to `tts_config.json`.

use crate::config;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsConfig {
    /// When false, replies are text-only and no provider is built.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// "kokoro" (local HTTP synth server) or "openai" (cloud speech API).
    #[serde(default = "default_provider_type")]
    pub provider_type: String,

    pub api_key: Option<String>,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: Option<String>,

    pub base_url: Option<String>,
    pub model: Option<String>,

    #[serde(default = "default_voice")]
    pub voice: String,

    pub speed: Option<f32>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl TtsConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        config::resolve_api_key(&self.api_key, &self.api_key_env)
    }
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            provider_type: default_provider_type(),
            api_key: None,
            api_key_env: default_api_key_env(),
            base_url: None,
            model: None,
            voice: default_voice(),
            speed: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_provider_type() -> String {
    "kokoro".to_string()
}

fn default_api_key_env() -> Option<String> {
    Some("OPENAI_API_KEY".to_string())
}

fn default_voice() -> String {
    "af_heart".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

pub fn load_config(path: &Path) -> TtsConfig {
    config::load_json_config(path, "TTS")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_the_local_synth() {
        let cfg = TtsConfig::default();
        assert!(cfg.enabled);
        assert_eq!(cfg.provider_type, "kokoro");
        assert_eq!(cfg.voice, "af_heart");
    }
}
