use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

// ── Error Types ────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum TtsError {
    SynthesisFailed(String),
    Unavailable(String),
    ConfigError(String),
}

impl fmt::Display for TtsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TtsError::SynthesisFailed(msg) => write!(f, "Synthesis failed: {}", msg),
            TtsError::Unavailable(msg) => write!(f, "TTS unavailable: {}", msg),
            TtsError::ConfigError(msg) => write!(f, "TTS config error: {}", msg),
        }
    }
}

impl std::error::Error for TtsError {}

// ── Synthesis Parameters ───────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsParams {
    pub voice: Option<String>,
    pub speed: Option<f32>,
}

impl Default for TtsParams {
    fn default() -> Self {
        Self {
            voice: None,
            speed: Some(1.0),
        }
    }
}

// ── Provider Trait ─────────────────────────────────────

/// A speech synthesizer. Input text is already sanitized (no emoji,
/// bounded length); providers only turn it into audio bytes.
#[async_trait]
pub trait TtsProvider: Send + Sync {
    /// Unique identifier for this provider (e.g., "openai", "kokoro")
    fn id(&self) -> String;

    /// Check if the provider is currently reachable / operational
    async fn is_available(&self) -> bool;

    /// Synthesize text to a complete audio container (WAV/MP3)
    async fn synthesize(&self, text: &str, params: &TtsParams) -> Result<Vec<u8>, TtsError>;
}
