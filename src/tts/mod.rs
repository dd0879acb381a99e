pub mod config;
pub mod interface;
pub mod kokoro;
pub mod openai;

pub use config::{load_config, TtsConfig};
pub use interface::{TtsError, TtsParams, TtsProvider};

use std::sync::Arc;

/// Build the active provider from config. None disables speech output
/// (the chat endpoint then replies text-only).
pub fn build_provider(config: &TtsConfig) -> Option<Arc<dyn TtsProvider>> {
    if !config.enabled {
        tracing::info!("[TTS] disabled by config, replies will be text-only");
        return None;
    }

    match config.provider_type.as_str() {
        "openai" => match openai::OpenAITtsProvider::from_config(config) {
            Some(provider) => {
                tracing::info!("[TTS] using OpenAI speech provider");
                Some(Arc::new(provider))
            }
            None => {
                tracing::warn!("[TTS] no API key for the OpenAI provider, speech disabled");
                None
            }
        },
        _ => {
            // "kokoro" and anything unrecognized: local synth server.
            tracing::info!("[TTS] using local Kokoro provider");
            Some(Arc::new(kokoro::KokoroProvider::from_config(config)))
        }
    }
}
