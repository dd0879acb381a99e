use anyhow::Result;
use nyx_engine::llm::{LlmProvider, OpenAIProvider};
use nyx_engine::reply::ReplyEngine;
use nyx_engine::tts::TtsParams;
use nyx_engine::{config, llm, reply, server, tts};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_dir = config::config_dir();
    let llm_config = llm::load_config(&config_dir.join("llm_config.json"));
    let reply_config = reply::load_config(&config_dir.join("reply_config.json"));
    let tts_config = tts::load_config(&config_dir.join("tts_config.json"));
    let server_config = server::load_config(&config_dir.join("server_config.json"));

    let provider: Arc<dyn LlmProvider> = Arc::new(OpenAIProvider::from_config(&llm_config));
    tracing::info!(
        "[Main] chat model '{}' at {}",
        llm_config.model,
        llm_config.base_url
    );

    let speech_char_cap = reply_config.speech_char_cap;
    let engine = Arc::new(ReplyEngine::new(provider, reply_config));

    let tts_provider = tts::build_provider(&tts_config);
    if let Some(ref tts) = tts_provider {
        if !tts.is_available().await {
            tracing::warn!(
                "[Main] TTS provider '{}' is not reachable yet, replies may be text-only",
                tts.id()
            );
        }
    }

    let state = Arc::new(server::AppState {
        engine,
        tts: tts_provider,
        tts_params: TtsParams {
            voice: Some(tts_config.voice.clone()),
            speed: tts_config.speed,
        },
        speech_char_cap,
    });

    server::run(state, server_config).await;
    Ok(())
}
