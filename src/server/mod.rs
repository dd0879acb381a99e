//! HTTP shell: the chat endpoint, a health probe, and static frontend
//! assets. The chat endpoint always answers 200 with the reply body;
//! recovered failures travel in its `error` field, never as a status.

pub mod config;

pub use config::{load_config, ServerConfig};

use crate::reply::{tighten, ReplyEngine};
use crate::tts::{TtsParams, TtsProvider};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;
use warp::Filter;

pub struct AppState {
    pub engine: Arc<ReplyEngine>,
    pub tts: Option<Arc<dyn TtsProvider>>,
    pub tts_params: TtsParams,
    pub speech_char_cap: usize,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<crate::llm::Message>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub content: String,
    #[serde(rename = "audioB64", skip_serializing_if = "Option::is_none")]
    pub audio_b64: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Run one chat request: reply pipeline, then best-effort speech.
async fn handle_chat(request: ChatRequest, state: Arc<AppState>) -> ChatResponse {
    let request_id = Uuid::new_v4();
    tracing::info!(
        "[Chat] {} handling request with {} history messages",
        request_id,
        request.messages.len()
    );

    let outcome = state.engine.reply(&request.messages).await;

    let mut audio_b64 = None;
    if outcome.error.is_none() {
        if let Some(ref tts) = state.tts {
            let speech = tighten::speakable(&outcome.content, state.speech_char_cap);
            if !speech.is_empty() {
                match tts.synthesize(&speech, &state.tts_params).await {
                    Ok(bytes) => audio_b64 = Some(BASE64.encode(bytes)),
                    Err(e) => {
                        tracing::warn!("[Chat] {} TTS failed, replying text-only: {}", request_id, e);
                    }
                }
            }
        }
    }

    ChatResponse {
        content: outcome.content,
        audio_b64,
        error: outcome.error,
    }
}

/// Assemble all routes: `POST /api/chat`, `GET /api/health`, static files.
pub fn routes(
    state: Arc<AppState>,
    static_dir: PathBuf,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let state_filter = warp::any().map(move || state.clone());

    let chat = warp::path!("api" / "chat")
        .and(warp::post())
        .and(warp::body::content_length_limit(64 * 1024))
        .and(warp::body::json())
        .and(state_filter)
        .then(|request: ChatRequest, state: Arc<AppState>| async move {
            warp::reply::json(&handle_chat(request, state).await)
        });

    let health = warp::path!("api" / "health")
        .and(warp::get())
        .map(|| warp::reply::json(&serde_json::json!({"status": "ok"})));

    let assets = warp::fs::dir(static_dir);

    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type"])
        .allow_methods(vec!["GET", "POST"]);

    chat.or(health).or(assets).with(cors)
}

pub async fn run(state: Arc<AppState>, config: ServerConfig) {
    let addr = config.addr();
    tracing::info!("[Server] listening on http://{}", addr);
    warp::serve(routes(state, PathBuf::from(&config.static_dir)))
        .run(addr)
        .await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{OpenAIClient, OpenAIProvider};
    use crate::reply::ReplyConfig;
    use crate::tts::kokoro::KokoroProvider;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn state_for(llm_server: &MockServer, tts: Option<Arc<dyn TtsProvider>>) -> Arc<AppState> {
        let client = OpenAIClient::new(None, llm_server.uri(), "test-model".to_string(), 5);
        let engine = Arc::new(ReplyEngine::new(
            Arc::new(OpenAIProvider::new(client)),
            ReplyConfig::default(),
        ));
        Arc::new(AppState {
            engine,
            tts,
            tts_params: TtsParams::default(),
            speech_char_cap: 800,
        })
    }

    async fn mount_reply(server: &MockServer, content: &str) {
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{
                    "message": {"content": content},
                    "finish_reason": "stop"
                }]
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn chat_endpoint_returns_normalized_content() {
        let llm = MockServer::start().await;
        mount_reply(&llm, "<say>Careful, sweetheart, I bite.</say>").await;

        let routes = routes(state_for(&llm, None), PathBuf::from("no-static-dir"));
        let resp = warp::test::request()
            .method("POST")
            .path("/api/chat")
            .json(&serde_json::json!({"messages": [{"role": "user", "content": "hi"}]}))
            .reply(&routes)
            .await;

        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = serde_json::from_slice(resp.body()).unwrap();
        assert_eq!(body["content"], "Careful, sweetheart, I bite.");
        assert!(body.get("audioB64").is_none());
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn llm_outage_still_returns_200_with_fallback() {
        let llm = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&llm)
            .await;

        let routes = routes(state_for(&llm, None), PathBuf::from("no-static-dir"));
        let resp = warp::test::request()
            .method("POST")
            .path("/api/chat")
            .json(&serde_json::json!({"messages": [{"role": "user", "content": "anyone home?"}]}))
            .reply(&routes)
            .await;

        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = serde_json::from_slice(resp.body()).unwrap();
        assert_eq!(body["content"], "[fallback] anyone home?");
        assert_eq!(body["error"], "LLM 500");
    }

    #[tokio::test]
    async fn speech_is_attached_when_the_synth_works() {
        let llm = MockServer::start().await;
        mount_reply(&llm, "<say>Back 😏 so soon, I see.</say>").await;

        let synth = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/synthesize"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "audio": [0.0, 0.1, -0.1],
                "sample_rate": 24000
            })))
            .mount(&synth)
            .await;

        let tts: Arc<dyn TtsProvider> =
            Arc::new(KokoroProvider::new(synth.uri(), "af_heart".to_string(), 5));
        let routes = routes(state_for(&llm, Some(tts)), PathBuf::from("no-static-dir"));
        let resp = warp::test::request()
            .method("POST")
            .path("/api/chat")
            .json(&serde_json::json!({"messages": [{"role": "user", "content": "hi"}]}))
            .reply(&routes)
            .await;

        let body: serde_json::Value = serde_json::from_slice(resp.body()).unwrap();
        assert_eq!(body["content"], "Back 😏 so soon, I see.");
        let wav = BASE64.decode(body["audioB64"].as_str().unwrap()).unwrap();
        assert_eq!(&wav[0..4], b"RIFF");
    }

    #[tokio::test]
    async fn tts_failure_degrades_to_text_only() {
        let llm = MockServer::start().await;
        mount_reply(&llm, "<say>Still here, still unimpressed.</say>").await;

        let synth = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/synthesize"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&synth)
            .await;

        let tts: Arc<dyn TtsProvider> =
            Arc::new(KokoroProvider::new(synth.uri(), "af_heart".to_string(), 5));
        let routes = routes(state_for(&llm, Some(tts)), PathBuf::from("no-static-dir"));
        let resp = warp::test::request()
            .method("POST")
            .path("/api/chat")
            .json(&serde_json::json!({"messages": [{"role": "user", "content": "hi"}]}))
            .reply(&routes)
            .await;

        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = serde_json::from_slice(resp.body()).unwrap();
        assert_eq!(body["content"], "Still here, still unimpressed.");
        assert!(body.get("audioB64").is_none());
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn health_probe_answers_ok() {
        let llm = MockServer::start().await;
        let routes = routes(state_for(&llm, None), PathBuf::from("no-static-dir"));
        let resp = warp::test::request()
            .method("GET")
            .path("/api/health")
            .reply(&routes)
            .await;

        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = serde_json::from_slice(resp.body()).unwrap();
        assert_eq!(body["status"], "ok");
    }
}
