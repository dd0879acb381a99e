//! Kokoro provider — sends HTTP requests to a local Kokoro synth server.
//!
//! The server returns raw float samples plus a sample rate; this module
//! packs them into a 16-bit mono WAV container. Expected API:
//!   POST /synthesize  — accepts JSON, returns `{audio: [f32], sample_rate}`
//!   GET  /health      — returns 200 if the model is loaded

use super::config::TtsConfig;
use super::interface::{TtsError, TtsParams, TtsProvider};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub struct KokoroProvider {
    client: Client,
    endpoint: String,
    default_voice: String,
}

#[derive(Serialize)]
struct KokoroSynthRequest<'a> {
    text: &'a str,
    voice: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    speed: Option<f32>,
}

#[derive(Deserialize)]
struct KokoroSynthResponse {
    #[serde(alias = "samples")]
    audio: Vec<f32>,
    #[serde(alias = "sampleRate", default = "default_sample_rate")]
    sample_rate: u32,
}

fn default_sample_rate() -> u32 {
    24_000
}

impl KokoroProvider {
    pub fn new(endpoint: String, default_voice: String, timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_else(|_| Client::new()),
            endpoint,
            default_voice,
        }
    }

    pub fn from_config(config: &TtsConfig) -> Self {
        let endpoint = config
            .base_url
            .clone()
            .unwrap_or_else(|| "http://127.0.0.1:8880".to_string());
        Self::new(endpoint, config.voice.clone(), config.timeout_secs)
    }
}

#[async_trait]
impl TtsProvider for KokoroProvider {
    fn id(&self) -> String {
        "kokoro".to_string()
    }

    async fn is_available(&self) -> bool {
        let url = format!("{}/health", self.endpoint);
        match self.client.get(&url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    async fn synthesize(&self, text: &str, params: &TtsParams) -> Result<Vec<u8>, TtsError> {
        let url = format!("{}/synthesize", self.endpoint);
        let request_body = KokoroSynthRequest {
            text,
            voice: params.voice.as_deref().unwrap_or(&self.default_voice),
            speed: params.speed,
        };

        let response = self
            .client
            .post(&url)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| TtsError::SynthesisFailed(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(TtsError::SynthesisFailed(format!(
                "Kokoro server error: {}",
                error_text
            )));
        }

        let parsed: KokoroSynthResponse = response
            .json()
            .await
            .map_err(|e| TtsError::SynthesisFailed(format!("Bad synth response: {}", e)))?;

        encode_wav(&parsed.audio, parsed.sample_rate)
    }
}

/// Pack float samples into a 16-bit mono WAV file.
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>, TtsError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|e| TtsError::SynthesisFailed(format!("WAV header: {}", e)))?;
        for &sample in samples {
            let clamped = sample.clamp(-1.0, 1.0);
            let value = if clamped < 0.0 {
                (clamped * 32768.0) as i16
            } else {
                (clamped * 32767.0) as i16
            };
            writer
                .write_sample(value)
                .map_err(|e| TtsError::SynthesisFailed(format!("WAV sample: {}", e)))?;
        }
        writer
            .finalize()
            .map_err(|e| TtsError::SynthesisFailed(format!("WAV finalize: {}", e)))?;
    }
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn wav_encoding_is_parseable_mono_16bit() {
        let samples = vec![0.0_f32, 0.5, -0.5, 1.0, -1.0];
        let bytes = encode_wav(&samples, 24_000).unwrap();
        assert_eq!(&bytes[0..4], b"RIFF");

        let reader = hound::WavReader::new(std::io::Cursor::new(bytes)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 24_000);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(reader.len(), 5);
    }

    #[test]
    fn out_of_range_samples_are_clamped() {
        let bytes = encode_wav(&[2.0_f32, -2.0], 24_000).unwrap();
        let reader = hound::WavReader::new(std::io::Cursor::new(bytes)).unwrap();
        let values: Vec<i16> = reader.into_samples::<i16>().map(Result::unwrap).collect();
        assert_eq!(values, vec![i16::MAX, i16::MIN]);
    }

    #[tokio::test]
    async fn synthesize_round_trips_through_the_synth_server() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/synthesize"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "audio": [0.0, 0.25, -0.25],
                "sample_rate": 22050
            })))
            .mount(&server)
            .await;

        let provider = KokoroProvider::new(server.uri(), "af_heart".to_string(), 5);
        let bytes = provider
            .synthesize("hey trouble", &TtsParams::default())
            .await
            .unwrap();

        let reader = hound::WavReader::new(std::io::Cursor::new(bytes)).unwrap();
        assert_eq!(reader.spec().sample_rate, 22050);
        assert_eq!(reader.len(), 3);
    }

    #[tokio::test]
    async fn legacy_samples_field_is_accepted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/synthesize"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "samples": [0.1, 0.2]
            })))
            .mount(&server)
            .await;

        let provider = KokoroProvider::new(server.uri(), "af_heart".to_string(), 5);
        let bytes = provider
            .synthesize("hi", &TtsParams::default())
            .await
            .unwrap();
        let reader = hound::WavReader::new(std::io::Cursor::new(bytes)).unwrap();
        assert_eq!(reader.spec().sample_rate, 24_000);
    }

    #[tokio::test]
    async fn server_error_is_a_synthesis_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/synthesize"))
            .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
            .mount(&server)
            .await;

        let provider = KokoroProvider::new(server.uri(), "af_heart".to_string(), 5);
        let err = provider
            .synthesize("hi", &TtsParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TtsError::SynthesisFailed(_)));
    }
}
