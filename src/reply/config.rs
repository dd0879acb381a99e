//! Reply-shaping policy — persisted to `reply_config.json`.

use crate::config;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyConfig {
    /// Hard cap on words in the final utterance.
    #[serde(default = "default_word_limit")]
    pub word_limit: usize,

    /// Lower bound quoted to the model in the persona directive.
    #[serde(default = "default_min_words")]
    pub min_words: usize,

    /// When false, a cut-off completion is shipped as-is without the
    /// one follow-up call.
    #[serde(default = "default_true")]
    pub autocontinue: bool,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_continuation_max_tokens")]
    pub continuation_max_tokens: u32,
    #[serde(default = "default_continuation_temperature")]
    pub continuation_temperature: f32,

    #[serde(default = "default_repair_max_tokens")]
    pub repair_max_tokens: u32,
    #[serde(default = "default_repair_temperature")]
    pub repair_temperature: f32,

    /// Character cap on the text handed to speech synthesis.
    #[serde(default = "default_speech_char_cap")]
    pub speech_char_cap: usize,

    /// Character cap on the fallback echo of the user's last message.
    #[serde(default = "default_echo_char_cap")]
    pub echo_char_cap: usize,
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            word_limit: default_word_limit(),
            min_words: default_min_words(),
            autocontinue: true,
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            continuation_max_tokens: default_continuation_max_tokens(),
            continuation_temperature: default_continuation_temperature(),
            repair_max_tokens: default_repair_max_tokens(),
            repair_temperature: default_repair_temperature(),
            speech_char_cap: default_speech_char_cap(),
            echo_char_cap: default_echo_char_cap(),
        }
    }
}

fn default_word_limit() -> usize {
    18
}
fn default_min_words() -> usize {
    7
}
fn default_true() -> bool {
    true
}
fn default_max_tokens() -> u32 {
    120
}
fn default_temperature() -> f32 {
    0.9
}
fn default_continuation_max_tokens() -> u32 {
    16
}
fn default_continuation_temperature() -> f32 {
    0.8
}
fn default_repair_max_tokens() -> u32 {
    32
}
fn default_repair_temperature() -> f32 {
    0.9
}
fn default_speech_char_cap() -> usize {
    800
}
fn default_echo_char_cap() -> usize {
    160
}

pub fn load_config(path: &Path) -> ReplyConfig {
    config::load_json_config(path, "Reply")
}
