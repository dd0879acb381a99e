//! The bounded reply pipeline.
//!
//! Per request: one primary completion call, at most one continuation
//! call when the reply looks cut off, at most one repair call when the
//! tightened reply still violates the persona shape, and a degraded
//! echo fallback when the model is unusable. Every path terminates in a
//! `ReplyOutcome`; nothing is ever surfaced to the caller as an error.

use super::{config::ReplyConfig, extract, filter, prompts, style, tighten};
use crate::llm::{CallParams, LlmProvider, Message};
use std::sync::Arc;

// ── Stage Tags ─────────────────────────────────────────

/// Pipeline checkpoints, in the order a request can pass through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyStage {
    Extracted,
    Continued,
    Tightened,
    Repaired,
    Failed,
}

/// Utterance snapshot at a checkpoint. Each stage is a pure function of
/// the previous snapshot, so the whole run is observable in tests.
#[derive(Debug, Clone)]
pub struct StageSnapshot {
    pub stage: ReplyStage,
    pub text: String,
}

/// Terminal result of one request. `error` is set only on the fallback
/// path, alongside a best-effort non-empty `content`.
#[derive(Debug, Clone)]
pub struct ReplyOutcome {
    pub content: String,
    pub error: Option<String>,
    pub stages: Vec<StageSnapshot>,
}

// ── Engine ─────────────────────────────────────────────

pub struct ReplyEngine {
    provider: Arc<dyn LlmProvider>,
    config: ReplyConfig,
    directive: String,
}

impl ReplyEngine {
    pub fn new(provider: Arc<dyn LlmProvider>, config: ReplyConfig) -> Self {
        let directive = prompts::persona_directive(config.min_words, config.word_limit);
        Self {
            provider,
            config,
            directive,
        }
    }

    /// Run the full pipeline over the caller's history. The history is
    /// only read; the caller owns it and appends the returned turn.
    pub async fn reply(&self, history: &[Message]) -> ReplyOutcome {
        let cfg = &self.config;
        let outbound = style::with_persona_style(&self.directive, history);
        let mut stages = Vec::new();

        let primary = match self
            .provider
            .chat(outbound.clone(), &self.call_params(cfg.max_tokens, cfg.temperature))
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => return self.fallback(history, e.to_string(), stages),
        };

        let finish = primary.finish;
        let mut text = filter::strip_meta(&extract::candidate_text(&primary));
        stages.push(snapshot(ReplyStage::Extracted, &text));

        // One continuation at most, regardless of how the follow-up goes.
        if cfg.autocontinue && tighten::is_truncated(&text, finish) {
            let budget = (cfg.word_limit / 2).min(8).max(4);
            let mut follow_up = outbound;
            follow_up.push(Message::assistant(text.clone()));
            follow_up.push(Message::user(prompts::continuation_note(budget)));

            match self
                .provider
                .chat(
                    follow_up,
                    &self.call_params(cfg.continuation_max_tokens, cfg.continuation_temperature),
                )
                .await
            {
                Ok(outcome) => {
                    let extra = filter::strip_meta(&extract::candidate_text(&outcome));
                    if !extra.is_empty() {
                        text = format!("{} {}", text, extra).trim().to_string();
                    }
                    stages.push(snapshot(ReplyStage::Continued, &text));
                }
                Err(e) => {
                    tracing::warn!("[Reply] continuation failed, keeping partial text: {}", e);
                }
            }
        }

        let mut final_text = tighten::tighten(&text, cfg.word_limit);
        stages.push(snapshot(ReplyStage::Tightened, &final_text));

        // One repair at most. A usable repair replaces the utterance;
        // anything else lets the prior text through rather than blocking.
        if !self.is_valid(&final_text) {
            tracing::info!("[Reply] tightened text still invalid, attempting repair");
            let mut repair_history = history.to_vec();
            repair_history.push(Message::assistant(prompts::REPAIR_NOTE));
            let repair_messages = style::with_persona_style(&self.directive, &repair_history);

            match self
                .provider
                .chat(
                    repair_messages,
                    &self.call_params(cfg.repair_max_tokens, cfg.repair_temperature),
                )
                .await
            {
                Ok(outcome) => {
                    let repaired = filter::strip_meta(&extract::candidate_text(&outcome));
                    if !repaired.is_empty() {
                        final_text = tighten::tighten(&repaired, cfg.word_limit);
                        stages.push(snapshot(ReplyStage::Repaired, &final_text));
                    }
                }
                Err(e) => {
                    tracing::warn!("[Reply] repair failed, keeping previous text: {}", e);
                }
            }
        }

        if final_text.is_empty() {
            return self.fallback(history, "model produced no usable text".to_string(), stages);
        }

        ReplyOutcome {
            content: final_text,
            error: None,
            stages,
        }
    }

    fn is_valid(&self, tightened: &str) -> bool {
        !tightened.is_empty()
            && !filter::looks_meta(tightened)
            && tighten::word_count(tightened) <= self.config.word_limit
    }

    fn call_params(&self, max_tokens: u32, temperature: f32) -> CallParams {
        let (tools, tool_choice) =
            prompts::say_tools(self.config.min_words, self.config.word_limit);
        CallParams {
            temperature,
            max_tokens,
            stop: Some(
                prompts::STOP_SEQUENCES
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            ),
            tools: Some(tools),
            tool_choice: Some(tool_choice),
        }
    }

    /// Terminal safety net: echo a bounded prefix of the caller's last
    /// user message, with the failure spelled out in `error`.
    fn fallback(
        &self,
        history: &[Message],
        error: String,
        mut stages: Vec<StageSnapshot>,
    ) -> ReplyOutcome {
        tracing::error!("[Reply] falling back to echo: {}", error);
        let echo: String = history
            .iter()
            .rev()
            .find(|m| m.role == "user")
            .map(|m| m.content.as_str())
            .unwrap_or("")
            .chars()
            .take(self.config.echo_char_cap)
            .collect();
        let content = format!("[fallback] {}", echo).trim_end().to_string();
        stages.push(snapshot(ReplyStage::Failed, &content));
        ReplyOutcome {
            content,
            error: Some(error),
            stages,
        }
    }
}

fn snapshot(stage: ReplyStage, text: &str) -> StageSnapshot {
    StageSnapshot {
        stage,
        text: text.to_string(),
    }
}
