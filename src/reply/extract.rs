//! Candidate extraction from a raw completion.
//!
//! Precedence, first non-empty wins: forced `say` function payload,
//! then the primary content field, then the alternate text fields some
//! servers expose. A `<say>…</say>` marker pair, when present, narrows
//! the candidate to its inner text. Never fails: all sources empty
//! yields an empty string.

use super::prompts;
use crate::llm::ChatOutcome;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

static SAY_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<say>(.*?)</say>").expect("say marker regex"));

#[derive(Deserialize)]
struct SayArgs {
    text: Option<String>,
}

/// Extract the single candidate utterance from a completion.
pub fn candidate_text(outcome: &ChatOutcome) -> String {
    let raw = tool_text(outcome)
        .or_else(|| non_empty(outcome.content.as_deref()))
        .or_else(|| non_empty(outcome.output_text.as_deref()))
        .or_else(|| non_empty(outcome.reasoning_content.as_deref()))
        .unwrap_or_default();
    extract_say(&raw).to_string()
}

/// Payload of the forced `say` call, if it parsed and carried text.
/// A malformed payload or a missing `text` field falls through.
fn tool_text(outcome: &ChatOutcome) -> Option<String> {
    let call = outcome.tool_call.as_ref()?;
    if call.name != prompts::SAY_FUNCTION {
        return None;
    }
    let args: SayArgs = serde_json::from_str(&call.arguments).ok()?;
    let text = args.text?.trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn non_empty(field: Option<&str>) -> Option<String> {
    field
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Inner text of the first `<say>…</say>` pair, or the whole string
/// when no marker is present.
pub fn extract_say(s: &str) -> &str {
    match SAY_MARKER.captures(s) {
        Some(caps) => caps.get(1).map(|m| m.as_str()).unwrap_or(s).trim(),
        None => s.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ChatOutcome, FinishReason, ToolCallPayload};

    fn outcome() -> ChatOutcome {
        ChatOutcome {
            content: None,
            output_text: None,
            reasoning_content: None,
            tool_call: None,
            finish: FinishReason::Stop,
        }
    }

    #[test]
    fn tool_payload_wins_over_content() {
        let mut o = outcome();
        o.tool_call = Some(ToolCallPayload {
            name: "say".to_string(),
            arguments: r#"{"text": "from the tool"}"#.to_string(),
        });
        o.content = Some("from the content".to_string());
        assert_eq!(candidate_text(&o), "from the tool");
    }

    #[test]
    fn malformed_tool_payload_falls_through() {
        let mut o = outcome();
        o.tool_call = Some(ToolCallPayload {
            name: "say".to_string(),
            arguments: "{not valid json".to_string(),
        });
        o.content = Some("recovered".to_string());
        assert_eq!(candidate_text(&o), "recovered");
    }

    #[test]
    fn tool_payload_without_text_field_falls_through() {
        let mut o = outcome();
        o.tool_call = Some(ToolCallPayload {
            name: "say".to_string(),
            arguments: r#"{"line": "wrong field"}"#.to_string(),
        });
        o.content = Some("recovered".to_string());
        assert_eq!(candidate_text(&o), "recovered");
    }

    #[test]
    fn foreign_function_is_ignored() {
        let mut o = outcome();
        o.tool_call = Some(ToolCallPayload {
            name: "search".to_string(),
            arguments: r#"{"text": "not ours"}"#.to_string(),
        });
        o.content = Some("recovered".to_string());
        assert_eq!(candidate_text(&o), "recovered");
    }

    #[test]
    fn alternate_fields_are_last_resort() {
        let mut o = outcome();
        o.output_text = Some("  from output_text  ".to_string());
        assert_eq!(candidate_text(&o), "from output_text");

        let mut o = outcome();
        o.reasoning_content = Some("from reasoning".to_string());
        assert_eq!(candidate_text(&o), "from reasoning");
    }

    #[test]
    fn say_marker_narrows_the_candidate() {
        let mut o = outcome();
        o.content = Some("Hmm, the user seems friendly. <say>hey trouble</say>".to_string());
        assert_eq!(candidate_text(&o), "hey trouble");
    }

    #[test]
    fn first_marker_pair_wins() {
        assert_eq!(extract_say("<say>one</say> <say>two</say>"), "one");
    }

    #[test]
    fn marker_is_case_insensitive_and_spans_lines() {
        assert_eq!(extract_say("<SAY>hey\nthere</SAY>"), "hey\nthere");
    }

    #[test]
    fn no_marker_keeps_whole_string() {
        assert_eq!(extract_say("  plain line  "), "plain line");
    }

    #[test]
    fn all_sources_empty_yields_empty() {
        assert_eq!(candidate_text(&outcome()), "");
        let mut o = outcome();
        o.content = Some("   ".to_string());
        assert_eq!(candidate_text(&o), "");
    }
}
