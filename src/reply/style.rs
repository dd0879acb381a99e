//! Outbound prompt assembly: one persona system message, the primer,
//! then the caller's history with caller-supplied system entries dropped.

use super::prompts;
use crate::llm::Message;

/// Build the outbound message sequence. Pure: the caller's history is
/// only read, never mutated. The result always contains exactly one
/// system message, first, regardless of what the caller sent.
pub fn with_persona_style(directive: &str, history: &[Message]) -> Vec<Message> {
    let mut messages = Vec::with_capacity(1 + prompts::PRIMER.len() * 2 + history.len());
    messages.push(Message::system(directive));
    for (user, assistant) in prompts::PRIMER {
        messages.push(Message::user(*user));
        messages.push(Message::assistant(*assistant));
    }
    messages.extend(history.iter().filter(|m| m.role != "system").cloned());
    messages
}
