//! Token estimation utilities.
//!
//! Uses a character-based heuristic: ~4 characters per token. It only has to
//! be consistent, since the same counter decides both what fits and what
//! gets trimmed.

use wrapwright_core::message::Message;
use wrapwright_core::provider::FunctionDefinition;

/// Estimate the token count for a string.
///
/// Heuristic: 1 token ≈ 4 characters. Rounds up.
pub fn estimate_tokens(text: &str) -> usize {
    text.len().div_ceil(4)
}

/// Estimate tokens for a single message including per-message overhead.
///
/// Each message costs ~4 tokens of overhead for role name, delimiters,
/// and formatting markers in the API wire format.
pub fn estimate_message_tokens(message: &Message) -> usize {
    let overhead = 4;
    let name = message.name.as_deref().map(estimate_tokens).unwrap_or(0);
    overhead + name + estimate_tokens(&message.content)
}

/// Estimate tokens for a slice of messages.
pub fn estimate_messages_tokens(messages: &[Message]) -> usize {
    messages.iter().map(estimate_message_tokens).sum()
}

/// Estimate tokens for the declared function signatures (serialized as JSON).
pub fn estimate_functions_tokens(functions: &[FunctionDefinition]) -> usize {
    functions
        .iter()
        .map(|f| estimate_tokens(&serde_json::to_string(f).unwrap_or_default()))
        .sum()
}
