//! Bounded conversation context sent to a model.

use lanshan_types::message::{ChatMessage, Message};
use crate::store::SendMode;

/// Number of (user, assistant) exchanges kept from the history
pub const HISTORY_PAIRS: usize = 8;

/// Build the message list for one model call.
///
/// `messages` is the session as it stands while generating: it ends with the
/// assistant placeholder, preceded by the just-appended user message unless
/// `mode` is [`SendMode::NoAppend`]. Both are excluded here; the question is
/// always passed as the final user message instead.
pub fn build_context(
    system_prompt: &str,
    messages: &[Message],
    question: &str,
    mode: SendMode,
) -> Vec<ChatMessage> {
    let trailing = match mode {
        SendMode::AppendUser => 2,
        SendMode::NoAppend => 1,
    };
    let end = messages.len().saturating_sub(trailing);
    let history: Vec<&Message> = messages[..end]
        .iter()
        .filter(|m| m.is_user() || m.is_assistant())
        .collect();

    let pairs: Vec<[&Message; 2]> = history
        .chunks(2)
        .filter_map(|chunk| match chunk {
            [user, assistant] if user.is_user() && assistant.is_assistant() => {
                Some([*user, *assistant])
            }
            _ => None,
        })
        .collect();
    let skip = pairs.len().saturating_sub(HISTORY_PAIRS);

    let mut context = Vec::with_capacity(2 + HISTORY_PAIRS * 2);
    context.push(ChatMessage::system(system_prompt));
    context.extend(
        pairs[skip..]
            .iter()
            .flatten()
            .map(|m| ChatMessage::from(*m)),
    );
    context.push(ChatMessage::user(question));
    context
}
