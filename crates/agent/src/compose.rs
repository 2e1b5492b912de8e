//! Prompt composition.
//!
//! Fixed ordering: system instructions, knowledge block, reconstructed
//! history, then the new user utterance last. Empty sections are omitted
//! entirely rather than sent blank.

use frontdesk_core::message::ChatMessage;

/// Marker prefixing the injected knowledge block so the model can tell it
/// apart from tenant instructions.
const KNOWLEDGE_MARKER: &str = "FAQ_KB";

/// Compose the full message sequence for one request.
pub fn compose(
    system_prompt: &str,
    knowledge: &str,
    history: Vec<ChatMessage>,
    user_text: &str,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 3);
    if !system_prompt.is_empty() {
        messages.push(ChatMessage::system(system_prompt));
    }
    if !knowledge.is_empty() {
        messages.push(ChatMessage::system(format!("{KNOWLEDGE_MARKER}\n{knowledge}")));
    }
    messages.extend(history);
    messages.push(ChatMessage::user(user_text));
    messages
}
