//! Conversation history reconstruction.
//!
//! Persisted turns become alternating user/assistant messages. Two lookup
//! paths exist: the contact path (sort-key prefix query, oldest first) and
//! the call path (call-sid lookup spanning contacts, tenant-filtered here
//! because the store does not do it).

use frontdesk_core::message::ChatMessage;
use frontdesk_core::model::{ClientId, ConversationTurn};
use frontdesk_store::Store;
use std::sync::Arc;
use tracing::{debug, warn};

/// How many raw turns the contact-path query fetches before trimming.
const CONTACT_FETCH_LIMIT: usize = 50;

/// Upper bound on call-sid lookups.
const CALL_SID_CAP: usize = 200;

/// Rebuilds recent history for one contact or one telephony call.
pub struct HistoryReconstructor {
    store: Arc<dyn Store>,
    limit: usize,
}

impl HistoryReconstructor {
    /// `limit` bounds the number of messages (not turns) kept after
    /// expansion.
    pub fn new(store: Arc<dyn Store>, limit: usize) -> Self {
        Self { store, limit }
    }

    /// Reconstruct history messages, oldest first.
    ///
    /// Storage failures degrade to an empty history; a reply without
    /// context beats no reply.
    pub async fn reconstruct(
        &self,
        client_id: &ClientId,
        contact_key: &str,
        call_sid: Option<&str>,
    ) -> Vec<ChatMessage> {
        let turns = match call_sid {
            Some(sid) => match self.store.turns_by_call_sid(sid, CALL_SID_CAP).await {
                Ok(turns) => turns
                    .into_iter()
                    .filter(|t| t.client_id == client_id.as_str())
                    .collect(),
                Err(e) => {
                    warn!(call_sid = %sid, error = %e, "Call-sid history lookup failed");
                    Vec::new()
                }
            },
            None => {
                let prefix = format!("{contact_key}#");
                match self
                    .store
                    .turns_by_contact(client_id, &prefix, CONTACT_FETCH_LIMIT)
                    .await
                {
                    Ok(turns) => turns,
                    Err(e) => {
                        warn!(contact = %contact_key, error = %e, "Contact history lookup failed");
                        Vec::new()
                    }
                }
            }
        };

        let mut messages = expand(&turns);
        if messages.len() > self.limit {
            messages.drain(..messages.len() - self.limit);
        }
        debug!(
            client_id = %client_id,
            contact = %contact_key,
            messages = messages.len(),
            "Reconstructed history"
        );
        messages
    }
}

/// One turn becomes up to two messages; empty sides are skipped.
fn expand(turns: &[ConversationTurn]) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(turns.len() * 2);
    for turn in turns {
        if !turn.user_text.is_empty() {
            messages.push(ChatMessage::user(&turn.user_text));
        }
        if !turn.assistant_text.is_empty() {
            messages.push(ChatMessage::assistant(&turn.assistant_text));
        }
    }
    messages
}
