//! Best-effort turn persistence.
//!
//! The reply has already been produced when logging happens, so a write
//! failure is warned about and swallowed. The timestamp is taken fresh at
//! write time; it is part of the sort key, not the request.

use frontdesk_core::model::{now_iso, ClientId, ConversationTurn};
use frontdesk_store::Store;
use std::sync::Arc;
use tracing::warn;

pub struct TurnLogger {
    store: Arc<dyn Store>,
}

impl TurnLogger {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Persist one completed exchange.
    pub async fn log(
        &self,
        client_id: &ClientId,
        contact_key: &str,
        user_text: &str,
        assistant_text: &str,
        call_sid: Option<&str>,
    ) {
        let turn = ConversationTurn {
            client_id: client_id.as_str().to_string(),
            contact_key: contact_key.to_string(),
            ts: now_iso(),
            user_text: user_text.to_string(),
            assistant_text: assistant_text.to_string(),
            call_sid: call_sid.map(String::from),
        };

        if let Err(e) = self.store.put_turn(&turn).await {
            warn!(
                client_id = %client_id,
                contact = %contact_key,
                error = %e,
                "Failed to log turn"
            );
        }
    }
}
