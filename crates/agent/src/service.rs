//! The chat entry point: one utterance in, one reply out.

use crate::compose::compose;
use crate::history::HistoryReconstructor;
use crate::knowledge::knowledge_snapshot;
use crate::logger::TurnLogger;
use crate::orchestrator::Orchestrator;
use crate::tools::ToolRegistry;
use frontdesk_core::model::{ClientId, PromptKind};
use frontdesk_core::provider::ChatProvider;
use frontdesk_store::Store;
use std::sync::Arc;
use tracing::{info, warn};

/// Tunables for one service instance.
#[derive(Debug, Clone)]
pub struct ChatOptions {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub history_limit: usize,
    pub fallback_reply: String,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".into(),
            temperature: 0.3,
            max_tokens: 1200,
            history_limit: 20,
            fallback_reply:
                "申し訳ありません。現在お手続きできません。少し時間をおいてお試しください。".into(),
        }
    }
}

/// Wires history, knowledge, composition, orchestration, and logging.
pub struct ChatService {
    store: Arc<dyn Store>,
    orchestrator: Orchestrator,
    history: HistoryReconstructor,
    logger: TurnLogger,
    fallback_reply: String,
}

impl ChatService {
    pub fn new(
        store: Arc<dyn Store>,
        provider: Arc<dyn ChatProvider>,
        options: ChatOptions,
    ) -> Self {
        let tools = Arc::new(ToolRegistry::new(store.clone()));
        let orchestrator = Orchestrator::new(
            provider,
            tools,
            options.model,
            options.temperature,
            options.max_tokens,
        );
        Self {
            history: HistoryReconstructor::new(store.clone(), options.history_limit),
            logger: TurnLogger::new(store.clone()),
            store,
            orchestrator,
            fallback_reply: options.fallback_reply,
        }
    }

    /// Handle one utterance for an already-normalized contact key.
    ///
    /// Always returns a reply; when orchestration produces nothing usable
    /// the configured fallback stands in. The turn (with whatever reply was
    /// chosen) is logged before returning.
    pub async fn handle(
        &self,
        client_id: &ClientId,
        contact_key: &str,
        user_text: &str,
        call_sid: Option<&str>,
    ) -> String {
        let system_prompt = self.system_prompt(client_id).await;
        let knowledge = knowledge_snapshot(self.store.as_ref(), client_id).await;
        let history = self
            .history
            .reconstruct(client_id, contact_key, call_sid)
            .await;

        info!(
            client_id = %client_id,
            contact = %contact_key,
            history = history.len(),
            "Handling chat turn"
        );

        let messages = compose(&system_prompt, &knowledge, history, user_text);
        let reply = self
            .orchestrator
            .run(client_id, messages)
            .await
            .unwrap_or_else(|| self.fallback_reply.clone());

        self.logger
            .log(client_id, contact_key, user_text, &reply, call_sid)
            .await;
        reply
    }

    async fn system_prompt(&self, client_id: &ClientId) -> String {
        match self.store.get_prompt(client_id, PromptKind::System).await {
            Ok(Some(value)) => value.as_str().unwrap_or_default().to_string(),
            Ok(None) => String::new(),
            Err(e) => {
                warn!(client_id = %client_id, error = %e, "Failed to read system prompt");
                String::new()
            }
        }
    }
}
