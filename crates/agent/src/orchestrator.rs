//! The bounded tool-calling loop.
//!
//! At most [`MAX_ROUNDS`] completions per utterance. Each round either
//! yields text (done), tool calls (execute, append results, loop), or
//! nothing usable (give up). Tenants with no tools configured get a single
//! plain completion with no tools field on the wire.

use crate::tools::ToolRegistry;
use frontdesk_core::message::ChatMessage;
use frontdesk_core::model::ClientId;
use frontdesk_core::provider::{ChatProvider, ChatRequest};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Completion-call ceiling per utterance.
const MAX_ROUNDS: usize = 4;

/// Drives completions and tool execution for one utterance.
pub struct Orchestrator {
    provider: Arc<dyn ChatProvider>,
    tools: Arc<ToolRegistry>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl Orchestrator {
    pub fn new(
        provider: Arc<dyn ChatProvider>,
        tools: Arc<ToolRegistry>,
        model: impl Into<String>,
        temperature: f32,
        max_tokens: u32,
    ) -> Self {
        Self {
            provider,
            tools,
            model: model.into(),
            temperature,
            max_tokens,
        }
    }

    /// Run the loop over a composed message sequence.
    ///
    /// `None` means no usable reply was produced: provider failure, empty
    /// final content, or round exhaustion. The caller substitutes the
    /// fallback reply; nothing here is an error the user sees raw.
    pub async fn run(&self, client_id: &ClientId, messages: Vec<ChatMessage>) -> Option<String> {
        let tool_definitions = self.tools.compile(client_id).await;

        if tool_definitions.is_empty() {
            let response = self.complete(messages, Vec::new()).await?;
            return non_empty(response.content);
        }

        let mut current = messages;
        for round in 0..MAX_ROUNDS {
            debug!(client_id = %client_id, round, "Orchestration round");

            let response = self.complete(current.clone(), tool_definitions.clone()).await?;

            if response.tool_calls.is_empty() {
                return non_empty(response.content);
            }

            info!(
                client_id = %client_id,
                round,
                tool_count = response.tool_calls.len(),
                "Executing tool calls"
            );

            let tool_calls = response.tool_calls.clone();
            current.push(ChatMessage::assistant_tool_calls(
                response.content,
                tool_calls.clone(),
            ));

            // One result per call, in the model's emission order
            for call in &tool_calls {
                let result = self.tools.execute(client_id, &call.name, &call.arguments).await;
                let serialized = result.to_string();
                debug!(tool = %call.name, "Tool call completed");
                current.push(ChatMessage::tool_result(&call.id, &call.name, serialized));
            }
        }

        warn!(client_id = %client_id, rounds = MAX_ROUNDS, "Round ceiling reached without a reply");
        None
    }

    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        tools: Vec<frontdesk_core::provider::ToolDefinition>,
    ) -> Option<ChatMessage> {
        let tool_choice = if tools.is_empty() {
            None
        } else {
            Some("auto".to_string())
        };
        let request = ChatRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: Some(self.max_tokens),
            tools,
            tool_choice,
        };

        match self.provider.complete(request).await {
            Ok(response) => Some(response.message),
            Err(e) => {
                warn!(provider = %self.provider.name(), error = %e, "Completion failed");
                None
            }
        }
    }
}

fn non_empty(content: String) -> Option<String> {
    if content.is_empty() {
        None
    } else {
        Some(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use frontdesk_core::error::ProviderError;
    use frontdesk_core::message::ToolCall;
    use frontdesk_core::model::PromptKind;
    use frontdesk_core::provider::ChatResponse;
    use frontdesk_store::{MemoryStore, PromptStore, TaskStore};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// A provider that replays scripted responses in order.
    struct ScriptedProvider {
        script: Mutex<Vec<Result<ChatResponse, ProviderError>>>,
        calls: AtomicUsize,
        last_request: Mutex<Option<ChatRequest>>,
    }

    impl ScriptedProvider {
        fn new(script: Vec<Result<ChatResponse, ProviderError>>) -> Self {
            Self {
                script: Mutex::new(script),
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ChatProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(
            &self,
            request: ChatRequest,
        ) -> std::result::Result<ChatResponse, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request);
            let mut script = self.script.lock().unwrap();
            if script.is_empty() {
                return Err(ProviderError::InvalidResponse("script exhausted".into()));
            }
            script.remove(0)
        }
    }

    fn text(content: &str) -> Result<ChatResponse, ProviderError> {
        Ok(ChatResponse {
            message: ChatMessage::assistant(content),
        })
    }

    fn tool_call(name: &str, arguments: &str) -> Result<ChatResponse, ProviderError> {
        Ok(ChatResponse {
            message: ChatMessage::assistant_tool_calls(
                "",
                vec![ToolCall {
                    id: "call_1".into(),
                    name: name.into(),
                    arguments: arguments.into(),
                }],
            ),
        })
    }

    fn orchestrator(
        provider: Arc<ScriptedProvider>,
        store: Arc<MemoryStore>,
    ) -> Orchestrator {
        Orchestrator::new(
            provider,
            Arc::new(ToolRegistry::new(store)),
            "gpt-4o-mini",
            0.3,
            1200,
        )
    }

    async fn enable_builtin_tools(store: &MemoryStore, client: &ClientId) {
        store
            .put_prompt(
                client,
                PromptKind::Functions,
                &json!({
                    "tools": [{
                        "type": "function",
                        "function": {
                            "name": "create_task",
                            "description": "Create a task",
                            "parameters": {"type": "object"}
                        }
                    }]
                }),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn no_tools_means_single_plain_completion() {
        let provider = Arc::new(ScriptedProvider::new(vec![text("hello there")]));
        let store = Arc::new(MemoryStore::new());
        let orch = orchestrator(provider.clone(), store);

        let reply = orch
            .run(&ClientId::new("t1"), vec![ChatMessage::user("hi")])
            .await;

        assert_eq!(reply.as_deref(), Some("hello there"));
        assert_eq!(provider.calls(), 1);
        let request = provider.last_request.lock().unwrap().take().unwrap();
        assert!(request.tools.is_empty());
        assert!(request.tool_choice.is_none());
    }

    #[tokio::test]
    async fn tool_round_then_text() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            tool_call("create_task", r#"{"name":"N1","request":"weed removal"}"#),
            text("予約を承りました。"),
        ]));
        let store = Arc::new(MemoryStore::new());
        let client = ClientId::new("t1");
        enable_builtin_tools(&store, &client).await;
        let orch = orchestrator(provider.clone(), store.clone());

        let reply = orch.run(&client, vec![ChatMessage::user("book it")]).await;

        assert_eq!(reply.as_deref(), Some("予約を承りました。"));
        assert_eq!(provider.calls(), 2);
        // The tool call actually executed against the store
        let task = store.get_task(&client, "N1").await.unwrap();
        assert_eq!(task.request, "weed removal");

        // The second request carries the assistant tool-call message and its result
        let request = provider.last_request.lock().unwrap().take().unwrap();
        assert_eq!(request.messages.len(), 3);
        assert!(!request.messages[1].tool_calls.is_empty());
        assert_eq!(request.messages[2].tool_call_id.as_deref(), Some("call_1"));
        assert!(request.messages[2].content.contains("\"name\":\"N1\""));
        assert_eq!(request.tool_choice.as_deref(), Some("auto"));
    }

    #[tokio::test]
    async fn round_ceiling_yields_none() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            tool_call("create_task", r#"{"name":"a"}"#),
            tool_call("create_task", r#"{"name":"b"}"#),
            tool_call("create_task", r#"{"name":"c"}"#),
            tool_call("create_task", r#"{"name":"d"}"#),
            text("never reached"),
        ]));
        let store = Arc::new(MemoryStore::new());
        let client = ClientId::new("t1");
        enable_builtin_tools(&store, &client).await;
        let orch = orchestrator(provider.clone(), store);

        let reply = orch.run(&client, vec![ChatMessage::user("go")]).await;

        assert!(reply.is_none());
        assert_eq!(provider.calls(), 4);
    }

    #[tokio::test]
    async fn provider_failure_yields_none() {
        let provider = Arc::new(ScriptedProvider::new(vec![Err(ProviderError::Network(
            "connection refused".into(),
        ))]));
        let store = Arc::new(MemoryStore::new());
        let orch = orchestrator(provider, store);

        let reply = orch
            .run(&ClientId::new("t1"), vec![ChatMessage::user("hi")])
            .await;
        assert!(reply.is_none());
    }

    #[tokio::test]
    async fn empty_text_without_tool_calls_yields_none() {
        let provider = Arc::new(ScriptedProvider::new(vec![text("")]));
        let store = Arc::new(MemoryStore::new());
        let client = ClientId::new("t1");
        enable_builtin_tools(&store, &client).await;
        let orch = orchestrator(provider.clone(), store);

        let reply = orch.run(&client, vec![ChatMessage::user("hi")]).await;
        assert!(reply.is_none());
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn failed_tool_result_feeds_back_to_model() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            tool_call("get_task", r#"{"name":"missing"}"#),
            text("そのご予約は見つかりませんでした。"),
        ]));
        let store = Arc::new(MemoryStore::new());
        let client = ClientId::new("t1");
        enable_builtin_tools(&store, &client).await;
        let orch = orchestrator(provider.clone(), store);

        let reply = orch.run(&client, vec![ChatMessage::user("check")]).await;

        assert!(reply.is_some());
        let request = provider.last_request.lock().unwrap().take().unwrap();
        assert!(request.messages[2].content.contains("not found"));
    }
}
