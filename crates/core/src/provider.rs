//! ChatProvider trait — the abstraction over the text-generation endpoint.
//!
//! A provider accepts the composed message list plus optional tool schemas
//! and returns the model's next message, which carries either free text or
//! structured tool-invocation requests.

use crate::error::ProviderError;
use crate::message::ChatMessage;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The model to use (e.g., "gpt-4o-mini")
    pub model: String,

    /// The composed conversation messages
    pub messages: Vec<ChatMessage>,

    /// Decoding temperature (the loop pins this low for determinism)
    pub temperature: f32,

    /// Bounded output length
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Tool schemas the model may invoke. When empty, no tools field is
    /// sent at all and the call degenerates to plain completion.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,

    /// Tool-choice policy, only meaningful when `tools` is non-empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<String>,
}

/// A tool schema sent to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,

    pub description: String,

    /// JSON Schema describing the tool's parameters
    pub parameters: serde_json::Value,
}

/// A completion response: `choices[0].message` of the wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub message: ChatMessage,
}

/// The generation-endpoint abstraction.
///
/// The orchestration loop calls `complete()` without knowing which backend
/// is wired in; tests substitute scripted implementations.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// A human-readable name for this provider (e.g., "openai").
    fn name(&self) -> &str;

    /// Send a request and get the model's next message.
    async fn complete(
        &self,
        request: ChatRequest,
    ) -> std::result::Result<ChatResponse, ProviderError>;
}
