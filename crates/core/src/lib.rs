//! # Frontdesk Core
//!
//! Domain types, traits, and error definitions for the Frontdesk
//! multi-tenant conversation orchestrator. This crate has **zero framework
//! dependencies** — it defines the domain model that all other crates
//! implement against.
//!
//! ## Design Philosophy
//!
//! The generation endpoint and the durable store are defined as traits here
//! and implemented in their respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod message;
pub mod model;
pub mod phone;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use error::{ProviderError, StoreError, ToolError};
pub use message::{ChatMessage, Role, ToolCall};
pub use model::{
    ClientId, ConversationTurn, ExtToolsConfig, ExternalToolDescriptor, FaqEntry, FunctionsConfig,
    PromptKind, Task, TaskUpdate, now_iso,
};
pub use phone::normalize_phone;
pub use provider::{ChatProvider, ChatRequest, ChatResponse, ToolDefinition};
