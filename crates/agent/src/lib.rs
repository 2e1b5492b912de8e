//! Conversation orchestration for Frontdesk.
//!
//! One inbound utterance flows through this crate end to end:
//!
//! 1. [`HistoryReconstructor`] rebuilds the recent conversation from
//!    persisted turns (by contact, or by telephony call when a call sid
//!    is present).
//! 2. [`knowledge_snapshot`] pages the tenant's FAQ entries into a
//!    serialized knowledge block.
//! 3. [`compose`] orders system instructions, knowledge, history, and the
//!    new utterance into the message sequence.
//! 4. [`Orchestrator`] drives the bounded tool-calling loop against the
//!    generation endpoint, executing tools through [`ToolRegistry`].
//! 5. [`TurnLogger`] persists the completed exchange, best-effort.
//!
//! [`ChatService`] wires the steps together behind a single `handle()`.

pub mod compose;
pub mod ext_tool;
pub mod history;
pub mod knowledge;
pub mod logger;
pub mod orchestrator;
pub mod service;
pub mod tools;

pub use compose::compose;
pub use ext_tool::ExtToolClient;
pub use history::HistoryReconstructor;
pub use knowledge::knowledge_snapshot;
pub use logger::TurnLogger;
pub use orchestrator::Orchestrator;
pub use service::{ChatOptions, ChatService};
pub use tools::ToolRegistry;
