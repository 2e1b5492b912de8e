//! Durable-store traits and backends for Frontdesk.
//!
//! The core treats storage as an external collaborator reached through
//! narrow, tenant-scoped interfaces: ordered range queries over turn sort
//! keys, conditional task writes, paged FAQ reads, and last-write-wins
//! prompt records. Two backends implement them:
//!
//! - [`MemoryStore`] — BTreeMap-based, for tests and ephemeral runs
//! - [`SqliteStore`] — sqlx/SQLite, the durable default

pub mod memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use memory::MemoryStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use frontdesk_core::error::StoreError;
use frontdesk_core::model::{ClientId, ConversationTurn, FaqEntry, PromptKind, Task, TaskUpdate};

/// Conversation-turn persistence.
#[async_trait]
pub trait TurnStore: Send + Sync {
    /// Persist one turn. Writing an identical `(client_id, sort key)` pair
    /// again overwrites the stored record (idempotent put).
    async fn put_turn(&self, turn: &ConversationTurn) -> Result<(), StoreError>;

    /// Turns whose sort key starts with `prefix`, ascending by sort key
    /// (oldest first), at most `limit` records.
    async fn turns_by_contact(
        &self,
        client_id: &ClientId,
        prefix: &str,
        limit: usize,
    ) -> Result<Vec<ConversationTurn>, StoreError>;

    /// All turns carrying `call_sid`, at most `cap` records.
    ///
    /// Contract: results come back in insertion order, NOT re-sorted by
    /// timestamp, and are not tenant-filtered — callers must drop records
    /// from other tenants themselves.
    async fn turns_by_call_sid(
        &self,
        call_sid: &str,
        cap: usize,
    ) -> Result<Vec<ConversationTurn>, StoreError>;
}

/// Task CRUD, keyed `(client_id, name)`.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn list_tasks(&self, client_id: &ClientId, limit: usize)
        -> Result<Vec<Task>, StoreError>;

    /// Conditional insert: fails with [`StoreError::Conflict`] when the
    /// name already exists for the tenant.
    async fn create_task(&self, task: &Task) -> Result<(), StoreError>;

    async fn get_task(&self, client_id: &ClientId, name: &str) -> Result<Task, StoreError>;

    /// Apply a partial update and return the new record.
    /// Fails with [`StoreError::NotFound`] when the key does not exist.
    async fn update_task(
        &self,
        client_id: &ClientId,
        name: &str,
        update: &TaskUpdate,
        updated_at: &str,
    ) -> Result<Task, StoreError>;

    /// Conditioned on existence: fails with [`StoreError::NotFound`] when
    /// absent.
    async fn delete_task(&self, client_id: &ClientId, name: &str) -> Result<(), StoreError>;
}

/// FAQ storage, keyed `(client_id, question)`.
#[async_trait]
pub trait FaqStore: Send + Sync {
    /// One page of entries in question order. `cursor` is the last question
    /// of the previous page; a returned `None` cursor means exhaustion.
    async fn page_faqs(
        &self,
        client_id: &ClientId,
        page_size: usize,
        cursor: Option<&str>,
    ) -> Result<(Vec<FaqEntry>, Option<String>), StoreError>;

    async fn create_faq(&self, client_id: &ClientId, entry: &FaqEntry) -> Result<(), StoreError>;

    async fn get_faq(&self, client_id: &ClientId, question: &str) -> Result<FaqEntry, StoreError>;

    async fn update_faq_answer(
        &self,
        client_id: &ClientId,
        question: &str,
        answer: &str,
        updated_at: &str,
    ) -> Result<FaqEntry, StoreError>;

    async fn delete_faq(&self, client_id: &ClientId, question: &str) -> Result<(), StoreError>;
}

/// Per-tenant prompt/tool configuration records, keyed `(client_id, kind)`.
/// Single mutable record per kind, last-write-wins.
#[async_trait]
pub trait PromptStore: Send + Sync {
    async fn get_prompt(
        &self,
        client_id: &ClientId,
        kind: PromptKind,
    ) -> Result<Option<serde_json::Value>, StoreError>;

    async fn put_prompt(
        &self,
        client_id: &ClientId,
        kind: PromptKind,
        content: &serde_json::Value,
    ) -> Result<(), StoreError>;
}

/// The full store surface the orchestrator needs, as one object-safe bound.
pub trait Store: TurnStore + TaskStore + FaqStore + PromptStore {}

impl<T: TurnStore + TaskStore + FaqStore + PromptStore> Store for T {}
