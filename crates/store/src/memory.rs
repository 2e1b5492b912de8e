//! In-memory backend — useful for testing and ephemeral sessions.
//!
//! Turns live in a BTreeMap keyed `(client_id, sort_key)` so prefix range
//! scans come out in sort-key order for free, mirroring how the durable
//! backend's range queries behave.

use crate::{FaqStore, PromptStore, TaskStore, TurnStore};
use async_trait::async_trait;
use frontdesk_core::error::StoreError;
use frontdesk_core::model::{ClientId, ConversationTurn, FaqEntry, PromptKind, Task, TaskUpdate};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

#[derive(Default)]
struct Inner {
    /// (client_id, sort_key) -> turn
    turns: BTreeMap<(String, String), ConversationTurn>,
    /// Insertion-ordered keys, for call-sid lookups
    turn_order: Vec<(String, String)>,
    /// (client_id, name) -> task
    tasks: BTreeMap<(String, String), Task>,
    /// (client_id, question) -> entry
    faqs: BTreeMap<(String, String), FaqEntry>,
    /// (client_id, kind) -> content
    prompts: HashMap<(String, String), serde_json::Value>,
}

/// An in-memory store implementing every store trait.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TurnStore for MemoryStore {
    async fn put_turn(&self, turn: &ConversationTurn) -> Result<(), StoreError> {
        let key = (turn.client_id.clone(), turn.sort_key());
        let mut inner = self.inner.write().await;
        if inner.turns.insert(key.clone(), turn.clone()).is_none() {
            inner.turn_order.push(key);
        }
        Ok(())
    }

    async fn turns_by_contact(
        &self,
        client_id: &ClientId,
        prefix: &str,
        limit: usize,
    ) -> Result<Vec<ConversationTurn>, StoreError> {
        let inner = self.inner.read().await;
        let start = (client_id.0.clone(), prefix.to_string());
        let turns = inner
            .turns
            .range(start..)
            .take_while(|((cid, sk), _)| cid == client_id.as_str() && sk.starts_with(prefix))
            .take(limit)
            .map(|(_, t)| t.clone())
            .collect();
        Ok(turns)
    }

    async fn turns_by_call_sid(
        &self,
        call_sid: &str,
        cap: usize,
    ) -> Result<Vec<ConversationTurn>, StoreError> {
        let inner = self.inner.read().await;
        let turns = inner
            .turn_order
            .iter()
            .filter_map(|key| inner.turns.get(key))
            .filter(|t| t.call_sid.as_deref() == Some(call_sid))
            .take(cap)
            .cloned()
            .collect();
        Ok(turns)
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn list_tasks(
        &self,
        client_id: &ClientId,
        limit: usize,
    ) -> Result<Vec<Task>, StoreError> {
        let inner = self.inner.read().await;
        let start = (client_id.0.clone(), String::new());
        let tasks = inner
            .tasks
            .range(start..)
            .take_while(|((cid, _), _)| cid == client_id.as_str())
            .take(limit)
            .map(|(_, t)| t.clone())
            .collect();
        Ok(tasks)
    }

    async fn create_task(&self, task: &Task) -> Result<(), StoreError> {
        let key = (task.client_id.clone(), task.name.clone());
        let mut inner = self.inner.write().await;
        // Existence check under the write lock is the concurrency guard here
        if inner.tasks.contains_key(&key) {
            return Err(StoreError::Conflict);
        }
        inner.tasks.insert(key, task.clone());
        Ok(())
    }

    async fn get_task(&self, client_id: &ClientId, name: &str) -> Result<Task, StoreError> {
        let inner = self.inner.read().await;
        inner
            .tasks
            .get(&(client_id.0.clone(), name.to_string()))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update_task(
        &self,
        client_id: &ClientId,
        name: &str,
        update: &TaskUpdate,
        updated_at: &str,
    ) -> Result<Task, StoreError> {
        let mut inner = self.inner.write().await;
        let task = inner
            .tasks
            .get_mut(&(client_id.0.clone(), name.to_string()))
            .ok_or(StoreError::NotFound)?;
        if let Some(v) = &update.request {
            task.request = v.clone();
        }
        if let Some(v) = &update.start_datetime {
            task.start_datetime = v.clone();
        }
        if let Some(v) = &update.phone_number {
            task.phone_number = v.clone();
        }
        if let Some(v) = &update.address {
            task.address = v.clone();
        }
        task.updated_at = updated_at.to_string();
        Ok(task.clone())
    }

    async fn delete_task(&self, client_id: &ClientId, name: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner
            .tasks
            .remove(&(client_id.0.clone(), name.to_string()))
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl FaqStore for MemoryStore {
    async fn page_faqs(
        &self,
        client_id: &ClientId,
        page_size: usize,
        cursor: Option<&str>,
    ) -> Result<(Vec<FaqEntry>, Option<String>), StoreError> {
        let inner = self.inner.read().await;
        let start = (
            client_id.0.clone(),
            cursor.map(|c| format!("{c}\u{0}")).unwrap_or_default(),
        );
        let items: Vec<FaqEntry> = inner
            .faqs
            .range(start..)
            .take_while(|((cid, _), _)| cid == client_id.as_str())
            .take(page_size)
            .map(|(_, e)| e.clone())
            .collect();
        let next = if items.len() == page_size {
            items.last().map(|e| e.question.clone())
        } else {
            None
        };
        Ok((items, next))
    }

    async fn create_faq(&self, client_id: &ClientId, entry: &FaqEntry) -> Result<(), StoreError> {
        let key = (client_id.0.clone(), entry.question.clone());
        let mut inner = self.inner.write().await;
        if inner.faqs.contains_key(&key) {
            return Err(StoreError::Conflict);
        }
        inner.faqs.insert(key, entry.clone());
        Ok(())
    }

    async fn get_faq(&self, client_id: &ClientId, question: &str) -> Result<FaqEntry, StoreError> {
        let inner = self.inner.read().await;
        inner
            .faqs
            .get(&(client_id.0.clone(), question.to_string()))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update_faq_answer(
        &self,
        client_id: &ClientId,
        question: &str,
        answer: &str,
        updated_at: &str,
    ) -> Result<FaqEntry, StoreError> {
        let mut inner = self.inner.write().await;
        let entry = inner
            .faqs
            .get_mut(&(client_id.0.clone(), question.to_string()))
            .ok_or(StoreError::NotFound)?;
        entry.answer = answer.to_string();
        entry.updated_at = Some(updated_at.to_string());
        Ok(entry.clone())
    }

    async fn delete_faq(&self, client_id: &ClientId, question: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner
            .faqs
            .remove(&(client_id.0.clone(), question.to_string()))
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl PromptStore for MemoryStore {
    async fn get_prompt(
        &self,
        client_id: &ClientId,
        kind: PromptKind,
    ) -> Result<Option<serde_json::Value>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .prompts
            .get(&(client_id.0.clone(), kind.as_str().to_string()))
            .cloned())
    }

    async fn put_prompt(
        &self,
        client_id: &ClientId,
        kind: PromptKind,
        content: &serde_json::Value,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.prompts.insert(
            (client_id.0.clone(), kind.as_str().to_string()),
            content.clone(),
        );
        Ok(())
    }
}
