//! SQLite backend.
//!
//! One database file with four tables mirroring the partitioned layout:
//! `turns` (PK `(client_id, sk)`, index on `call_sid`), `tasks`
//! (PK `(client_id, name)`), `faqs` (PK `(client_id, question)`), and
//! `prompts` (PK `(client_id, kind)`).
//!
//! Call-sid lookups come back in rowid order, which is insertion order for
//! this table — that satisfies the `turns_by_call_sid` contract.

use crate::{FaqStore, PromptStore, TaskStore, TurnStore};
use async_trait::async_trait;
use frontdesk_core::error::StoreError;
use frontdesk_core::model::{ClientId, ConversationTurn, FaqEntry, PromptKind, Task, TaskUpdate};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};

/// A durable SQLite store implementing every store trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Create a new SQLite store from a file path.
    ///
    /// The database and all tables/indexes are created automatically.
    /// Pass `":memory:"` for an in-process ephemeral database (useful for tests).
    pub async fn new(path: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(path)
            .map_err(|e| StoreError::Storage(format!("Invalid SQLite path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .pragma("foreign_keys", "ON");

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!("SQLite store initialized at {path}");
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS turns (
                client_id      TEXT NOT NULL,
                sk             TEXT NOT NULL,
                contact_key    TEXT NOT NULL,
                ts             TEXT NOT NULL,
                user_text      TEXT NOT NULL DEFAULT '',
                assistant_text TEXT NOT NULL DEFAULT '',
                call_sid       TEXT,
                PRIMARY KEY (client_id, sk)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("turns table: {e}")))?;

        // Secondary index standing in for the call-sid GSI
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_turns_call_sid ON turns(call_sid)")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(format!("call_sid index: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tasks (
                client_id      TEXT NOT NULL,
                name           TEXT NOT NULL,
                request        TEXT NOT NULL DEFAULT '',
                start_datetime TEXT NOT NULL DEFAULT '',
                phone_number   TEXT NOT NULL DEFAULT '',
                address        TEXT NOT NULL DEFAULT '',
                created_at     TEXT NOT NULL,
                updated_at     TEXT NOT NULL,
                PRIMARY KEY (client_id, name)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("tasks table: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS faqs (
                client_id  TEXT NOT NULL,
                question   TEXT NOT NULL,
                answer     TEXT NOT NULL,
                created_at TEXT,
                updated_at TEXT,
                PRIMARY KEY (client_id, question)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("faqs table: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS prompts (
                client_id  TEXT NOT NULL,
                kind       TEXT NOT NULL,
                content    TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (client_id, kind)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("prompts table: {e}")))?;

        debug!("SQLite migrations complete");
        Ok(())
    }

    fn row_to_turn(row: &sqlx::sqlite::SqliteRow) -> Result<ConversationTurn, StoreError> {
        Ok(ConversationTurn {
            client_id: get_col(row, "client_id")?,
            contact_key: get_col(row, "contact_key")?,
            ts: get_col(row, "ts")?,
            user_text: get_col(row, "user_text")?,
            assistant_text: get_col(row, "assistant_text")?,
            call_sid: row.try_get("call_sid").ok().flatten(),
        })
    }

    fn row_to_task(row: &sqlx::sqlite::SqliteRow) -> Result<Task, StoreError> {
        Ok(Task {
            client_id: get_col(row, "client_id")?,
            name: get_col(row, "name")?,
            request: get_col(row, "request")?,
            start_datetime: get_col(row, "start_datetime")?,
            phone_number: get_col(row, "phone_number")?,
            address: get_col(row, "address")?,
            created_at: get_col(row, "created_at")?,
            updated_at: get_col(row, "updated_at")?,
        })
    }

    fn row_to_faq(row: &sqlx::sqlite::SqliteRow) -> Result<FaqEntry, StoreError> {
        Ok(FaqEntry {
            question: get_col(row, "question")?,
            answer: get_col(row, "answer")?,
            created_at: row.try_get("created_at").ok().flatten(),
            updated_at: row.try_get("updated_at").ok().flatten(),
        })
    }
}

fn get_col(row: &sqlx::sqlite::SqliteRow, name: &str) -> Result<String, StoreError> {
    row.try_get(name)
        .map_err(|e| StoreError::Storage(format!("{name} column: {e}")))
}

fn map_insert_err(e: sqlx::Error) -> StoreError {
    if let Some(db) = e.as_database_error() {
        if db.is_unique_violation() {
            return StoreError::Conflict;
        }
    }
    StoreError::Storage(e.to_string())
}

#[async_trait]
impl TurnStore for SqliteStore {
    async fn put_turn(&self, turn: &ConversationTurn) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO turns
                (client_id, sk, contact_key, ts, user_text, assistant_text, call_sid)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&turn.client_id)
        .bind(turn.sort_key())
        .bind(&turn.contact_key)
        .bind(&turn.ts)
        .bind(&turn.user_text)
        .bind(&turn.assistant_text)
        .bind(&turn.call_sid)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("put_turn: {e}")))?;
        Ok(())
    }

    async fn turns_by_contact(
        &self,
        client_id: &ClientId,
        prefix: &str,
        limit: usize,
    ) -> Result<Vec<ConversationTurn>, StoreError> {
        // Contact keys are digit strings, so the prefix is LIKE-safe
        let rows = sqlx::query(
            "SELECT * FROM turns WHERE client_id = ? AND sk LIKE ? || '%' ORDER BY sk ASC LIMIT ?",
        )
        .bind(client_id.as_str())
        .bind(prefix)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("turns_by_contact: {e}")))?;

        rows.iter().map(Self::row_to_turn).collect()
    }

    async fn turns_by_call_sid(
        &self,
        call_sid: &str,
        cap: usize,
    ) -> Result<Vec<ConversationTurn>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM turns WHERE call_sid = ? ORDER BY rowid ASC LIMIT ?",
        )
        .bind(call_sid)
        .bind(cap as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("turns_by_call_sid: {e}")))?;

        rows.iter().map(Self::row_to_turn).collect()
    }
}

#[async_trait]
impl TaskStore for SqliteStore {
    async fn list_tasks(
        &self,
        client_id: &ClientId,
        limit: usize,
    ) -> Result<Vec<Task>, StoreError> {
        let rows =
            sqlx::query("SELECT * FROM tasks WHERE client_id = ? ORDER BY name ASC LIMIT ?")
                .bind(client_id.as_str())
                .bind(limit as i64)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| StoreError::Storage(format!("list_tasks: {e}")))?;

        rows.iter().map(Self::row_to_task).collect()
    }

    async fn create_task(&self, task: &Task) -> Result<(), StoreError> {
        // Plain INSERT: the primary key is the conditional-write guard
        sqlx::query(
            r#"
            INSERT INTO tasks
                (client_id, name, request, start_datetime, phone_number, address, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&task.client_id)
        .bind(&task.name)
        .bind(&task.request)
        .bind(&task.start_datetime)
        .bind(&task.phone_number)
        .bind(&task.address)
        .bind(&task.created_at)
        .bind(&task.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_insert_err)?;
        Ok(())
    }

    async fn get_task(&self, client_id: &ClientId, name: &str) -> Result<Task, StoreError> {
        let row = sqlx::query("SELECT * FROM tasks WHERE client_id = ? AND name = ?")
            .bind(client_id.as_str())
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(format!("get_task: {e}")))?
            .ok_or(StoreError::NotFound)?;
        Self::row_to_task(&row)
    }

    async fn update_task(
        &self,
        client_id: &ClientId,
        name: &str,
        update: &TaskUpdate,
        updated_at: &str,
    ) -> Result<Task, StoreError> {
        let mut task = self.get_task(client_id, name).await?;
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

        sqlx::query(
            r#"
            UPDATE tasks
            SET request = ?, start_datetime = ?, phone_number = ?, address = ?, updated_at = ?
            WHERE client_id = ? AND name = ?
            "#,
        )
        .bind(&task.request)
        .bind(&task.start_datetime)
        .bind(&task.phone_number)
        .bind(&task.address)
        .bind(&task.updated_at)
        .bind(client_id.as_str())
        .bind(name)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("update_task: {e}")))?;

        Ok(task)
    }

    async fn delete_task(&self, client_id: &ClientId, name: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE client_id = ? AND name = ?")
            .bind(client_id.as_str())
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(format!("delete_task: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl FaqStore for SqliteStore {
    async fn page_faqs(
        &self,
        client_id: &ClientId,
        page_size: usize,
        cursor: Option<&str>,
    ) -> Result<(Vec<FaqEntry>, Option<String>), StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM faqs
            WHERE client_id = ? AND question > ?
            ORDER BY question ASC
            LIMIT ?
            "#,
        )
        .bind(client_id.as_str())
        .bind(cursor.unwrap_or(""))
        .bind(page_size as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("page_faqs: {e}")))?;

        let items: Vec<FaqEntry> = rows
            .iter()
            .map(Self::row_to_faq)
            .collect::<Result<_, _>>()?;
        let next = if items.len() == page_size {
            items.last().map(|e| e.question.clone())
        } else {
            None
        };
        Ok((items, next))
    }

    async fn create_faq(&self, client_id: &ClientId, entry: &FaqEntry) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO faqs (client_id, question, answer, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(client_id.as_str())
        .bind(&entry.question)
        .bind(&entry.answer)
        .bind(&entry.created_at)
        .bind(&entry.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_insert_err)?;
        Ok(())
    }

    async fn get_faq(&self, client_id: &ClientId, question: &str) -> Result<FaqEntry, StoreError> {
        let row = sqlx::query("SELECT * FROM faqs WHERE client_id = ? AND question = ?")
            .bind(client_id.as_str())
            .bind(question)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(format!("get_faq: {e}")))?
            .ok_or(StoreError::NotFound)?;
        Self::row_to_faq(&row)
    }

    async fn update_faq_answer(
        &self,
        client_id: &ClientId,
        question: &str,
        answer: &str,
        updated_at: &str,
    ) -> Result<FaqEntry, StoreError> {
        let result = sqlx::query(
            "UPDATE faqs SET answer = ?, updated_at = ? WHERE client_id = ? AND question = ?",
        )
        .bind(answer)
        .bind(updated_at)
        .bind(client_id.as_str())
        .bind(question)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("update_faq_answer: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        self.get_faq(client_id, question).await
    }

    async fn delete_faq(&self, client_id: &ClientId, question: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM faqs WHERE client_id = ? AND question = ?")
            .bind(client_id.as_str())
            .bind(question)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(format!("delete_faq: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl PromptStore for SqliteStore {
    async fn get_prompt(
        &self,
        client_id: &ClientId,
        kind: PromptKind,
    ) -> Result<Option<serde_json::Value>, StoreError> {
        let row = sqlx::query("SELECT content FROM prompts WHERE client_id = ? AND kind = ?")
            .bind(client_id.as_str())
            .bind(kind.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(format!("get_prompt: {e}")))?;

        match row {
            Some(row) => {
                let content: String = get_col(&row, "content")?;
                let value = serde_json::from_str(&content)
                    .map_err(|e| StoreError::Serialization(format!("prompt content: {e}")))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn put_prompt(
        &self,
        client_id: &ClientId,
        kind: PromptKind,
        content: &serde_json::Value,
    ) -> Result<(), StoreError> {
        let serialized = serde_json::to_string(content)
            .map_err(|e| StoreError::Serialization(format!("prompt content: {e}")))?;

        sqlx::query(
            r#"
            INSERT INTO prompts (client_id, kind, content, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (client_id, kind) DO UPDATE
            SET content = excluded.content, updated_at = excluded.updated_at
            "#,
        )
        .bind(client_id.as_str())
        .bind(kind.as_str())
        .bind(&serialized)
        .bind(frontdesk_core::model::now_iso())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("put_prompt: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frontdesk_core::model::now_iso;

    async fn open() -> SqliteStore {
        SqliteStore::new(":memory:").await.unwrap()
    }

    fn turn(contact: &str, ts: &str, call_sid: Option<&str>) -> ConversationTurn {
        ConversationTurn {
            client_id: "tenant".into(),
            contact_key: contact.into(),
            ts: ts.into(),
            user_text: "hello".into(),
            assistant_text: "hi there".into(),
            call_sid: call_sid.map(String::from),
        }
    }

    #[tokio::test]
    async fn turn_prefix_query_is_ordered() {
        let store = open().await;
        store
            .put_turn(&turn("090", "2024-05-01T09:00:02+00:00", None))
            .await
            .unwrap();
        store
            .put_turn(&turn("090", "2024-05-01T09:00:00+00:00", None))
            .await
            .unwrap();
        store
            .put_turn(&turn("080", "2024-05-01T09:00:01+00:00", None))
            .await
            .unwrap();

        let turns = store
            .turns_by_contact(&ClientId::new("tenant"), "090#", 50)
            .await
            .unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].ts, "2024-05-01T09:00:00+00:00");
        assert_eq!(turns[1].ts, "2024-05-01T09:00:02+00:00");
    }

    #[tokio::test]
    async fn identical_sort_key_overwrites() {
        let store = open().await;
        let mut t = turn("090", "2024-05-01T09:00:00+00:00", None);
        store.put_turn(&t).await.unwrap();
        t.assistant_text = "rewritten".into();
        store.put_turn(&t).await.unwrap();

        let turns = store
            .turns_by_contact(&ClientId::new("tenant"), "090#", 50)
            .await
            .unwrap();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].assistant_text, "rewritten");
    }

    #[tokio::test]
    async fn call_sid_lookup_spans_contacts() {
        let store = open().await;
        store
            .put_turn(&turn("090", "2024-05-01T09:00:00+00:00", Some("CA9")))
            .await
            .unwrap();
        store
            .put_turn(&turn("080", "2024-05-01T09:00:01+00:00", Some("CA9")))
            .await
            .unwrap();
        store
            .put_turn(&turn("090", "2024-05-01T09:00:02+00:00", None))
            .await
            .unwrap();

        let turns = store.turns_by_call_sid("CA9", 200).await.unwrap();
        assert_eq!(turns.len(), 2);
    }

    #[tokio::test]
    async fn task_crud_cycle() {
        let store = open().await;
        let client = ClientId::new("tenant");
        let ts = now_iso();
        let task = Task {
            client_id: "tenant".into(),
            name: "N1".into(),
            request: "clean gutters".into(),
            start_datetime: String::new(),
            phone_number: String::new(),
            address: String::new(),
            created_at: ts.clone(),
            updated_at: ts,
        };

        store.create_task(&task).await.unwrap();
        assert!(matches!(
            store.create_task(&task).await.unwrap_err(),
            StoreError::Conflict
        ));

        let got = store.get_task(&client, "N1").await.unwrap();
        assert_eq!(got.request, "clean gutters");

        let upd = TaskUpdate {
            request: Some("clean gutters and drains".into()),
            ..Default::default()
        };
        let updated = store
            .update_task(&client, "N1", &upd, "2024-06-02T00:00:00+00:00")
            .await
            .unwrap();
        assert_eq!(updated.request, "clean gutters and drains");

        store.delete_task(&client, "N1").await.unwrap();
        assert!(matches!(
            store.delete_task(&client, "N1").await.unwrap_err(),
            StoreError::NotFound
        ));
    }

    #[tokio::test]
    async fn faq_paging_and_conflict() {
        let store = open().await;
        let client = ClientId::new("tenant");
        for i in 0..3 {
            store
                .create_faq(
                    &client,
                    &FaqEntry {
                        question: format!("q{i}"),
                        answer: format!("a{i}"),
                        created_at: Some(now_iso()),
                        updated_at: Some(now_iso()),
                    },
                )
                .await
                .unwrap();
        }

        let dup = FaqEntry {
            question: "q0".into(),
            answer: "other".into(),
            created_at: None,
            updated_at: None,
        };
        assert!(matches!(
            store.create_faq(&client, &dup).await.unwrap_err(),
            StoreError::Conflict
        ));

        let (page, cursor) = store.page_faqs(&client, 2, None).await.unwrap();
        assert_eq!(page.len(), 2);
        let (rest, cursor) = store
            .page_faqs(&client, 2, cursor.as_deref())
            .await
            .unwrap();
        assert_eq!(rest.len(), 1);
        assert!(cursor.is_none());
    }

    #[tokio::test]
    async fn prompt_roundtrip_last_write_wins() {
        let store = open().await;
        let client = ClientId::new("tenant");
        store
            .put_prompt(&client, PromptKind::Functions, &serde_json::json!({"tools": []}))
            .await
            .unwrap();
        store
            .put_prompt(
                &client,
                PromptKind::Functions,
                &serde_json::json!({"tools": [], "instructions": "be brief"}),
            )
            .await
            .unwrap();

        let got = store
            .get_prompt(&client, PromptKind::Functions)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(got["instructions"], "be brief");
    }
}
