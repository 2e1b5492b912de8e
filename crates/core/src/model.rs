//! Persisted entity types: conversation turns, tasks, FAQ entries, and
//! per-tenant prompt/tool configuration.
//!
//! Everything here is partitioned by tenant (`ClientId`); there is no
//! explicit tenant record — existence is implicit in the presence of
//! keyed data.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The tenant isolation boundary. Opaque; advisory (no identity
/// verification happens at this layer).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientId(pub String);

impl ClientId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fixed-width ISO-8601 UTC timestamp with second precision.
///
/// Invariant: this is the ONLY formatting used for turn sort keys.
/// Lexicographic order of `contact_key#ts` equals chronological order only
/// while the format stays fixed-width UTC — do not change it.
pub fn now_iso() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S+00:00").to_string()
}

/// One completed (user utterance, assistant reply) exchange for a contact.
///
/// Never mutated after creation; logging the same `(client_id, sort key)`
/// twice overwrites rather than duplicates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub client_id: String,

    /// Normalized phone number identifying the conversation thread
    pub contact_key: String,

    /// ISO-8601 UTC, second precision (see [`now_iso`])
    pub ts: String,

    pub user_text: String,

    pub assistant_text: String,

    /// Correlates turns belonging to one telephony call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_sid: Option<String>,
}

impl ConversationTurn {
    /// Range-queryable sort key: `contact_key#ts`.
    pub fn sort_key(&self) -> String {
        format!("{}#{}", self.contact_key, self.ts)
    }
}

/// A tenant task record, keyed by a user-assigned unique name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub client_id: String,
    pub name: String,
    #[serde(default)]
    pub request: String,
    #[serde(default)]
    pub start_datetime: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub address: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A partial task update. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub request: Option<String>,
    pub start_datetime: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

impl TaskUpdate {
    pub fn is_empty(&self) -> bool {
        self.request.is_none()
            && self.start_datetime.is_none()
            && self.phone_number.is_none()
            && self.address.is_none()
    }
}

/// One FAQ entry; read-only input to the knowledge injector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// The kinds of per-tenant prompt/tool configuration records.
/// Each is a single mutable record per tenant, last-write-wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PromptKind {
    /// Free-text system instructions
    System,
    /// Built-in tool schemas + instructions
    Functions,
    /// External HTTP tool descriptors
    ExtTools,
}

impl PromptKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptKind::System => "system",
            PromptKind::Functions => "functions",
            PromptKind::ExtTools => "ext-tools",
        }
    }
}

/// Contents of a tenant's `functions` config record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FunctionsConfig {
    /// Raw tool schemas in the generation endpoint's format
    #[serde(default)]
    pub tools: Vec<serde_json::Value>,
    #[serde(default)]
    pub instructions: String,
}

/// Contents of a tenant's `ext-tools` config record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtToolsConfig {
    #[serde(default)]
    pub ext_tools: Vec<ExternalToolDescriptor>,
}

/// A tenant-configured external HTTP tool.
///
/// `url`, header values, and `body` are templates: `{{field}}` placeholders
/// are substituted with the model's call arguments before dispatch.
/// Invariant: `name` is unique within a tenant's list; a collision with a
/// built-in tool name resolves to the built-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalToolDescriptor {
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// JSON-schema-like parameter spec sent to the model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,

    #[serde(default = "default_method")]
    pub method: String,

    pub url: String,

    #[serde(default)]
    pub headers: HashMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    /// Request timeout in seconds (default 10)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

fn default_method() -> String {
    "GET".into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_key_is_contact_then_ts() {
        let turn = ConversationTurn {
            client_id: "tenant".into(),
            contact_key: "09012345678".into(),
            ts: "2024-05-01T09:30:00+00:00".into(),
            user_text: "hi".into(),
            assistant_text: "hello".into(),
            call_sid: None,
        };
        assert_eq!(turn.sort_key(), "09012345678#2024-05-01T09:30:00+00:00");
    }

    #[test]
    fn now_iso_is_fixed_width() {
        let ts = now_iso();
        // e.g. 2024-05-01T09:30:00+00:00
        assert_eq!(ts.len(), 25);
        assert!(ts.ends_with("+00:00"));
    }

    #[test]
    fn sort_keys_order_chronologically() {
        let a = "09012345678#2024-05-01T09:30:00+00:00";
        let b = "09012345678#2024-05-01T09:30:01+00:00";
        let c = "09012345678#2024-05-02T00:00:00+00:00";
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn prompt_kind_keys() {
        assert_eq!(PromptKind::System.as_str(), "system");
        assert_eq!(PromptKind::Functions.as_str(), "functions");
        assert_eq!(PromptKind::ExtTools.as_str(), "ext-tools");
    }

    #[test]
    fn ext_tool_descriptor_defaults() {
        let t: ExternalToolDescriptor = serde_json::from_str(
            r#"{"name": "lookup", "url": "https://x/{{id}}"}"#,
        )
        .unwrap();
        assert_eq!(t.method, "GET");
        assert!(t.headers.is_empty());
        assert!(t.timeout.is_none());
    }

    #[test]
    fn functions_config_tolerates_missing_fields() {
        let cfg: FunctionsConfig = serde_json::from_str("{}").unwrap();
        assert!(cfg.tools.is_empty());
        assert!(cfg.instructions.is_empty());
    }

    #[test]
    fn task_update_empty_detection() {
        assert!(TaskUpdate::default().is_empty());
        let upd = TaskUpdate {
            address: Some("Shibuya".into()),
            ..Default::default()
        };
        assert!(!upd.is_empty());
    }
}
