//! Tool compilation and execution.
//!
//! The registry merges two tool sources per tenant: built-in task CRUD
//! tools and tenant-configured external HTTP tools. `compile()` produces
//! the schemas sent to the model; `execute()` runs a named call and always
//! returns a JSON value — tool failures are structured results the model
//! reasons about, never loop-aborting errors.

use crate::ext_tool::ExtToolClient;
use frontdesk_core::error::{StoreError, ToolError};
use frontdesk_core::model::{
    now_iso, ClientId, ExtToolsConfig, FunctionsConfig, PromptKind, Task, TaskUpdate,
};
use frontdesk_core::provider::ToolDefinition;
use frontdesk_store::Store;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// Ceiling on tasks returned by `list_tasks`.
const LIST_LIMIT: usize = 200;

/// Per-tenant tool surface: built-ins plus external descriptors.
pub struct ToolRegistry {
    store: Arc<dyn Store>,
    ext: ExtToolClient,
}

impl ToolRegistry {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            ext: ExtToolClient::new(),
        }
    }

    /// Compile the tenant's tool schemas for the generation endpoint.
    ///
    /// Unreadable or malformed config records contribute nothing; an empty
    /// result downgrades the request to a plain completion.
    pub async fn compile(&self, client_id: &ClientId) -> Vec<ToolDefinition> {
        let mut tools = Vec::new();

        for raw in self.functions_config(client_id).await.tools {
            if let Some(def) = parse_raw_tool(&raw) {
                tools.push(def);
            }
        }

        for descriptor in self.ext_tools_config(client_id).await.ext_tools {
            if descriptor.name.is_empty() {
                continue;
            }
            tools.push(ToolDefinition {
                name: descriptor.name,
                description: descriptor.description,
                parameters: descriptor.parameters.unwrap_or_else(permissive_parameters),
            });
        }

        debug!(client_id = %client_id, count = tools.len(), "Compiled tool schemas");
        tools
    }

    /// Execute one tool call. Built-in names win over external descriptors.
    ///
    /// `arguments` is the model's raw JSON string; unparseable arguments
    /// degrade to an empty object so validation errors surface through the
    /// tool result instead of a parse failure.
    pub async fn execute(&self, client_id: &ClientId, name: &str, arguments: &str) -> Value {
        let args: Value = serde_json::from_str(arguments).unwrap_or_else(|_| json!({}));

        if let Some(result) = self.run_builtin(client_id, name, &args).await {
            return match result {
                Ok(value) => value,
                Err(e) => json!({"error": e.to_string()}),
            };
        }

        let config = self.ext_tools_config(client_id).await;
        match config.ext_tools.iter().find(|t| t.name == name) {
            Some(descriptor) => self.ext.dispatch(descriptor, &args).await,
            None => json!({"ok": false, "error": format!("ext tool not found: {name}")}),
        }
    }

    /// Single resolution point for built-in names. `None` means the name is
    /// not a built-in and falls through to the external descriptors.
    async fn run_builtin(
        &self,
        client_id: &ClientId,
        name: &str,
        args: &Value,
    ) -> Option<Result<Value, ToolError>> {
        Some(match name {
            "list_tasks" => self.list_tasks(client_id).await,
            "create_task" => self.create_task(client_id, args).await,
            "get_task" => self.get_task(client_id, args).await,
            "update_task" => self.update_task(client_id, args).await,
            "delete_task" => self.delete_task(client_id, args).await,
            _ => return None,
        })
    }

    async fn list_tasks(&self, client_id: &ClientId) -> Result<Value, ToolError> {
        let tasks = self.store.list_tasks(client_id, LIST_LIMIT).await?;
        Ok(json!({"items": tasks}))
    }

    async fn create_task(&self, client_id: &ClientId, args: &Value) -> Result<Value, ToolError> {
        let task_name =
            string_arg(args, &["name"]).ok_or(ToolError::Validation("name".into()))?;
        let ts = now_iso();
        let task = Task {
            client_id: client_id.as_str().to_string(),
            name: task_name.clone(),
            request: string_arg(args, &["request", "requirement"]).unwrap_or_default(),
            start_datetime: string_arg(args, &["start_datetime", "start_date"])
                .unwrap_or_default(),
            phone_number: string_arg(args, &["phone_number", "phone"]).unwrap_or_default(),
            address: string_arg(args, &["address"]).unwrap_or_default(),
            created_at: ts.clone(),
            updated_at: ts,
        };
        self.store.create_task(&task).await.map_err(|e| match e {
            StoreError::Conflict => ToolError::Conflict(task_name.clone()),
            other => other.into(),
        })?;
        Ok(json!({"item": task}))
    }

    async fn get_task(&self, client_id: &ClientId, args: &Value) -> Result<Value, ToolError> {
        let task_name =
            string_arg(args, &["name"]).ok_or(ToolError::Validation("name".into()))?;
        let task = self.store.get_task(client_id, &task_name).await?;
        Ok(json!({"item": task}))
    }

    async fn update_task(&self, client_id: &ClientId, args: &Value) -> Result<Value, ToolError> {
        let task_name =
            string_arg(args, &["name"]).ok_or(ToolError::Validation("name".into()))?;
        let update = TaskUpdate {
            request: string_arg(args, &["request", "requirement"]),
            start_datetime: string_arg(args, &["start_datetime", "start_date"]),
            phone_number: string_arg(args, &["phone_number", "phone"]),
            address: string_arg(args, &["address"]),
        };
        if update.is_empty() {
            return Err(ToolError::NoOp);
        }
        let task = self
            .store
            .update_task(client_id, &task_name, &update, &now_iso())
            .await?;
        Ok(json!({"item": task}))
    }

    async fn delete_task(&self, client_id: &ClientId, args: &Value) -> Result<Value, ToolError> {
        let task_name =
            string_arg(args, &["name"]).ok_or(ToolError::Validation("name".into()))?;
        self.store.delete_task(client_id, &task_name).await?;
        Ok(json!({"ok": true}))
    }

    async fn functions_config(&self, client_id: &ClientId) -> FunctionsConfig {
        match self.store.get_prompt(client_id, PromptKind::Functions).await {
            Ok(Some(value)) => serde_json::from_value(value).unwrap_or_else(|e| {
                warn!(client_id = %client_id, error = %e, "Malformed functions config");
                FunctionsConfig::default()
            }),
            Ok(None) => FunctionsConfig::default(),
            Err(e) => {
                warn!(client_id = %client_id, error = %e, "Failed to read functions config");
                FunctionsConfig::default()
            }
        }
    }

    async fn ext_tools_config(&self, client_id: &ClientId) -> ExtToolsConfig {
        match self.store.get_prompt(client_id, PromptKind::ExtTools).await {
            Ok(Some(value)) => serde_json::from_value(value).unwrap_or_else(|e| {
                warn!(client_id = %client_id, error = %e, "Malformed ext-tools config");
                ExtToolsConfig::default()
            }),
            Ok(None) => ExtToolsConfig::default(),
            Err(e) => {
                warn!(client_id = %client_id, error = %e, "Failed to read ext-tools config");
                ExtToolsConfig::default()
            }
        }
    }
}

/// Schema allowing arbitrary arguments, used when a tool declares none.
fn permissive_parameters() -> Value {
    json!({"type": "object", "properties": {}, "additionalProperties": true})
}

/// Accept both the wire form `{"type":"function","function":{...}}` and the
/// flat `{name, description, parameters}` form.
fn parse_raw_tool(raw: &Value) -> Option<ToolDefinition> {
    let function = raw.get("function").unwrap_or(raw);
    let name = function.get("name")?.as_str()?;
    if name.is_empty() {
        return None;
    }
    Some(ToolDefinition {
        name: name.to_string(),
        description: function
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        parameters: function
            .get("parameters")
            .cloned()
            .unwrap_or_else(permissive_parameters),
    })
}

/// First non-empty argument among `keys`, canonical name before aliases.
/// Non-string scalars are stringified the way the store expects.
fn string_arg(args: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        let value = match args.get(*key) {
            Some(v) => v,
            None => continue,
        };
        let s = match value {
            Value::String(s) => s.clone(),
            Value::Null => continue,
            other => other.to_string(),
        };
        if !s.is_empty() {
            return Some(s);
        }
    }
    None
}
