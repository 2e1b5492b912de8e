//! HTTP API gateway for Frontdesk.
//!
//! Routes:
//!
//! - `POST /chat`                — one utterance in, one reply out
//! - `GET/PUT /prompt`           — tenant system instructions
//! - `GET/PUT /func-config`      — built-in tool schemas + instructions
//! - `GET/PUT /ext-tools`        — external HTTP tool descriptors
//! - `GET /faqs`, `POST /faq`, `GET/PUT/DELETE /faq/{question}`
//! - `GET /tasks`, `POST /task`, `GET/PUT/DELETE /task/{name}`
//! - `GET /health`
//!
//! Tenancy comes from the `x-client-id` header; requests without it land
//! on the configured default tenant. Every response is an
//! `{"ok": ..., ...}` envelope.

pub mod chat;
pub mod faqs;
pub mod prompts;
pub mod tasks;

use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use frontdesk_agent::{ChatOptions, ChatService};
use frontdesk_config::AppConfig;
use frontdesk_core::error::StoreError;
use frontdesk_core::model::ClientId;
use frontdesk_core::provider::ChatProvider;
use frontdesk_store::Store;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared application state for the gateway.
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub chat: ChatService,
    pub default_client_id: String,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        provider: Arc<dyn ChatProvider>,
        config: &AppConfig,
    ) -> Self {
        let options = ChatOptions {
            model: config.chat.model.clone(),
            temperature: config.chat.temperature,
            max_tokens: config.chat.max_tokens,
            history_limit: config.chat.history_limit,
            fallback_reply: config.chat.fallback_reply.clone(),
        };
        Self {
            chat: ChatService::new(store.clone(), provider, options),
            store,
            default_client_id: config.chat.default_client_id.clone(),
        }
    }
}

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/chat", post(chat::chat_handler))
        .route(
            "/prompt",
            get(prompts::get_system_prompt).put(prompts::put_system_prompt),
        )
        .route(
            "/func-config",
            get(prompts::get_func_config).put(prompts::put_func_config),
        )
        .route(
            "/ext-tools",
            get(prompts::get_ext_tools).put(prompts::put_ext_tools),
        )
        .route("/faqs", get(faqs::list_faqs))
        .route("/faq", post(faqs::create_faq))
        .route(
            "/faq/{question}",
            get(faqs::get_faq).put(faqs::update_faq).delete(faqs::delete_faq),
        )
        .route("/tasks", get(tasks::list_tasks))
        .route("/task", post(tasks::create_task))
        .route(
            "/task/{name}",
            get(tasks::get_task).put(tasks::update_task).delete(tasks::delete_task),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until shutdown.
pub async fn serve(state: SharedState, host: &str, port: u16) -> std::io::Result<()> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Gateway listening on {addr}");
    axum::serve(listener, build_router(state)).await
}

async fn health_handler() -> Json<Value> {
    Json(json!({"ok": true, "status": "healthy"}))
}

/// Resolve the tenant for a request. Advisory: the header is trusted as-is.
pub(crate) fn client_id(state: &AppState, headers: &HeaderMap) -> ClientId {
    headers
        .get("x-client-id")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(ClientId::new)
        .unwrap_or_else(|| ClientId::new(state.default_client_id.clone()))
}

pub(crate) type ApiResponse = (StatusCode, Json<Value>);

pub(crate) fn ok(mut body: Value) -> ApiResponse {
    if let Some(obj) = body.as_object_mut() {
        obj.insert("ok".into(), Value::Bool(true));
    }
    (StatusCode::OK, Json(body))
}

pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> ApiResponse {
    (
        status,
        Json(json!({"ok": false, "error": message.into()})),
    )
}

pub(crate) fn store_error_response(e: &StoreError) -> ApiResponse {
    match e {
        StoreError::NotFound => error_response(StatusCode::NOT_FOUND, "not found"),
        StoreError::Conflict => error_response(StatusCode::CONFLICT, "already exists"),
        other => error_response(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    }
}

/// First body field present among `keys`, coerced to a string.
pub(crate) fn body_field(body: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        let value = match body.get(*key) {
            Some(v) => v,
            None => continue,
        };
        return match value {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        };
    }
    None
}
