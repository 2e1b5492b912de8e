//! Per-tenant prompt and tool-config management.
//!
//! Three single-record kinds: the markdown system prompt, the functions
//! config (tool schemas + instructions), and the external tool
//! descriptors. Reads of absent records return empty defaults, writes are
//! last-write-wins.

use crate::{client_id, error_response, ok, store_error_response, ApiResponse, SharedState};
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use frontdesk_core::model::PromptKind;
use serde_json::{json, Value};

/// `GET /prompt`
pub async fn get_system_prompt(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> ApiResponse {
    let client = client_id(&state, &headers);
    match state.store.get_prompt(&client, PromptKind::System).await {
        Ok(value) => {
            let content = value
                .as_ref()
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            ok(json!({"id": "system", "content": content}))
        }
        Err(e) => store_error_response(&e),
    }
}

/// `PUT /prompt` — body `{"content": "<markdown>"}`.
pub async fn put_system_prompt(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> ApiResponse {
    let client = client_id(&state, &headers);
    let content = match body.get("content").and_then(Value::as_str) {
        Some(c) if !c.trim().is_empty() => c.to_string(),
        _ => return error_response(StatusCode::BAD_REQUEST, "content (markdown) required"),
    };

    match state
        .store
        .put_prompt(&client, PromptKind::System, &Value::String(content))
        .await
    {
        Ok(()) => ok(json!({})),
        Err(e) => store_error_response(&e),
    }
}

/// `GET /func-config`
pub async fn get_func_config(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> ApiResponse {
    get_config(state, headers, PromptKind::Functions, json!({"tools": [], "instructions": ""}))
        .await
}

/// `PUT /func-config` — body `{"config": {...}}`.
pub async fn put_func_config(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> ApiResponse {
    put_config(state, headers, PromptKind::Functions, body).await
}

/// `GET /ext-tools`
pub async fn get_ext_tools(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> ApiResponse {
    get_config(state, headers, PromptKind::ExtTools, json!({"ext_tools": []})).await
}

/// `PUT /ext-tools` — body `{"config": {...}}`.
pub async fn put_ext_tools(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> ApiResponse {
    put_config(state, headers, PromptKind::ExtTools, body).await
}

async fn get_config(
    state: SharedState,
    headers: HeaderMap,
    kind: PromptKind,
    default: Value,
) -> ApiResponse {
    let client = client_id(&state, &headers);
    match state.store.get_prompt(&client, kind).await {
        Ok(value) => ok(json!({"config": value.unwrap_or(default)})),
        Err(e) => store_error_response(&e),
    }
}

async fn put_config(
    state: SharedState,
    headers: HeaderMap,
    kind: PromptKind,
    body: Value,
) -> ApiResponse {
    let client = client_id(&state, &headers);
    let config = match body.get("config") {
        Some(c) if c.is_object() => c.clone(),
        _ => return error_response(StatusCode::BAD_REQUEST, "config (object) required"),
    };

    match state.store.put_prompt(&client, kind, &config).await {
        Ok(()) => ok(json!({})),
        Err(e) => store_error_response(&e),
    }
}

#[cfg(test)]
mod tests {
    use crate::test_util::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn put(path: &str, body: &str) -> Request<Body> {
        Request::put(path)
            .header("content-type", "application/json")
            .header("x-client-id", "t1")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(path: &str, client: &str) -> Request<Body> {
        Request::get(path)
            .header("x-client-id", client)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn system_prompt_roundtrip() {
        let (router, _) = router_with(Some("ok"));

        let response = router
            .clone()
            .oneshot(put("/prompt", r#"{"content":"You are a receptionist"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let response = router.oneshot(get("/prompt", "t1")).await.unwrap();
        let body = body_json(response).await;
        assert_eq!(body["id"], "system");
        assert_eq!(body["content"], "You are a receptionist");
    }

    #[tokio::test]
    async fn blank_system_prompt_rejected() {
        let (router, _) = router_with(Some("ok"));
        let response = router
            .oneshot(put("/prompt", r#"{"content":"   "}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), 400);
    }

    #[tokio::test]
    async fn func_config_defaults_when_absent() {
        let (router, _) = router_with(Some("ok"));
        let response = router.oneshot(get("/func-config", "t1")).await.unwrap();
        let body = body_json(response).await;
        assert_eq!(body["config"]["tools"], serde_json::json!([]));
        assert_eq!(body["config"]["instructions"], "");
    }

    #[tokio::test]
    async fn func_config_roundtrip() {
        let (router, _) = router_with(Some("ok"));
        router
            .clone()
            .oneshot(put(
                "/func-config",
                r#"{"config":{"tools":[],"instructions":"be brief"}}"#,
            ))
            .await
            .unwrap();

        let response = router.oneshot(get("/func-config", "t1")).await.unwrap();
        let body = body_json(response).await;
        assert_eq!(body["config"]["instructions"], "be brief");
    }

    #[tokio::test]
    async fn non_object_config_rejected() {
        let (router, _) = router_with(Some("ok"));
        let response = router
            .oneshot(put("/ext-tools", r#"{"config":"nope"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), 400);
        let body = body_json(response).await;
        assert_eq!(body["error"], "config (object) required");
    }

    #[tokio::test]
    async fn configs_are_tenant_scoped() {
        let (router, _) = router_with(Some("ok"));
        router
            .clone()
            .oneshot(put("/ext-tools", r#"{"config":{"ext_tools":[{"name":"w","url":"u"}]}}"#))
            .await
            .unwrap();

        let response = router.oneshot(get("/ext-tools", "other")).await.unwrap();
        let body = body_json(response).await;
        assert_eq!(body["config"]["ext_tools"], serde_json::json!([]));
    }
}
