//! Task CRUD router.
//!
//! Accepts the same field aliases the built-in tools accept
//! (`requirement`, `start_date`, `phone`) so older clients keep working.

use crate::{body_field, client_id, error_response, ok, store_error_response, ApiResponse, SharedState};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use frontdesk_core::model::{now_iso, Task, TaskUpdate};
use serde_json::{json, Value};

/// Ceiling on `GET /tasks`.
const LIST_LIMIT: usize = 200;

/// `GET /tasks`
pub async fn list_tasks(State(state): State<SharedState>, headers: HeaderMap) -> ApiResponse {
    let client = client_id(&state, &headers);
    match state.store.list_tasks(&client, LIST_LIMIT).await {
        Ok(items) => ok(json!({"items": items})),
        Err(e) => store_error_response(&e),
    }
}

/// `POST /task`
pub async fn create_task(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> ApiResponse {
    let client = client_id(&state, &headers);
    let name = match body_field(&body, &["name"]).filter(|n| !n.is_empty()) {
        Some(n) => n,
        None => return error_response(StatusCode::BAD_REQUEST, "name required"),
    };

    let ts = now_iso();
    let task = Task {
        client_id: client.as_str().to_string(),
        name,
        request: body_field(&body, &["request", "requirement"]).unwrap_or_default(),
        start_datetime: body_field(&body, &["start_datetime", "start_date"]).unwrap_or_default(),
        phone_number: body_field(&body, &["phone_number", "phone"]).unwrap_or_default(),
        address: body_field(&body, &["address"]).unwrap_or_default(),
        created_at: ts.clone(),
        updated_at: ts,
    };

    match state.store.create_task(&task).await {
        Ok(()) => ok(json!({"item": task})),
        Err(e) => store_error_response(&e),
    }
}

/// `GET /task/{name}`
pub async fn get_task(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> ApiResponse {
    let client = client_id(&state, &headers);
    match state.store.get_task(&client, &name).await {
        Ok(task) => ok(json!({"item": task})),
        Err(e) => store_error_response(&e),
    }
}

/// `PUT /task/{name}` — partial update, alias-aware.
pub async fn update_task(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(name): Path<String>,
    Json(body): Json<Value>,
) -> ApiResponse {
    let client = client_id(&state, &headers);
    let update = TaskUpdate {
        request: body_field(&body, &["request", "requirement"]),
        start_datetime: body_field(&body, &["start_datetime", "start_date"]),
        phone_number: body_field(&body, &["phone_number", "phone"]),
        address: body_field(&body, &["address"]),
    };
    if update.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "nothing to update");
    }

    match state
        .store
        .update_task(&client, &name, &update, &now_iso())
        .await
    {
        Ok(task) => ok(json!({"item": task})),
        Err(e) => store_error_response(&e),
    }
}

/// `DELETE /task/{name}`
pub async fn delete_task(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> ApiResponse {
    let client = client_id(&state, &headers);
    match state.store.delete_task(&client, &name).await {
        Ok(()) => ok(json!({})),
        Err(e) => store_error_response(&e),
    }
}
