//! The chat endpoint.

use crate::{client_id, error_response, ok, ApiResponse, SharedState};
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use frontdesk_core::phone::normalize_phone;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct ChatBody {
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub user_text: Option<String>,
    #[serde(default, alias = "callSid")]
    pub call_sid: Option<String>,
}

/// `POST /chat` — run one utterance through the orchestrator.
pub async fn chat_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<ChatBody>,
) -> ApiResponse {
    let client = client_id(&state, &headers);
    let contact = normalize_phone(body.phone_number.as_deref().unwrap_or_default());
    let user_text = body.user_text.unwrap_or_default();

    if contact.is_empty() || user_text.is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "phone_number and user_text required",
        );
    }

    let reply = state
        .chat
        .handle(&client, &contact, &user_text, body.call_sid.as_deref())
        .await;
    ok(json!({"reply": reply}))
}
