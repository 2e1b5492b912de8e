//! FAQ CRUD router. Entries are keyed by question text.

use crate::{client_id, error_response, ok, store_error_response, ApiResponse, SharedState};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use frontdesk_core::model::{now_iso, FaqEntry};
use serde_json::{json, Value};

const PAGE_SIZE: usize = 200;

/// `GET /faqs` — all entries, question order.
pub async fn list_faqs(State(state): State<SharedState>, headers: HeaderMap) -> ApiResponse {
    let client = client_id(&state, &headers);
    let mut items = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let (page, next) = match state
            .store
            .page_faqs(&client, PAGE_SIZE, cursor.as_deref())
            .await
        {
            Ok(r) => r,
            Err(e) => return store_error_response(&e),
        };
        items.extend(page);
        cursor = next;
        if cursor.is_none() {
            break;
        }
    }

    ok(json!({"items": items}))
}

/// `POST /faq` — body `{"question": ..., "answer": ...}`.
pub async fn create_faq(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> ApiResponse {
    let client = client_id(&state, &headers);
    let question = body.get("question").and_then(Value::as_str).unwrap_or_default();
    let answer = body.get("answer").and_then(Value::as_str).unwrap_or_default();
    if question.is_empty() || answer.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "question and answer required");
    }

    let ts = now_iso();
    let entry = FaqEntry {
        question: question.to_string(),
        answer: answer.to_string(),
        created_at: Some(ts.clone()),
        updated_at: Some(ts),
    };

    match state.store.create_faq(&client, &entry).await {
        Ok(()) => ok(json!({"item": entry})),
        Err(e) => store_error_response(&e),
    }
}

/// `GET /faq/{question}`
pub async fn get_faq(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(question): Path<String>,
) -> ApiResponse {
    let client = client_id(&state, &headers);
    match state.store.get_faq(&client, &question).await {
        Ok(entry) => ok(json!({"item": entry})),
        Err(e) => store_error_response(&e),
    }
}

/// `PUT /faq/{question}` — body `{"answer": ...}`.
pub async fn update_faq(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(question): Path<String>,
    Json(body): Json<Value>,
) -> ApiResponse {
    let client = client_id(&state, &headers);
    let answer = match body.get("answer").and_then(Value::as_str) {
        Some(a) if !a.is_empty() => a,
        _ => return error_response(StatusCode::BAD_REQUEST, "answer required"),
    };

    match state
        .store
        .update_faq_answer(&client, &question, answer, &now_iso())
        .await
    {
        Ok(entry) => ok(json!({"item": entry})),
        Err(e) => store_error_response(&e),
    }
}

/// `DELETE /faq/{question}`
pub async fn delete_faq(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(question): Path<String>,
) -> ApiResponse {
    let client = client_id(&state, &headers);
    match state.store.delete_faq(&client, &question).await {
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

    fn post(body: &str) -> Request<Body> {
        Request::post("/faq")
            .header("content-type", "application/json")
            .header("x-client-id", "t1")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(path: &str) -> Request<Body> {
        Request::get(path)
            .header("x-client-id", "t1")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn create_and_list() {
        let (router, _) = router_with(Some("ok"));
        let response = router
            .clone()
            .oneshot(post(r#"{"question":"営業時間は？","answer":"9時から18時"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let response = router.oneshot(get("/faqs")).await.unwrap();
        let body = body_json(response).await;
        let items = body["items"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["question"], "営業時間は？");
        assert!(items[0]["created_at"].is_string());
    }

    #[tokio::test]
    async fn missing_fields_rejected() {
        let (router, _) = router_with(Some("ok"));
        let response = router
            .oneshot(post(r#"{"question":"q"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), 400);
        let body = body_json(response).await;
        assert_eq!(body["error"], "question and answer required");
    }

    #[tokio::test]
    async fn duplicate_question_is_409() {
        let (router, _) = router_with(Some("ok"));
        router
            .clone()
            .oneshot(post(r#"{"question":"q","answer":"a"}"#))
            .await
            .unwrap();
        let response = router
            .oneshot(post(r#"{"question":"q","answer":"b"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), 409);
    }

    #[tokio::test]
    async fn update_answer_roundtrip() {
        let (router, _) = router_with(Some("ok"));
        router
            .clone()
            .oneshot(post(r#"{"question":"q","answer":"old"}"#))
            .await
            .unwrap();

        let response = router
            .clone()
            .oneshot(
                Request::put("/faq/q")
                    .header("content-type", "application/json")
                    .header("x-client-id", "t1")
                    .body(Body::from(r#"{"answer":"new"}"#.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let body = body_json(response).await;
        assert_eq!(body["item"]["answer"], "new");
    }

    #[tokio::test]
    async fn get_and_delete_missing_are_404() {
        let (router, _) = router_with(Some("ok"));
        let response = router.clone().oneshot(get("/faq/ghost")).await.unwrap();
        assert_eq!(response.status(), 404);

        let response = router
            .oneshot(
                Request::delete("/faq/ghost")
                    .header("x-client-id", "t1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), 404);
    }
}
