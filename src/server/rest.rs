//! REST surface
//!
//! Discovery, message dispatch, task queries, cancellation, and health.
//! The send route parses the body by hand so malformed input produces the
//! documented error bodies rather than extractor rejections.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::protocol::agent::AgentCard;
use crate::protocol::error::DispatchError;
use crate::protocol::message::Message;
use crate::protocol::task::Task;
use crate::service::RequestContext;

use super::ServerState;

/// `GET /.well-known/agent.json`
pub async fn handle_agent_card(State(state): State<ServerState>) -> Json<AgentCard> {
    Json((*state.card).clone())
}

/// `GET /health`
pub async fn handle_health(State(state): State<ServerState>) -> Json<Value> {
    Json(json!({
        "name": state.config.name,
        "status": "running",
        "protocolVersion": state.card.protocol_version,
        "uptime": state.uptime_secs(),
        "endpoints": [
            "POST /",
            "GET /.well-known/agent.json",
            "POST /message/send",
            "GET /tasks/{taskId}",
            "POST /tasks/{taskId}/cancel",
            "GET /health",
        ],
    }))
}

/// `POST /message/send`
pub async fn handle_send_message(State(state): State<ServerState>, body: Bytes) -> Response {
    let raw: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(_) => return invalid_format(),
    };

    // message.parts must be a non-empty ordered sequence
    let has_parts = raw
        .pointer("/message/parts")
        .and_then(Value::as_array)
        .is_some_and(|parts| !parts.is_empty());
    if !has_parts {
        return invalid_format();
    }

    let message: Message = match serde_json::from_value(raw["message"].clone()) {
        Ok(message) => message,
        Err(_) => return invalid_format(),
    };

    if message.text_content().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "No text content found in message"})),
        )
            .into_response();
    }

    let session_id = raw
        .get("sessionId")
        .and_then(Value::as_str)
        .map(str::to_string);

    let task = state.registry.create(session_id.clone());
    let ctx = RequestContext::new(task.id.clone(), session_id, message);

    match state.adapter.invoke(ctx, Arc::clone(&state.engine)).await {
        Ok(text) => Json(json!({
            "messageId": Uuid::now_v7().to_string(),
            "parts": [{"kind": "text", "text": text}],
        }))
        .into_response(),
        Err(e) => e.into_response(),
    }
}

/// `GET /tasks/{task_id}`
pub async fn handle_get_task(
    State(state): State<ServerState>,
    Path(task_id): Path<String>,
) -> Result<Json<Task>, DispatchError> {
    state
        .registry
        .get(&task_id)
        .map(Json)
        .ok_or_else(|| DispatchError::NotFound(format!("task {task_id}")))
}

/// `POST /tasks/{task_id}/cancel`
pub async fn handle_cancel_task(
    State(state): State<ServerState>,
    Path(task_id): Path<String>,
) -> Result<Json<Task>, DispatchError> {
    let task = state.registry.cancel(&task_id)?;
    Ok(Json(task))
}

/// Catch-all for unmatched routes.
pub async fn handle_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"error": "Not found"})),
    )
        .into_response()
}

fn invalid_format() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"error": "Invalid message format"})),
    )
        .into_response()
}
