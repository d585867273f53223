//! JSON-RPC 2.0 endpoint
//!
//! The envelope is parsed by hand from the raw body so the caller's `id`
//! can be echoed on every response, including malformed requests. Error
//! responses never carry a `result` member and vice versa.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use bytes::Bytes;
use serde_json::{json, Value};

use crate::protocol::error::{CODE_INVALID_PARAMS, CODE_METHOD_NOT_FOUND, CODE_PARSE_ERROR};
use crate::protocol::message::Message;
use crate::service::RequestContext;

use super::ServerState;

/// `POST /` — the JSON-RPC 2.0 method table.
pub async fn handle_rpc(State(state): State<ServerState>, body: Bytes) -> Json<Value> {
    let raw: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(e) => {
            // No id is recoverable from an unparseable body.
            return Json(error_envelope(
                Value::Null,
                CODE_PARSE_ERROR,
                format!("Parse error: {e}"),
            ));
        }
    };

    let id = raw.get("id").cloned().unwrap_or(Value::Null);
    let method = raw.get("method").and_then(Value::as_str).unwrap_or_default();

    tracing::debug!(method, "json-rpc request");

    let envelope = match method {
        "message/send" => handle_send_message(&state, &raw, id).await,
        "agent/getAuthenticatedExtendedCard" => ok_envelope(id, json!(&*state.card)),
        other => error_envelope(
            id,
            CODE_METHOD_NOT_FOUND,
            format!("Method not found: {other}"),
        ),
    };

    Json(envelope)
}

async fn handle_send_message(state: &ServerState, raw: &Value, id: Value) -> Value {
    let params = raw.get("params").cloned().unwrap_or(Value::Null);

    let message_value = match params.get("message") {
        Some(value) if !value.is_null() => value.clone(),
        _ => {
            return error_envelope(
                id,
                CODE_INVALID_PARAMS,
                "Invalid params: message is required",
            )
        }
    };

    let message: Message = match serde_json::from_value(message_value) {
        Ok(message) => message,
        Err(e) => {
            return error_envelope(id, CODE_INVALID_PARAMS, format!("Invalid params: {e}"));
        }
    };

    let context_id = params
        .get("contextId")
        .and_then(Value::as_str)
        .map(str::to_string);

    let task = state.registry.create(context_id.clone());
    let ctx = RequestContext::new(task.id.clone(), context_id, message);
    let thread_id = ctx.context_id.clone();

    match state.adapter.invoke(ctx, Arc::clone(&state.engine)).await {
        Ok(text) => ok_envelope(
            id,
            json!({
                "taskId": task.id,
                "result": text,
                "thread_id": thread_id,
            }),
        ),
        Err(e) => error_envelope(id, e.jsonrpc_code(), e.to_string()),
    }
}

fn ok_envelope(id: Value, result: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result,
    })
}

fn error_envelope(id: Value, code: i32, message: impl Into<String>) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {
            "code": code,
            "message": message.into(),
        },
    })
}
