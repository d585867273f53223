//! HTTP front door serving both wire protocols
//!
//! A single axum router exposes the JSON-RPC endpoint at the root and the
//! REST surface beside it. Named routes are matched before the JSON-RPC
//! root; everything else falls through to a JSON 404.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use crate::config::ServerConfig;
use crate::engine::WorkflowEngine;
use crate::protocol::agent::AgentCard;
use crate::protocol::error::DispatchError;
use crate::service::{InvocationAdapter, TaskRegistry};

pub mod jsonrpc;
pub mod lifecycle;
pub mod rest;

/// Shared state behind every route handler
#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<dyn WorkflowEngine>,
    pub registry: Arc<TaskRegistry>,
    pub adapter: Arc<InvocationAdapter>,
    pub card: Arc<AgentCard>,
    pub config: Arc<ServerConfig>,
    started_at: Instant,
}

impl ServerState {
    /// Wire up the dispatcher's shared components for one process.
    pub fn new(config: ServerConfig, engine: Arc<dyn WorkflowEngine>) -> Self {
        let registry = Arc::new(TaskRegistry::new());

        let mut adapter = InvocationAdapter::new(Arc::clone(&registry));
        if let Some(secs) = config.timeout_secs {
            adapter = adapter.with_timeout(Duration::from_secs(secs));
        }

        let card = Arc::new(AgentCard::build(&config, config.port));

        Self {
            engine,
            registry,
            adapter: Arc::new(adapter),
            card,
            config: Arc::new(config),
            started_at: Instant::now(),
        }
    }

    /// Seconds since this server state was created.
    pub fn uptime_secs(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }
}

/// Build the router serving both protocol surfaces.
pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/.well-known/agent.json", get(rest::handle_agent_card))
        .route("/health", get(rest::handle_health))
        .route("/message/send", post(rest::handle_send_message))
        .route("/tasks/{task_id}", get(rest::handle_get_task))
        .route("/tasks/{task_id}/cancel", post(rest::handle_cancel_task))
        .route("/", post(jsonrpc::handle_rpc))
        .fallback(rest::handle_not_found)
        .with_state(state)
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        let status = match self.http_status() {
            400 => StatusCode::BAD_REQUEST,
            404 => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(json!({
            "error": self.kind(),
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}
