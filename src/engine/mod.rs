//! Workflow engine seam
//!
//! The dispatcher treats the engine as an opaque collaborator: `build` runs
//! once at startup, `invoke` once per request. Engines report output either
//! by returning a value or by publishing events to the per-invocation bus.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::protocol::error::DispatchResult;
use crate::service::bus::ExecutionEventBus;

/// Input handed to the engine for one invocation
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EngineInput {
    /// Conversation messages, oldest first
    pub messages: Vec<EngineMessage>,
}

impl EngineInput {
    /// Build the single-message input shape for one user utterance.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            messages: vec![EngineMessage {
                role: "user".to_string(),
                content: text.into(),
            }],
        }
    }
}

/// One entry in the engine's message sequence
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EngineMessage {
    pub role: String,
    pub content: String,
}

/// Per-invocation run configuration
///
/// Carries the session/thread key the engine uses to correlate multiple
/// requests into one conversation.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RunConfig {
    pub configurable: Configurable,
}

/// The `configurable` section of the run configuration
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Configurable {
    pub thread_id: String,
}

impl RunConfig {
    /// Run configuration for the given conversation thread.
    pub fn for_thread(thread_id: impl Into<String>) -> Self {
        Self {
            configurable: Configurable {
                thread_id: thread_id.into(),
            },
        }
    }
}

/// The contract a workflow execution engine exposes to the dispatcher
///
/// `invoke` supports two reporting styles:
/// - return `Ok(Some(value))` without touching the bus; the adapter wraps
///   the value as a single synthetic agent-message event, or
/// - publish events to `bus` as work progresses, call
///   [`ExecutionEventBus::finish`] exactly once, and return `Ok(None)`.
///
/// A returned value is either a plain string, a structure exposing an
/// ordered `messages` sequence whose last element carries textual `content`,
/// or any other shape (which the adapter serializes to stable JSON).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkflowEngine: Send + Sync + 'static {
    /// One-time graph construction. Failures here are fatal at startup.
    async fn build(&self) -> DispatchResult<()>;

    /// Execute one invocation.
    async fn invoke(
        &self,
        input: EngineInput,
        run: RunConfig,
        bus: Arc<ExecutionEventBus>,
    ) -> DispatchResult<Option<Value>>;
}

/// Trivial engine that replies with the input text.
///
/// Used by the reference binary and by wiring tests; real deployments plug
/// in their own [`WorkflowEngine`] implementation.
#[derive(Debug, Clone, Default)]
pub struct EchoEngine;

#[async_trait]
impl WorkflowEngine for EchoEngine {
    async fn build(&self) -> DispatchResult<()> {
        Ok(())
    }

    async fn invoke(
        &self,
        input: EngineInput,
        _run: RunConfig,
        _bus: Arc<ExecutionEventBus>,
    ) -> DispatchResult<Option<Value>> {
        let text = input
            .messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        Ok(Some(Value::String(text)))
    }
}
