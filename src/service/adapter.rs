//! Invocation adapter
//!
//! Translates a protocol-agnostic request into the engine's input shape,
//! drives the engine through a fresh event bus, and resolves the engine's
//! output into a single response string.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::engine::{EngineInput, RunConfig, WorkflowEngine};
use crate::protocol::error::{DispatchError, DispatchResult};
use crate::protocol::message::Message;
use crate::protocol::task::TaskState;
use crate::service::bus::{ExecutionEvent, ExecutionEventBus};
use crate::service::registry::TaskRegistry;

/// Protocol-agnostic view of one inbound request
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// The task created for this request
    pub task_id: String,

    /// Session/thread key for the engine. Stable across calls belonging to
    /// the same conversation.
    pub context_id: String,

    /// The caller's message
    pub user_message: Message,
}

impl RequestContext {
    /// Build a context; `context_id` defaults to the task id when the
    /// caller supplied none.
    pub fn new(
        task_id: impl Into<String>,
        context_id: Option<String>,
        user_message: Message,
    ) -> Self {
        let task_id = task_id.into();
        let context_id = context_id.unwrap_or_else(|| task_id.clone());
        Self {
            task_id,
            context_id,
            user_message,
        }
    }
}

/// Drives one engine invocation per request
///
/// The adapter owns no per-request state; each call creates a fresh bus and
/// works against the shared registry. The registry lock is never held across
/// the engine call.
pub struct InvocationAdapter {
    registry: Arc<TaskRegistry>,
    timeout: Option<Duration>,
}

impl InvocationAdapter {
    /// Create an adapter with no deadline.
    pub fn new(registry: Arc<TaskRegistry>) -> Self {
        Self {
            registry,
            timeout: None,
        }
    }

    /// Enforce a per-invocation deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Run the engine for one request and return the aggregated response
    /// text.
    ///
    /// Empty input text passes through untouched; whether empty input is an
    /// error is the engine's call. Engine failures become
    /// [`DispatchError::ExecutionFailed`]; there is no retry.
    pub async fn invoke(
        &self,
        ctx: RequestContext,
        engine: Arc<dyn WorkflowEngine>,
    ) -> DispatchResult<String> {
        let text = ctx.user_message.text_content();
        let input = EngineInput::from_text(text);
        let run = RunConfig::for_thread(&ctx.context_id);

        let bus = Arc::new(ExecutionEventBus::new());
        self.registry.attach_bus(&ctx.task_id, bus.clone());
        self.registry.transition(&ctx.task_id, TaskState::Working)?;

        tracing::debug!(task_id = %ctx.task_id, context_id = %ctx.context_id, "invoking engine");

        let handle = tokio::spawn({
            let engine = Arc::clone(&engine);
            let bus = Arc::clone(&bus);
            async move { engine.invoke(input, run, bus).await }
        });

        let driven = match self.timeout {
            Some(deadline) => match tokio::time::timeout(deadline, drive(&bus, handle)).await {
                Ok(result) => result,
                Err(_) => {
                    // Abandon the engine task; its bus stops accepting events.
                    bus.finish();
                    if let Err(e) = self.registry.fail(&ctx.task_id) {
                        tracing::debug!(task_id = %ctx.task_id, error = %e, "timeout after terminal state");
                    }
                    tracing::warn!(task_id = %ctx.task_id, "engine invocation timed out");
                    return Err(DispatchError::Timeout);
                }
            },
            None => drive(&bus, handle).await,
        };

        let response = bus.response();

        match driven {
            Ok(()) => {
                if let Err(e) = self.registry.complete(&ctx.task_id, response.clone()) {
                    // A cancel that raced the engine leaves the task terminal;
                    // the caller still receives the drained text.
                    tracing::debug!(task_id = %ctx.task_id, error = %e, "task not completed");
                }
                Ok(response)
            }
            Err(e) => {
                if let Err(fail_err) = self.registry.fail(&ctx.task_id) {
                    tracing::debug!(task_id = %ctx.task_id, error = %fail_err, "task not failed");
                }
                tracing::warn!(task_id = %ctx.task_id, error = %e, "engine invocation failed");
                Err(e)
            }
        }
    }
}

/// Wait for the invocation to settle: either the engine returns, or the bus
/// is finished out from under it (cancellation).
async fn drive(
    bus: &Arc<ExecutionEventBus>,
    handle: tokio::task::JoinHandle<DispatchResult<Option<Value>>>,
) -> DispatchResult<()> {
    tokio::select! {
        joined = handle => match joined {
            Ok(Ok(Some(value))) => {
                let text = resolve_output(value);
                bus.publish(ExecutionEvent::Message(Message::agent(text)));
                bus.finish();
                Ok(())
            }
            Ok(Ok(None)) => {
                // The engine claims to have driven the bus itself.
                if !bus.is_finished() {
                    tracing::warn!("engine returned without finishing its event bus");
                    bus.finish();
                }
                Ok(())
            }
            Ok(Err(e)) => {
                bus.finish();
                Err(match e {
                    DispatchError::ExecutionFailed(_) | DispatchError::Timeout => e,
                    other => DispatchError::ExecutionFailed(other.to_string()),
                })
            }
            Err(join_err) => {
                bus.finish();
                Err(DispatchError::ExecutionFailed(format!(
                    "engine task aborted: {join_err}"
                )))
            }
        },
        // Cancellation finished the bus early; the engine task is abandoned.
        _ = bus.finished() => Ok(()),
    }
}

/// Resolve an engine return value into response text.
///
/// A plain string is used verbatim. An object with an ordered `messages`
/// sequence contributes its last entry's `content` when that is a string.
/// Every other shape serializes to stable JSON, so results are never
/// silently dropped.
pub fn resolve_output(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Object(ref obj) => {
            if let Some(Value::Array(messages)) = obj.get("messages") {
                if let Some(Value::String(content)) =
                    messages.last().and_then(|last| last.get("content"))
                {
                    return content.clone();
                }
            }
            value.to_string()
        }
        other => other.to_string(),
    }
}
