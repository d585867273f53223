//! Per-invocation execution event bus
//!
//! The engine publishes progress events here; the dispatcher waits for the
//! finish signal and then reads the accumulated response text. One bus per
//! invocation, never shared or reused across requests.

use std::sync::{Mutex, PoisonError};

use tokio::sync::watch;

use crate::protocol::message::{Message, Role};
use crate::protocol::task::TaskState;

/// An event published by the engine during one invocation
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionEvent {
    /// A message produced during execution. Only agent-role messages
    /// contribute to the aggregated response text.
    Message(Message),

    /// A task state change notification. Ignored by text aggregation.
    StatusUpdate(TaskState),
}

#[derive(Debug, Default)]
struct BusState {
    events: Vec<ExecutionEvent>,
    finished: bool,
}

/// Event sink for a single engine invocation
///
/// `publish` never blocks the engine; events are buffered without limit (an
/// accepted risk for very chatty engines). `finish` signals that no more
/// events will arrive; the signal tolerates a second call because the cancel
/// path may race the engine's own finish.
#[derive(Debug)]
pub struct ExecutionEventBus {
    state: Mutex<BusState>,
    done_tx: watch::Sender<bool>,
}

impl ExecutionEventBus {
    /// Create a bus for one invocation.
    pub fn new() -> Self {
        let (done_tx, _) = watch::channel(false);
        Self {
            state: Mutex::new(BusState::default()),
            done_tx,
        }
    }

    fn locked(&self) -> std::sync::MutexGuard<'_, BusState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append an event in publish order.
    ///
    /// Events arriving after the finish signal are dropped.
    pub fn publish(&self, event: ExecutionEvent) {
        let mut state = self.locked();
        if state.finished {
            tracing::debug!("dropping event published after finish");
            return;
        }
        state.events.push(event);
    }

    /// Signal that no more events will be published.
    pub fn finish(&self) {
        let mut state = self.locked();
        if state.finished {
            return;
        }
        state.finished = true;
        drop(state);
        self.done_tx.send_replace(true);
    }

    /// Whether the finish signal has been raised.
    pub fn is_finished(&self) -> bool {
        self.locked().finished
    }

    /// Wait until the finish signal is raised. Resolves immediately if it
    /// already was. This is a suspension, not a poll loop.
    pub async fn finished(&self) {
        let mut rx = self.done_tx.subscribe();
        if *rx.borrow() {
            return;
        }
        // The channel is never dropped while `self` is alive.
        let _ = rx.changed().await;
    }

    /// The aggregated response text: every agent-message event's text parts,
    /// in publish order, joined by a single space. Empty when nothing
    /// qualifying was published.
    pub fn response(&self) -> String {
        let state = self.locked();
        let mut chunks: Vec<String> = Vec::new();
        for event in &state.events {
            if let ExecutionEvent::Message(message) = event {
                if message.role == Role::Agent {
                    for part in &message.parts {
                        if let Some(text) = part.as_text() {
                            chunks.push(text.to_string());
                        }
                    }
                }
            }
        }
        chunks.join(" ")
    }
}

impl Default for ExecutionEventBus {
    fn default() -> Self {
        Self::new()
    }
}
