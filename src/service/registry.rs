//! In-memory task registry
//!
//! Maps task identifiers to task state for the life of the process. This is
//! the single shared synchronized resource; entries are only ever mutated by
//! the request that created them, plus the cancellation path. There is no
//! TTL or eviction.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use uuid::Uuid;

use crate::protocol::error::{DispatchError, DispatchResult};
use crate::protocol::task::{Task, TaskState};
use crate::service::bus::{ExecutionEvent, ExecutionEventBus};

struct TaskEntry {
    task: Task,
    bus: Option<Arc<ExecutionEventBus>>,
}

/// Process-lifetime store of task records
///
/// All operations take the internal lock briefly; the lock is never held
/// across an engine call.
#[derive(Default)]
pub struct TaskRegistry {
    tasks: Mutex<HashMap<String, TaskEntry>>,
}

impl TaskRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn locked(&self) -> MutexGuard<'_, HashMap<String, TaskEntry>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create a task in the `submitted` state and return it.
    pub fn create(&self, context_id: Option<String>) -> Task {
        let mut task = Task::new(generate_task_id());
        if let Some(context_id) = context_id {
            task = task.with_context_id(context_id);
        }

        self.locked().insert(
            task.id.clone(),
            TaskEntry {
                task: task.clone(),
                bus: None,
            },
        );
        task
    }

    /// Look up a task by id.
    pub fn get(&self, task_id: &str) -> Option<Task> {
        self.locked().get(task_id).map(|entry| entry.task.clone())
    }

    /// Associate the invocation's event bus with a task so cancellation can
    /// signal it.
    pub fn attach_bus(&self, task_id: &str, bus: Arc<ExecutionEventBus>) {
        if let Some(entry) = self.locked().get_mut(task_id) {
            entry.bus = Some(bus);
        }
    }

    /// Move a task to `next`, enforcing the lifecycle state machine.
    pub fn transition(&self, task_id: &str, next: TaskState) -> DispatchResult<Task> {
        let mut tasks = self.locked();
        let entry = tasks
            .get_mut(task_id)
            .ok_or_else(|| DispatchError::NotFound(format!("task {task_id}")))?;

        let current = entry.task.state;
        if !current.can_transition_to(next) {
            return Err(DispatchError::Validation(format!(
                "task {task_id} cannot transition from {current} to {next}"
            )));
        }

        entry.task.state = next;
        entry.task.updated_at = Some(Utc::now());
        Ok(entry.task.clone())
    }

    /// Transition a task to `completed` and record its result text.
    pub fn complete(&self, task_id: &str, result: impl Into<String>) -> DispatchResult<Task> {
        let mut tasks = self.locked();
        let entry = tasks
            .get_mut(task_id)
            .ok_or_else(|| DispatchError::NotFound(format!("task {task_id}")))?;

        let current = entry.task.state;
        if !current.can_transition_to(TaskState::Completed) {
            return Err(DispatchError::Validation(format!(
                "task {task_id} cannot transition from {current} to completed"
            )));
        }

        entry.task.state = TaskState::Completed;
        entry.task.result = Some(result.into());
        entry.task.updated_at = Some(Utc::now());
        Ok(entry.task.clone())
    }

    /// Transition a task to `failed`.
    pub fn fail(&self, task_id: &str) -> DispatchResult<Task> {
        self.transition(task_id, TaskState::Failed)
    }

    /// Cancel a task.
    ///
    /// Marks the task `canceled` and signals completion on its bus if one is
    /// attached. In-flight engine work is not interrupted; engines observe
    /// cancellation cooperatively.
    pub fn cancel(&self, task_id: &str) -> DispatchResult<Task> {
        let (task, bus) = {
            let mut tasks = self.locked();
            let entry = tasks
                .get_mut(task_id)
                .ok_or_else(|| DispatchError::NotFound(format!("task {task_id}")))?;

            if entry.task.state.is_terminal() {
                return Err(DispatchError::Validation(format!(
                    "task {task_id} is already {}",
                    entry.task.state
                )));
            }

            entry.task.state = TaskState::Canceled;
            entry.task.updated_at = Some(Utc::now());
            (entry.task.clone(), entry.bus.clone())
        };

        if let Some(bus) = bus {
            bus.publish(ExecutionEvent::StatusUpdate(TaskState::Canceled));
            bus.finish();
        }

        tracing::info!(task_id, "task canceled");
        Ok(task)
    }
}

/// Generate a collision-resistant task identifier:
/// `task-{epochMillis}-{randomAlnum(9)}`.
fn generate_task_id() -> String {
    format!(
        "task-{}-{}",
        Utc::now().timestamp_millis(),
        random_suffix()
    )
}

fn random_suffix() -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut n = Uuid::new_v4().as_u128();
    let mut out = String::with_capacity(9);
    for _ in 0..9 {
        out.push(ALPHABET[(n % 36) as usize] as char);
        n /= 36;
    }
    out
}
