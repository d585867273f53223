//! Task types and lifecycle state machine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One request's execution record
///
/// Tasks are created at request entry, mutated only by the worker handling
/// that request, and read by the status-query and cancellation paths. They
/// live until process exit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    /// Unique identifier for the task
    #[serde(rename = "taskId")]
    pub id: String,

    /// Current lifecycle state
    pub state: TaskState,

    /// Aggregated response text (present once the task completed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,

    /// Optional context ID correlating related requests
    #[serde(rename = "contextId", skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,

    /// When the task was created
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    #[serde(rename = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Create a new task in the `submitted` state
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: TaskState::Submitted,
            result: None,
            context_id: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// Set the context ID
    pub fn with_context_id(mut self, context_id: impl Into<String>) -> Self {
        self.context_id = Some(context_id.into());
        self
    }

    /// Check if the task is in a terminal state
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}

/// Task lifecycle state
///
/// Lifecycle: `submitted → working → completed | failed`, with
/// `submitted | working → canceled` from an explicit cancel call.
/// Terminal states are final.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    /// Task has been received and is queued for processing
    Submitted,

    /// Task is currently being processed
    Working,

    /// Task completed successfully
    Completed,

    /// Task failed with an error
    Failed,

    /// Task was canceled by the client
    Canceled,
}

impl TaskState {
    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskState::Completed | TaskState::Failed | TaskState::Canceled
        )
    }

    /// Check whether the lifecycle permits moving to `next` from here.
    pub fn can_transition_to(&self, next: TaskState) -> bool {
        match self {
            TaskState::Submitted => matches!(
                next,
                TaskState::Working | TaskState::Canceled
            ),
            TaskState::Working => matches!(
                next,
                TaskState::Completed | TaskState::Failed | TaskState::Canceled
            ),
            _ => false,
        }
    }
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TaskState::Submitted => "submitted",
            TaskState::Working => "working",
            TaskState::Completed => "completed",
            TaskState::Failed => "failed",
            TaskState::Canceled => "canceled",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_creation() {
        let task = Task::new("task-123");
        assert_eq!(task.id, "task-123");
        assert_eq!(task.state, TaskState::Submitted);
        assert!(!task.is_terminal());
        assert!(task.result.is_none());
    }

    #[test]
    fn test_state_machine() {
        assert!(TaskState::Submitted.can_transition_to(TaskState::Working));
        assert!(TaskState::Submitted.can_transition_to(TaskState::Canceled));
        assert!(!TaskState::Submitted.can_transition_to(TaskState::Completed));

        assert!(TaskState::Working.can_transition_to(TaskState::Completed));
        assert!(TaskState::Working.can_transition_to(TaskState::Failed));
        assert!(TaskState::Working.can_transition_to(TaskState::Canceled));
        assert!(!TaskState::Working.can_transition_to(TaskState::Submitted));
    }

    #[test]
    fn test_terminal_states_are_final() {
        for terminal in [TaskState::Completed, TaskState::Failed, TaskState::Canceled] {
            assert!(terminal.is_terminal());
            for next in [
                TaskState::Submitted,
                TaskState::Working,
                TaskState::Completed,
                TaskState::Failed,
                TaskState::Canceled,
            ] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn test_task_serialization() {
        let task = Task::new("task-123").with_context_id("ctx-1");

        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["taskId"], "task-123");
        assert_eq!(json["state"], "submitted");
        assert_eq!(json["contextId"], "ctx-1");
        assert!(json.get("result").is_none());

        let deserialized: Task = serde_json::from_value(json).unwrap();
        assert_eq!(task.id, deserialized.id);
        assert_eq!(task.state, deserialized.state);
    }

    #[test]
    fn test_canceled_spelling_on_wire() {
        let json = serde_json::to_value(TaskState::Canceled).unwrap();
        assert_eq!(json, "canceled");
    }
}
