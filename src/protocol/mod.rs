//! Core protocol types and definitions

pub mod agent;
pub mod error;
pub mod message;
pub mod task;

pub use agent::{AgentCapabilities, AgentCard, AgentCardOverride, AgentSkill};
pub use error::{DispatchError, DispatchResult};
pub use message::{FileContent, Message, Part, Role};
pub use task::{Task, TaskState};
