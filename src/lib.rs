//! # A2A Dispatch
//!
//! A front-line Agent2Agent (A2A) request dispatcher. It accepts
//! task-execution requests over two wire protocols — a JSON-RPC 2.0
//! envelope at the root and a REST-style surface beside it — normalizes
//! them into one internal invocation, drives an opaque workflow execution
//! engine to completion, and answers in the protocol the caller used.
//!
//! ## Features
//!
//! - **Dual protocol**: JSON-RPC 2.0 and REST over one HTTP listener
//! - **Engine agnostic**: any [`engine::WorkflowEngine`] implementation,
//!   reporting results by return value or by event publication
//! - **Task lifecycle**: per-request task records with advisory cancellation
//! - **Self-describing**: agent card discovery at `/.well-known/agent.json`
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use a2a_dispatch::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig {
//!         name: "echo-agent".to_string(),
//!         port: 5000,
//!         ..ServerConfig::default()
//!     };
//!
//!     a2a_dispatch::server::lifecycle::serve(config, Arc::new(EchoEngine)).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod engine;
pub mod protocol;
pub mod server;
pub mod service;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        config::ServerConfig,
        engine::{EchoEngine, EngineInput, RunConfig, WorkflowEngine},
        protocol::error::DispatchError,
        protocol::{AgentCard, Message, Part, Role, Task, TaskState},
        service::{ExecutionEvent, ExecutionEventBus, InvocationAdapter, TaskRegistry},
    };
}
