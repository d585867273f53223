//! Invocation core: event bus, task registry, and the engine adapter

pub mod adapter;
pub mod bus;
pub mod registry;

pub use adapter::{InvocationAdapter, RequestContext};
pub use bus::{ExecutionEvent, ExecutionEventBus};
pub use registry::TaskRegistry;
