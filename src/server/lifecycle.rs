//! Process-level start and stop
//!
//! Binds the listener, serves until a termination signal, then drains
//! in-flight requests before returning. Bind failures are fatal and carry
//! a descriptive message; there is no automatic port retry.

use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::engine::WorkflowEngine;
use crate::protocol::error::{DispatchError, DispatchResult};

use super::{router, ServerState};

/// Bind the configured address.
///
/// A port already in use maps to a descriptive [`DispatchError::Transport`].
pub async fn bind(config: &ServerConfig) -> DispatchResult<TcpListener> {
    let addr = config.bind_addr();
    TcpListener::bind(&addr).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::AddrInUse {
            DispatchError::Transport(format!(
                "port {} is already in use on {}",
                config.port, config.host
            ))
        } else {
            DispatchError::Transport(format!("failed to bind {addr}: {e}"))
        }
    })
}

/// Build the engine, bind the listener, and serve until shutdown.
pub async fn serve(config: ServerConfig, engine: Arc<dyn WorkflowEngine>) -> DispatchResult<()> {
    config.validate()?;
    let listener = bind(&config).await?;
    serve_on(listener, config, engine).await
}

/// Serve on an already-bound listener.
///
/// Split out so tests can bind an ephemeral port first.
pub async fn serve_on(
    listener: TcpListener,
    config: ServerConfig,
    engine: Arc<dyn WorkflowEngine>,
) -> DispatchResult<()> {
    engine
        .build()
        .await
        .map_err(|e| DispatchError::Config(format!("workflow engine build failed: {e}")))?;

    let addr = listener
        .local_addr()
        .map_err(|e| DispatchError::Transport(format!("listener address unavailable: {e}")))?;

    let state = ServerState::new(config, engine);
    tracing::info!(%addr, name = %state.config.name, "dispatcher listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| DispatchError::Transport(format!("server error: {e}")))?;

    tracing::info!("dispatcher stopped");
    Ok(())
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received, draining in-flight requests");
}
