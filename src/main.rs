use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use a2a_dispatch::config::ServerConfig;
use a2a_dispatch::engine::EchoEngine;
use a2a_dispatch::server::lifecycle;

/// A2A protocol dispatcher for workflow execution engines
#[derive(Parser, Debug)]
#[command(name = "a2a-dispatch", version, about)]
struct Args {
    /// Path to the JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run(Args::parse()).await {
        tracing::error!("fatal: {e:#}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };

    if let Some(port) = args.port {
        config.port = port;
    }

    lifecycle::serve(config, Arc::new(EchoEngine)).await?;
    Ok(())
}
