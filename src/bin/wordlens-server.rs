//! wordlens Server Binary
//!
//! Loads the embedding table once and serves the explorer page over HTTP.

use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use wordlens::options::{ExplorerOptions, ModelOptions};
use wordlens::{load, Config, Explorer, Server};

/// wordlens Server - Word Embedding Explorer
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Bind address
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: String,

    /// Port number
    #[arg(short, long, default_value_t = 8501)]
    port: u16,

    #[command(flatten)]
    model: ModelOptions,

    #[command(flatten)]
    explorer: ExplorerOptions,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("wordlens=info".parse()?))
        .init();

    let args = Args::parse();

    let source = args.model.source();
    let store = tokio::task::spawn_blocking(move || load(&source))
        .await?
        .context("failed to load embedding table")?;

    let explorer = Explorer::new(Arc::new(store), args.explorer.config());
    let config = Config::default().with_bind(&args.bind).with_port(args.port);

    info!("Starting wordlens server on {}", config.addr());
    let server = Server::new(config, explorer);

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => info!("Shutting down"),
    }

    Ok(())
}
