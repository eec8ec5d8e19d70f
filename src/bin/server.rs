//! RustDB - HTTP server

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use rustdb::server::{run_server, shutdown_on, ServerConfig, DEFAULT_PORT, DEFAULT_SNAPSHOT_PATH};
use rustdb::Coordinator;

#[derive(Debug, Parser)]
#[clap(name = "rustdb-server", about = "Serve a RustDB database over HTTP")]
struct Args {
    /// Address to listen on
    #[clap(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[clap(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Snapshot file to load from and save to. The file is not locked: do
    /// not point a running shell at the same file.
    #[clap(short, long, default_value = DEFAULT_SNAPSHOT_PATH)]
    data: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = ServerConfig::new()
        .host(args.host)
        .port(args.port)
        .snapshot_path(args.data);

    let coordinator = Arc::new(
        Coordinator::open(&config.snapshot_path)
            .with_context(|| format!("failed to load {}", config.snapshot_path.display()))?,
    );

    let shutdown = shutdown_on(tokio::signal::ctrl_c());

    run_server(coordinator, &config, shutdown)
        .await
        .context("server error")?;
    Ok(())
}
