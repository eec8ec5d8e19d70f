//! Network server for RustDB
//!
//! Serves the HTTP frontend on a tokio runtime. Every request goes through
//! the shared [`Coordinator`], so HTTP clients and the shell see one
//! serialized history of statements.

pub mod http;

use std::future::Future;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use crate::coordinator::Coordinator;
use crate::error::{Error, Result};

/// Default server port
pub const DEFAULT_PORT: u16 = 8080;

/// Default snapshot file, relative to the working directory
pub const DEFAULT_SNAPSHOT_PATH: &str = "mydb.json";

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Snapshot file the database is loaded from and saved to
    pub snapshot_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
        }
    }
}

impl ServerConfig {
    /// Create a new server config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the host address
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the snapshot file
    pub fn snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = path.into();
        self
    }

    /// Get the bind address as a string
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Resolve the bind address; host names are looked up
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|e| {
                Error::Server(format!("invalid listen address {}: {}", self.bind_address(), e))
            })?
            .next()
            .ok_or_else(|| Error::Server(format!("{} resolves to no address", self.bind_address())))
    }
}

/// Bind the HTTP frontend without starting to serve.
///
/// Returns the bound address and a future that serves until `shutdown`
/// resolves, then flushes the snapshot one last time.
pub fn bind(
    coordinator: Arc<Coordinator>,
    config: &ServerConfig,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(SocketAddr, impl Future<Output = Result<()>>)> {
    let addr = config.socket_addr()?;
    let (bound, server) = warp::serve(http::filters(coordinator.clone()))
        .try_bind_with_graceful_shutdown(addr, shutdown)
        .map_err(|e| Error::Server(format!("failed to bind {}: {}", addr, e)))?;

    let serve = async move {
        server.await;
        info!("server stopped, flushing snapshot");
        coordinator.flush()
    };
    Ok((bound, serve))
}

/// Resolve once `signal` fires, e.g. `tokio::signal::ctrl_c()`.
///
/// If the signal cannot be listened for, never resolve: the server then
/// runs until the process is killed instead of stopping at once.
pub async fn shutdown_on(signal: impl Future<Output = std::io::Result<()>>) {
    match signal.await {
        Ok(()) => info!("shutdown signal received"),
        Err(e) => {
            error!(error = %e, "failed to listen for shutdown signal, graceful shutdown disabled");
            std::future::pending::<()>().await;
        }
    }
}

/// Serve until `shutdown` resolves
pub async fn run_server(
    coordinator: Arc<Coordinator>,
    config: &ServerConfig,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let (addr, serve) = bind(coordinator, config, shutdown)?;
    info!(address = %addr, "RustDB HTTP server listening, POST SQL to /query");
    serve.await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_server_config() {
        let config = ServerConfig::new()
            .host("0.0.0.0")
            .port(9000)
            .snapshot_path("/tmp/x.json");

        assert_eq!(config.bind_address(), "0.0.0.0:9000");
        assert_eq!(config.snapshot_path, PathBuf::from("/tmp/x.json"));
        assert_eq!(config.socket_addr().unwrap().port(), 9000);
    }

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.snapshot_path, PathBuf::from("mydb.json"));
    }

    #[test]
    fn test_invalid_host() {
        let config = ServerConfig::new().host("not a host name");
        assert!(matches!(config.socket_addr(), Err(Error::Server(_))));
    }

    #[tokio::test]
    async fn test_shutdown_on_signal() {
        let fired = shutdown_on(async { Ok(()) });
        assert!(tokio::time::timeout(Duration::from_secs(1), fired).await.is_ok());

        let broken = shutdown_on(async {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "no signal handler"))
        });
        assert!(tokio::time::timeout(Duration::from_millis(50), broken)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_shutdown_flushes_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        let coordinator = Arc::new(Coordinator::open(&path).unwrap());
        let config = ServerConfig::new().port(0);

        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let (addr, serve) = bind(coordinator, &config, async {
            rx.await.ok();
        })
        .unwrap();
        assert_ne!(addr.port(), 0);

        tx.send(()).unwrap();
        serve.await.unwrap();
        assert!(path.exists());
    }
}
