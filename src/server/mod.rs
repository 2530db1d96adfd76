//! Server Module
//!
//! TCP server for the web front end. Each connection gets its own task;
//! all of them share the read-only embedding store through the explorer.

mod config;
mod handler;

pub use config::Config;
pub use handler::{describe, parse_top_n, Handler};

use crate::explorer::Explorer;
use crate::metrics::Metrics;
use crate::protocol::HttpCodec;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::codec::Framed;
use tracing::{error, info};

/// Word embedding explorer server
pub struct Server {
    config: Config,
    explorer: Explorer,
    metrics: Arc<Metrics>,
}

impl Server {
    /// Create a new server with the given configuration
    pub fn new(config: Config, explorer: Explorer) -> Self {
        Self {
            config,
            explorer,
            metrics: Arc::new(Metrics::new()),
        }
    }

    /// Bind the configured address and serve forever
    pub async fn run(self) -> std::io::Result<()> {
        let addr = self.config.addr();
        let listener = TcpListener::bind(&addr).await?;
        self.serve(listener).await
    }

    /// Serve connections from an already bound listener
    pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        info!(
            "wordlens server listening on {} ({} words, dimension {})",
            listener.local_addr()?,
            self.explorer.store().len(),
            self.explorer.store().dimension()
        );

        loop {
            match listener.accept().await {
                Ok((socket, peer_addr)) => {
                    info!("New connection from {}", peer_addr);

                    let explorer = self.explorer.clone();
                    let metrics = self.metrics.clone();

                    tokio::spawn(async move {
                        let framed = Framed::new(socket, HttpCodec::new());
                        let handler = Handler::new(explorer, metrics);

                        if let Err(e) = handler.run(framed).await {
                            error!("Connection error from {}: {}", peer_addr, e);
                        }

                        info!("Connection closed: {}", peer_addr);
                    });
                }
                Err(e) => {
                    error!("Accept error: {}", e);
                }
            }
        }
    }

    /// Get metrics reference
    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explorer::ExplorerConfig;
    use crate::vector::EmbeddingStore;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    #[tokio::test]
    async fn test_serves_health_over_tcp() {
        let store = EmbeddingStore::from_pairs(
            2,
            vec![("king", vec![1.0, 0.0]), ("queen", vec![0.9, 0.1])],
        )
        .unwrap();
        let explorer = Explorer::new(Arc::new(store), ExplorerConfig::default());
        let server = Server::new(Config::default().with_port(0), explorer);
        let metrics = server.metrics().clone();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(server.serve(listener));

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /health HTTP/1.1\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();

        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.ends_with(r#"{"status":"ok","vocabulary":2,"dimension":2}"#));
        assert_eq!(metrics.total_requests(), 1);
    }
}
