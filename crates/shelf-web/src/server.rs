//! HTTP server implementation.

use crate::routes;
use crate::state::AppState;
use anyhow::Context;
use shelf_core::ShelfConfig;
use shelf_store::Database;
use tokio::net::TcpListener;
use tokio::signal;

/// The Shelf web server.
pub struct ShelfServer {
    state: AppState,
}

impl ShelfServer {
    /// Create a new server over an open, migrated database.
    pub fn new(config: ShelfConfig, db: Database) -> Self {
        Self {
            state: AppState::new(config, db),
        }
    }

    /// Address the server binds to.
    pub fn bind_addr(&self) -> String {
        self.state.config().server.bind_addr()
    }

    /// Serve until Ctrl-C or SIGTERM.
    pub async fn run(self) -> anyhow::Result<()> {
        let addr = self.bind_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        tracing::info!(address = %addr, "Starting Shelf");

        let db = self.state.db().clone();
        match db.purge_expired_sessions().await {
            Ok(0) => {}
            Ok(purged) => tracing::info!(purged, "Removed expired sessions"),
            Err(err) => tracing::warn!(error = %err, "Could not purge expired sessions"),
        }

        let app = routes::create_router(self.state);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("server error")?;

        db.close().await;
        tracing::info!("Shelf stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C signal"),
        _ = terminate => tracing::info!("Received SIGTERM signal"),
    }

    tracing::info!("Shutting down gracefully...");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_server_creation() {
        let mut config = ShelfConfig::default();
        config.server.port = 9090;
        let server = ShelfServer::new(config, Database::in_memory().await.unwrap());
        assert_eq!(server.bind_addr(), "127.0.0.1:9090");
    }
}
