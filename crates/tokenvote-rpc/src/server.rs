//! HTTP server powered by axum.
//!
//! Binds a TCP listener and serves the router built in [`crate::routes`]
//! until the shutdown future resolves.

use std::future::Future;
use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info};

use tokenvote_core::TokenVoteService;

use crate::routes::build_router;

/// Errors from starting or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shared application state available to all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    pub service: TokenVoteService,
}

/// HTTP server for the tokenvote API.
#[derive(Debug)]
pub struct RpcServer {
    state: AppState,
    addr: SocketAddr,
}

impl RpcServer {
    pub fn new(service: TokenVoteService, addr: SocketAddr) -> Self {
        Self {
            state: AppState { service },
            addr,
        }
    }

    async fn bind(&self) -> Result<TcpListener, ServerError> {
        TcpListener::bind(self.addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: self.addr,
                source,
            })
    }

    /// Serve until `shutdown` resolves.
    pub async fn run<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = self.bind().await?;
        info!(listen = %listener.local_addr()?, "tokenvote listening");

        axum::serve(listener, build_router(self.state))
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("tokenvote server shut down");
        Ok(())
    }

    /// Bind and serve on a background task.
    ///
    /// Returns the bound address, which differs from the configured one when
    /// port `0` was requested.
    pub async fn spawn(self) -> Result<(SocketAddr, JoinHandle<()>), ServerError> {
        let listener = self.bind().await?;
        let local = listener.local_addr()?;
        let router = build_router(self.state);

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                error!("tokenvote server exited with error: {e}");
            }
        });

        info!(listen = %local, "tokenvote listening");
        Ok((local, handle))
    }
}

/// Resolves on Ctrl-C.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {e}");
    }
}
