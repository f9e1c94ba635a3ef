//! Mock server setup.
//!
//! # Responsibilities
//! - Build the Axum router (`/insight/demo`, `/health`)
//! - Wire up request tracing
//! - Serve until the shutdown broadcast fires

use axum::{routing::get, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::MockServerConfig;
use crate::http::insight::insight_demo;
use crate::lifecycle::Shutdown;
use crate::payments::ReceiptSource;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<MockServerConfig>,
    pub receipts: ReceiptSource,
}

/// The mock x402 paywall server.
pub struct MockServer {
    router: Router,
    config: Arc<MockServerConfig>,
}

impl MockServer {
    /// Create a server; receipts are seeded from `config.rng_seed` when set.
    pub fn new(config: MockServerConfig) -> Self {
        let receipts = match config.rng_seed {
            Some(seed) => ReceiptSource::seeded(seed),
            None => ReceiptSource::from_entropy(),
        };
        Self::with_receipts(config, receipts)
    }

    /// Create a server drawing fake transaction hashes from `receipts`.
    pub fn with_receipts(config: MockServerConfig, receipts: ReceiptSource) -> Self {
        let config = Arc::new(config);
        let state = AppState {
            config: config.clone(),
            receipts,
        };
        Self {
            router: Self::build_router(state),
            config,
        }
    }

    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/insight/demo", get(insight_demo))
            .route("/health", get(health))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// Serve on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            network = %self.config.network,
            pay_to = %self.config.receiving_address,
            "MVD x402 server starting (mock-only)"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(Shutdown::wait(shutdown))
            .await?;

        tracing::info!("MVD x402 server stopped");
        Ok(())
    }
}

async fn health() -> &'static str {
    "ok"
}
