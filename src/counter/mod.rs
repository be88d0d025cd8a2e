// SPDX-License-Identifier: GPL-3.0-only

//! Global capture counter service
//!
//! ```text
//! HTTP (axum) ──▶ CounterService ──▶ CountStore (memory | JSON file)
//! ```
//!
//! # Modules
//!
//! - [`store`]: key-value store trait and implementations
//! - [`service`]: get/increment over the fixed counter key
//! - [`http`]: routes, bearer check and CORS

pub mod http;
pub mod service;
pub mod store;

pub use service::CounterService;
pub use store::{CountStore, FileStore, MemoryStore, StoreError, StoreResult};

use crate::config::ServerConfig;
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// `{"count": n}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: u64,
}

/// `{"status": "ok"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// `{"error": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Open the store described by `config`: a JSON file when `store_path` is
/// set, otherwise in memory
pub fn open_store(config: &ServerConfig) -> AppResult<Arc<dyn CountStore>> {
    match &config.store_path {
        Some(path) => {
            let store = FileStore::open(path).map_err(|e| AppError::Storage(e.to_string()))?;
            Ok(Arc::new(store))
        }
        None => {
            info!("Using in-memory counter store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

/// Serve the counter API on `listener` until `shutdown` resolves
pub async fn serve_on<F>(
    listener: tokio::net::TcpListener,
    service: CounterService,
    config: &ServerConfig,
    shutdown: F,
) -> AppResult<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let app = http::router(service, config);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(AppError::from)
}

/// Bind `config.bind` and serve until Ctrl-C
pub async fn serve(config: &ServerConfig) -> AppResult<()> {
    let service = CounterService::new(open_store(config)?);
    let listener = tokio::net::TcpListener::bind(&config.bind).await?;

    info!(
        addr = %listener.local_addr()?,
        prefix = %http::normalize_prefix(&config.path_prefix),
        "Counter service listening"
    );

    serve_on(listener, service, config, async {
        let _ = tokio::signal::ctrl_c().await;
        info!("Shutting down counter service");
    })
    .await
}
