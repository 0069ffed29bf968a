mod aggregator;
mod api;
mod catalog;
mod config;
mod storage;

use crate::api::AppState;
use crate::catalog::HttpCatalog;
use crate::config::AppConfig;
use crate::storage::ReviewStore;
use anyhow::Context;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    info!("🚀 Starting Book Review API Server");

    // Load configuration
    let config = AppConfig::load()?;
    info!("📋 Configuration loaded");
    info!("   - Catalog: {}", config.catalog.base_url);
    info!("   - Database: {}", config.storage.database_path.display());
    info!("   - Server: {}", config.bind_addr());

    // Initialize review storage
    info!("💾 Initializing review storage...");
    let review_store = ReviewStore::open(&config.storage.database_path)
        .context("Failed to open review database")?;
    info!("✅ Review storage ready ({} reviews)", review_store.count()?);

    // Initialize catalog client
    let catalog = HttpCatalog::new(&config.catalog.base_url, &config.catalog.user_agent)
        .context("Failed to build catalog client")?;

    let state = AppState {
        catalog: Arc::new(catalog),
        review_store,
    };

    let app = api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("🌐 Server listening on http://{}", addr);
    info!("");
    info!("📡 Available endpoints:");
    info!("   GET  /health                          - Health check");
    info!("   GET  /search?title=&page=             - Search catalog");
    info!("   GET  /search/{{id}}                     - Book by ID");
    info!("   GET  /top?n=                          - Top rated books");
    info!("   GET  /averageRatingPerMonth?bookId=   - Monthly average rating");
    info!("   POST /reviews                         - Submit review");
    info!("");
    info!("✨ Server is ready to accept requests!");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Server shutting down gracefully");

    Ok(())
}

/// Graceful shutdown handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("🛑 Shutdown signal received");
}
