//! Library Server - catalog REST API
//!
//! Serves the book, author and genre catalog behind bearer-token auth.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use library_server::{
    api,
    config::AppConfig,
    repository::{MemoryStore, PgStore, Store},
    services::{bootstrap, Services},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("library_server={},tower_http=debug", config.logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting Library Server v{}", env!("CARGO_PKG_VERSION"));

    let store = open_store(&config).await?;

    let services = Services::new(store, &config.auth);
    bootstrap::seed(&services, &config.seed)
        .await
        .context("Failed to seed default data")?;

    let addr = SocketAddr::new(
        config.server.host.parse().context("Invalid host address")?,
        config.server.port,
    );

    let state = AppState::new(config, services);
    let app = api::create_router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Connect to PostgreSQL and run migrations, or use the in-process store
async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn Store>> {
    if config.database.is_memory() {
        tracing::warn!("Using in-memory store; data is lost on shutdown");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("Database migrations completed");

    Ok(Arc::new(PgStore::new(pool)))
}
