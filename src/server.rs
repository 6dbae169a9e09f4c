//! HTTP server initialization and runtime setup.
//!
//! Connects the pool, applies migrations, starts the click worker and serves the router
//! until Ctrl+C.

use crate::config::{Config, DatabaseConfig};
use crate::domain::click_worker::run_click_worker;
use crate::domain::repositories::{ClickRepository, ShortLinkRepository, TokenRepository};
use crate::infrastructure::bounded::Bounded;
use crate::infrastructure::persistence::{
    PgClickRepository, PgShortLinkRepository, PgTokenRepository,
};
use crate::routes::app_router;
use crate::state::{AppState, Repositories};

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

async fn connect(config: &DatabaseConfig) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .max_lifetime(config.max_lifetime)
        .connect(&config.url)
        .await
        .context("Failed to connect to database")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Runs the HTTP server with the given configuration.
///
/// Every repository the request path uses is wrapped in [`Bounded`], so a stalled database
/// surfaces as `503` after `STORAGE_TIMEOUT_MS` instead of hanging requests.
///
/// # Errors
///
/// Returns an error if the database connection, migrations, bind or server fail.
pub async fn run(config: Config) -> Result<()> {
    let pool = connect(&config.database).await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to apply migrations")?;
    tracing::info!("Migrations applied");

    let pool = Arc::new(pool);
    let timeout = config.storage_timeout;

    let links: Arc<dyn ShortLinkRepository> = Arc::new(Bounded::new(
        Arc::new(PgShortLinkRepository::new(pool.clone())),
        timeout,
    ));
    let clicks: Arc<dyn ClickRepository> = Arc::new(Bounded::new(
        Arc::new(PgClickRepository::new(pool.clone())),
        timeout,
    ));
    let tokens: Arc<dyn TokenRepository> = Arc::new(Bounded::new(
        Arc::new(PgTokenRepository::new(pool.clone())),
        timeout,
    ));

    let (click_tx, click_rx) = mpsc::channel(config.click_queue_capacity);
    let worker = tokio::spawn(run_click_worker(click_rx, clicks.clone()));
    tracing::info!(capacity = config.click_queue_capacity, "Click worker started");

    let state = AppState::new(
        Repositories {
            links,
            clicks,
            tokens,
        },
        click_tx,
        config.base_url.clone(),
        config.token_signing_secret.clone(),
        config.behind_proxy,
    );

    let app = app_router(state, config.behind_proxy);

    let addr = config.listen_addr;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // The router, and with it every click sender, is gone; let the worker drain.
    if tokio::time::timeout(Duration::from_secs(5), worker)
        .await
        .is_err()
    {
        tracing::warn!("Click worker did not drain within 5s");
    }

    pool.close().await;
    tracing::info!("Server stopped");

    Ok(())
}
