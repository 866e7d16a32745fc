//! Reprint Tracker - tracking pixel web server.
//!
//! This binary:
//! - Serves campaign images (or the default image) on every GET path
//! - Records each served image as a Piwik pageview with campaign attribution
//! - Returns 503 without tracking when no image is available

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use reprint::{router, AppState, Config, PiwikTracker};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("reprint_tracker_starting");

    // Load configuration
    let config = Config::from_env();
    info!(
        port = config.port,
        piwik_url = %config.piwik_url,
        idsite = config.idsite,
        token_auth_configured = config.token_auth.is_some(),
        default_campaign = %config.default_campaign,
        image_extensions = ?config.image_extensions,
        image_dir = %config.image_dir.display(),
        tracker_timeout_ms = config.tracker_timeout_ms,
        trust_proxy_headers = config.trust_proxy_headers,
        "config_loaded"
    );

    if config.token_auth.is_none() {
        warn!("piwik_token_auth_not_configured");
    }
    if !config.image_dir.is_dir() {
        warn!(image_dir = %config.image_dir.display(), "image_dir_missing");
    }

    // Shared HTTP client for tracking requests
    let client = Client::builder()
        .connect_timeout(Duration::from_millis(config.tracker_timeout_ms))
        .build()
        .context("Failed to create HTTP client")?;

    let tracker = PiwikTracker::new(client, &config).context("Invalid PIWIK_URL")?;
    info!(endpoint = %tracker.endpoint(), "piwik_tracker_created");

    // Create application state
    let port = config.port;
    let state = AppState::new(config, Arc::new(tracker))
        .context("Failed to compile campaign filename pattern")?;

    let app = router(state);

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "web_server_listening");

    // Run server with graceful shutdown; peer addresses feed the visitor IP
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    info!("reprint_tracker_shutdown_complete");

    Ok(())
}

/// Create a future that completes when a shutdown signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("web_server_shutting_down");
}
