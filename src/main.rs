// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::net::SocketAddr;

use tokio::net::TcpListener;

use secret_stash::{
    api::router,
    config::{AppConfig, LOG_FORMAT_ENV},
    state::AppState,
    storage::StashDb,
};

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` overrides the default filter. Setting `LOG_FORMAT=json`
/// switches to newline-delimited JSON output for log shippers.
fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "secret_stash=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    match std::env::var(LOG_FORMAT_ENV) {
        Ok(format) if format == "json" => {
            registry.with(tracing_subscriber::fmt::layer().json()).init()
        }
        _ => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = AppConfig::from_env()?;
    std::fs::create_dir_all(&config.data_dir)?;
    let db = StashDb::open(&config.data_dir.join("stash.redb"))?;

    let state = AppState::new(config.clone(), db);
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(
        address = %addr,
        token_ttl_secs = config.token_ttl.as_secs(),
        rate_limit = config.rate_limit,
        "secret-stash listening (docs at /docs)"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}
