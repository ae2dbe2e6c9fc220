use std::{net::SocketAddr, sync::Arc};

use anyhow::Result as AnyResult;
use creditline_gateway::{AppState, build_router};
use creditline_horizon::{HorizonConfig, HorizonPoller, LoggingEventHandler, SimulatedEventSource};
use creditline_platform::{ServiceConfig, connect_database, validate_schema};
use creditline_registry::InMemoryCreditLineRegistry;
use tokio::sync::watch;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> AnyResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| {
            "creditline_gateway=info,creditline_registry=info,creditline_horizon=info".to_string()
        }))
        .init();

    let config = ServiceConfig::from_env("0.0.0.0:3000")?;
    let horizon = HorizonConfig::from_env()?;

    if config.admin_api_key.is_none() {
        warn!("ADMIN_API_KEY is not set; admin endpoints will answer 503");
    }

    if let Some(database_url) = config.database_url.as_deref() {
        check_schema(database_url).await;
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let poller = if horizon.enabled {
        let source = Arc::new(SimulatedEventSource::new(horizon.horizon_url.clone()));
        let poller =
            HorizonPoller::new(horizon, source).with_handler(Arc::new(LoggingEventHandler));
        Some(tokio::spawn(poller.run(shutdown_rx)))
    } else {
        info!("horizon listener disabled");
        None
    };

    let registry = Arc::new(InMemoryCreditLineRegistry::new());
    let state = AppState::new(registry, config.admin_api_key.clone());
    let router = build_router(state);

    let addr: SocketAddr = config.http_addr.parse()?;
    info!("gateway listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = shutdown_tx.send(true);
    if let Some(handle) = poller {
        handle.await?;
    }

    Ok(())
}

/// The registry does not read the relational schema yet; a mismatch is
/// reported but does not stop the service.
async fn check_schema(database_url: &str) {
    let pool = match connect_database(database_url).await {
        Ok(pool) => pool,
        Err(err) => {
            error!("schema check skipped: {err:#}");
            return;
        }
    };

    match validate_schema(&pool).await {
        Ok(missing) if missing.is_empty() => info!("database schema validated"),
        Ok(missing) => warn!(?missing, "database schema is missing tables; run creditline-migrate"),
        Err(err) => error!("schema validation failed: {err:#}"),
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
