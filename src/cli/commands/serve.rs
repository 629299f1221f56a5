//! Implementation of the `attainment serve` command.

use anyhow::{Context, Result};

use crate::adapters::http::{AppState, AttainmentHttpServer, HttpConfig};
use crate::adapters::sqlite::{initialize_database, PoolConfig};
use crate::cli::ServeArgs;
use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::logging::LoggerImpl;

/// Apply command-line overrides on top of the loaded configuration.
pub fn apply_overrides(mut config: Config, args: &ServeArgs) -> Result<Config> {
    if let Some(host) = &args.host {
        config.server.host.clone_from(host);
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    ConfigLoader::validate(&config)?;
    Ok(config)
}

pub async fn execute(args: ServeArgs, config: Config, _json_mode: bool) -> Result<()> {
    let config = apply_overrides(config, &args)?;
    let _logger = LoggerImpl::init(&config.logging)?;

    let pool = initialize_database(&config.database.url(), Some(PoolConfig::from(&config.database)))
        .await
        .with_context(|| format!("Failed to initialize database at {}", config.database.path))?;

    tracing::info!(
        mapping_mode = config.propagation.mapping_mode.as_str(),
        high = config.weights.high,
        medium = config.weights.medium,
        low = config.weights.low,
        "propagation configured"
    );

    let state = AppState::from_pool(pool.clone(), config.weights, config.propagation.mapping_mode);
    let server = AttainmentHttpServer::new(state, HttpConfig::from(config.server));

    server
        .serve_with_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("HTTP server failed: {e}"))?;

    pool.close().await;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
