//! Marketplace entry-point: loads settings, migrates the database and runs
//! the HTTP server until a shutdown signal arrives.

mod server;

use actix_web::web;
#[cfg(feature = "metrics")]
use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use color_eyre::eyre::{Context, Result, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use marketplace::inbound::http::health::HealthState;
use marketplace::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use server::{AppSettings, ServerConfig, build_outbound_adapters, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings =
        AppSettings::load().map_err(|err| eyre!("failed to load settings: {err}"))?;
    let mut config = ServerConfig::new(settings.bind_addr()?)
        .with_adapters(build_outbound_adapters(&settings)?);
    if let Some(pool_config) = settings.pool_config() {
        config = config.with_db_pool(connect(pool_config).await?);
    }
    #[cfg(feature = "metrics")]
    let config = config.with_metrics(make_metrics());

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    let handle = server.handle();
    actix_web::rt::spawn(async move {
        shutdown_signal().await;
        info!("shutdown requested; draining");
        health_state.begin_draining();
        handle.stop(true).await;
    });

    server.await.wrap_err("server terminated with an error")
}

/// Apply pending migrations, then open the async pool.
async fn connect(pool_config: PoolConfig) -> Result<DbPool> {
    let database_url = pool_config.database_url().to_owned();
    let applied = tokio::task::spawn_blocking(move || run_migrations(&database_url))
        .await
        .wrap_err("migration task panicked")??;
    info!(applied, "database migrations complete");
    DbPool::new(pool_config)
        .await
        .wrap_err("failed to build database pool")
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = terminate.recv() => {}
                }
                return;
            }
            Err(error) => warn!(%error, "SIGTERM handler unavailable"),
        }
    }
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(%error, "ctrl-c handler unavailable");
        std::future::pending::<()>().await;
    }
}

#[cfg(feature = "metrics")]
fn make_metrics() -> Option<PrometheusMetrics> {
    match PrometheusMetricsBuilder::new("marketplace")
        .endpoint("/metrics")
        .build()
    {
        Ok(metrics) => Some(metrics),
        Err(error) => {
            warn!(%error, "Prometheus metrics disabled");
            None
        }
    }
}
