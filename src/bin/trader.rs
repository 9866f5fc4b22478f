//! Perptrader
//!
//! Runs the trading cycle on a fixed interval and serves the status API.

use dotenvy::dotenv;
use perptrader::config::Config;
use perptrader::core::http::{start_server, AppState};
use perptrader::core::notifier::{FanoutNotifier, LatestReportStore, LogNotifier, Notifier};
use perptrader::core::runtime::TradingEngine;
use perptrader::core::scheduler::CycleScheduler;
use perptrader::logging;
use perptrader::metrics::Metrics;
use perptrader::prediction::{Forecaster, RemoteForecaster};
use perptrader::services::exchange::ExchangeClient;
use perptrader::services::okx::OkxRestClient;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};

/// Time the in-flight cycle gets to finish on shutdown
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let config = Config::from_env()?;
    let env = perptrader::config::get_environment();
    info!("Starting Perptrader");
    info!(environment = %env, "Environment");
    info!(
        inst_id = %config.exchange.inst_id,
        bar = %config.exchange.bar,
        mode = ?config.strategy.strategy_mode,
        interval = config.engine.interval_seconds,
        trading_enabled = config.engine.trading_enabled,
        simulated = config.exchange.simulated_trading,
        "configuration loaded"
    );

    let metrics = Arc::new(Metrics::new()?);
    let client: Arc<dyn ExchangeClient> = Arc::new(OkxRestClient::new(&config.exchange)?);

    let forecaster: Option<Arc<dyn Forecaster>> = match &config.engine.forecast_url {
        Some(url) => {
            let timeout = Duration::from_secs(config.exchange.timeout_seconds.max(60));
            Some(Arc::new(RemoteForecaster::new(url, timeout)?))
        }
        None => {
            warn!("FORECAST_URL not set - trades will be skipped for lack of a forecast");
            None
        }
    };

    let reports = Arc::new(LatestReportStore::new());
    let notifier: Arc<dyn Notifier> = Arc::new(FanoutNotifier::new(vec![
        reports.clone() as Arc<dyn Notifier>,
        Arc::new(LogNotifier),
    ]));

    let engine = Arc::new(TradingEngine::new(
        &config,
        client,
        forecaster,
        notifier,
        metrics.clone(),
    )?);

    if engine.gateway().test_connection().await.is_err() {
        warn!("exchange connection check failed - cycles will keep retrying");
    }

    let scheduler = CycleScheduler::new(engine.clone(), metrics.clone(), config.engine.interval_seconds)?;
    scheduler.start().await;

    let state = AppState::new(metrics, reports, engine.trading_switch());
    let port = config.engine.port;
    let server = tokio::spawn(async move {
        if let Err(e) = start_server(state, port).await {
            error!(error = %e, "HTTP server failed");
        }
    });

    info!("Perptrader started, waiting for shutdown signal...");
    signal::ctrl_c().await?;

    info!("Shutting down...");
    scheduler.stop(SHUTDOWN_GRACE).await;
    server.abort();
    info!("Perptrader stopped");

    Ok(())
}
