//! One fetch-analyze-reconcile-execute trading cycle

use crate::config::{Config, EngineConfig, ExchangeConfig};
use crate::core::notifier::Notifier;
use crate::core::scheduler::CycleRunner;
use crate::error::{ConfigError, EngineError};
use crate::execution::{plan_intent, ExecutionGateway, PendingAction};
use crate::metrics::Metrics;
use crate::models::exchange::{Position, Ticker};
use crate::models::indicators::Candle;
use crate::models::prediction::{ForecastAnalysis, PredictionPoint};
use crate::models::report::{CycleOutcome, CycleReport, MarketSnapshot, PriceSummary};
use crate::models::signal::Signal;
use crate::models::strategy::StrategyParams;
use crate::prediction::{analyze_forecast, forecast_inputs, reconcile, Forecaster};
use crate::services::exchange::{fetch_candle_history, ExchangeClient};
use crate::strategies::StrategyEngine;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

/// Runtime on/off switch for order placement, shared with the status API
#[derive(Debug, Clone, Default)]
pub struct TradingSwitch(Arc<AtomicBool>);

impl TradingSwitch {
    pub fn new(enabled: bool) -> Self {
        Self(Arc::new(AtomicBool::new(enabled)))
    }

    pub fn is_enabled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn set(&self, enabled: bool) {
        self.0.store(enabled, Ordering::SeqCst);
    }
}

/// Dependencies and state of the trading cycle
pub struct TradingEngine {
    client: Arc<dyn ExchangeClient>,
    gateway: ExecutionGateway,
    forecaster: Option<Arc<dyn Forecaster>>,
    notifier: Arc<dyn Notifier>,
    metrics: Arc<Metrics>,
    strategy: StrategyEngine,
    exchange: ExchangeConfig,
    engine: EngineConfig,
    params: StrategyParams,
    bar_seconds: i64,
    trading: TradingSwitch,
    /// Last forecast, reused while a position is open
    cached_forecast: RwLock<Option<Vec<PredictionPoint>>>,
}

impl TradingEngine {
    pub fn new(
        config: &Config,
        client: Arc<dyn ExchangeClient>,
        forecaster: Option<Arc<dyn Forecaster>>,
        notifier: Arc<dyn Notifier>,
        metrics: Arc<Metrics>,
    ) -> Result<Self, ConfigError> {
        let bar_seconds = config.exchange.bar_seconds()?;
        Ok(Self {
            gateway: ExecutionGateway::new(client.clone(), &config.exchange.inst_id),
            client,
            forecaster,
            notifier,
            metrics,
            strategy: StrategyEngine::new(),
            exchange: config.exchange.clone(),
            engine: config.engine.clone(),
            params: config.strategy.clone(),
            bar_seconds,
            trading: TradingSwitch::new(config.engine.trading_enabled),
            cached_forecast: RwLock::new(None),
        })
    }

    pub fn trading_switch(&self) -> TradingSwitch {
        self.trading.clone()
    }

    pub fn gateway(&self) -> &ExecutionGateway {
        &self.gateway
    }

    /// Run one cycle and hand its report to the notifier
    pub async fn run_once(&self) -> Result<CycleReport, EngineError> {
        let started_at = Utc::now();
        let inst_id = self.exchange.inst_id.as_str();

        let balances = match self.client.balance().await {
            Ok(balance) => balance.details,
            Err(e) => {
                warn!(target: "engine", inst_id, error = %e, "balance unavailable");
                Vec::new()
            }
        };

        let ticker = self
            .client
            .ticker(inst_id)
            .await
            .map_err(|e| EngineError::MarketData(format!("ticker: {e}")))?;
        let last_price = ticker_last(&ticker)?;

        let candles = fetch_candle_history(
            self.client.as_ref(),
            inst_id,
            &self.exchange.bar,
            self.exchange.candle_limit,
            self.exchange.candle_pages,
        )
        .await
        .map_err(|e| EngineError::MarketData(format!("candles: {e}")))?;

        let positions = self.client.positions(inst_id).await;
        let signal = self.strategy.analyze_market(&candles, &self.params);
        debug!(
            target: "engine",
            candles = candles.len(),
            direction = %signal.direction,
            strength = signal.strength,
            "signal computed"
        );

        let snapshot = MarketSnapshot {
            inst_id: inst_id.to_string(),
            price: PriceSummary::from_ticker(&ticker),
            balances,
            positions: match &positions {
                Ok(positions) => positions.clone(),
                Err(e) => {
                    warn!(target: "engine", inst_id, error = %e, "positions unavailable");
                    Vec::new()
                }
            },
            candles,
        };

        let (forecast, outcome) = if !self.trading.is_enabled() {
            (None, CycleOutcome::TradingDisabled)
        } else if !signal.direction.is_actionable() {
            (None, CycleOutcome::NoSignal)
        } else {
            // Open position state must be known before any order decision
            let positions = positions.map_err(EngineError::Gateway)?;
            self.trade(&signal, last_price, &snapshot.candles, &positions)
                .await?
        };

        let report = CycleReport {
            started_at,
            snapshot,
            signal,
            forecast,
            outcome,
        };
        self.notifier.notify(&report);
        Ok(report)
    }

    async fn trade(
        &self,
        signal: &Signal,
        last_price: f64,
        candles: &[Candle],
        positions: &[Position],
    ) -> Result<(Option<ForecastAnalysis>, CycleOutcome), EngineError> {
        let inst_id = self.exchange.inst_id.as_str();
        let position_open = positions.iter().any(|p| p.is_open_for(inst_id));

        if !position_open || self.cached_forecast.read().await.is_none() {
            let fresh = self.refresh_forecast(candles).await;
            *self.cached_forecast.write().await = fresh;
        }

        let action = self
            .gateway
            .reconcile_pending(signal.direction, positions)
            .await?;

        match action {
            PendingAction::Submit => {}
            PendingAction::KeepExisting { ord_id } => {
                return Ok((None, CycleOutcome::PendingKept { ord_id }));
            }
            PendingAction::Cancel { ord_id } => {
                self.metrics.orders_cancelled_total.inc();
                return Ok((None, CycleOutcome::PendingCancelled { ord_id }));
            }
            PendingAction::PositionOpen => return Ok((None, CycleOutcome::PositionOpen)),
        }

        let analysis = {
            let cached = self.cached_forecast.read().await;
            cached.as_deref().and_then(analyze_forecast)
        };
        let Some(analysis) = analysis else {
            info!(target: "engine", inst_id, "no forecast available, skipping trade");
            return Ok((None, CycleOutcome::NoForecast));
        };

        let side = match reconcile(signal, &analysis) {
            Ok(side) => side,
            Err(veto) => {
                info!(target: "engine", inst_id, "trade vetoed: {veto}");
                return Ok((
                    Some(analysis),
                    CycleOutcome::Vetoed {
                        forecast: veto.forecast,
                        signal: veto.signal,
                    },
                ));
            }
        };

        let intent = plan_intent(side, last_price, &analysis, &self.params);
        let outcome = match self
            .gateway
            .execute(&intent, self.params.leverage, self.params.size_decimals)
            .await
        {
            Ok(executed) => {
                self.metrics.orders_submitted_total.inc();
                CycleOutcome::OrderSubmitted {
                    intent,
                    size: executed.size,
                    ack: executed.ack,
                }
            }
            Err(e) => {
                self.metrics.orders_rejected_total.inc();
                if e.is_declared_rejection() {
                    warn!(target: "engine", inst_id, error = %e, "order rejected by exchange");
                } else {
                    error!(target: "engine", inst_id, error = %e, "order not sent");
                }
                CycleOutcome::OrderRejected {
                    intent: Some(intent),
                    reason: e.to_string(),
                }
            }
        };
        Ok((Some(analysis), outcome))
    }

    /// `None` when no forecaster is configured or it fails or returns nothing
    async fn refresh_forecast(&self, candles: &[Candle]) -> Option<Vec<PredictionPoint>> {
        let forecaster = self.forecaster.as_ref()?;
        let inputs = forecast_inputs(candles, &self.engine.forecast_window, self.bar_seconds);
        if inputs.history.is_empty() {
            return None;
        }

        match forecaster
            .forecast(
                &inputs.history,
                &inputs.history_timestamps,
                &inputs.future_timestamps,
            )
            .await
        {
            Ok(points) if points.is_empty() => {
                warn!(target: "forecast", "forecaster returned no points");
                None
            }
            Ok(points) => Some(points),
            Err(e) => {
                warn!(target: "forecast", error = %e, "forecast failed");
                None
            }
        }
    }
}

fn ticker_last(ticker: &Ticker) -> Result<f64, EngineError> {
    match ticker.last {
        Some(last) if last > 0.0 => Ok(last),
        _ => Err(EngineError::MarketData(format!(
            "ticker for {} has no last price",
            ticker.inst_id
        ))),
    }
}

#[async_trait]
impl CycleRunner for TradingEngine {
    async fn run_cycle(&self) -> Result<(), EngineError> {
        self.run_once().await.map(|_| ())
    }
}
