//! Full trading cycles against the in-memory exchange

use crate::test_utils::{
    declining_candles, forecast_path, open_position, pending_order, trading_config, FakeExchange,
    FakeState, StubForecaster,
};
use perptrader::config::Config;
use perptrader::core::{LatestReportStore, TradingEngine};
use perptrader::error::EngineError;
use perptrader::metrics::Metrics;
use perptrader::models::exchange::OrderSide;
use perptrader::models::prediction::ForecastDirection;
use perptrader::models::report::CycleOutcome;
use perptrader::models::signal::SignalDirection;
use perptrader::prediction::Forecaster;
use std::sync::Arc;

struct Harness {
    exchange: Arc<FakeExchange>,
    forecaster: Arc<StubForecaster>,
    reports: Arc<LatestReportStore>,
    metrics: Arc<Metrics>,
    engine: TradingEngine,
}

fn harness_with(config: Config, state: FakeState, forecast: Option<Vec<f64>>) -> Harness {
    let exchange = Arc::new(FakeExchange::new(state));
    let forecaster = Arc::new(StubForecaster::new(
        forecast.as_deref().map(forecast_path).unwrap_or_default(),
    ));
    let reports = Arc::new(LatestReportStore::new());
    let metrics = Arc::new(Metrics::new().expect("metrics initialization"));
    let engine = TradingEngine::new(
        &config,
        exchange.clone(),
        forecast.is_some().then(|| forecaster.clone() as Arc<dyn Forecaster>),
        reports.clone(),
        metrics.clone(),
    )
    .expect("engine");
    Harness {
        exchange,
        forecaster,
        reports,
        metrics,
        engine,
    }
}

fn buy_market() -> FakeState {
    FakeState {
        candles: declining_candles(100),
        ..FakeState::default()
    }
}

fn harness(state: FakeState, forecast: Option<Vec<f64>>) -> Harness {
    harness_with(trading_config(), state, forecast)
}

#[tokio::test]
async fn agreeing_forecast_submits_priced_order() {
    let h = harness(buy_market(), Some(vec![90.0, 95.0, 100.0]));

    let report = h.engine.run_once().await.unwrap();
    assert_eq!(report.signal.direction, SignalDirection::Buy);
    assert_eq!(report.snapshot.candles.len(), 100);
    assert_eq!(report.snapshot.price.last, 100.0);
    assert_eq!(report.forecast.map(|f| f.direction), Some(ForecastDirection::Buy));

    match &report.outcome {
        CycleOutcome::OrderSubmitted { intent, size, ack } => {
            assert_eq!(intent.side, OrderSide::Buy);
            assert_eq!(intent.limit_price, 90.0);
            assert!((intent.take_profit.unwrap() - 93.6).abs() < 1e-9);
            assert!((intent.stop_loss.unwrap() - 88.2).abs() < 1e-9);
            assert_eq!(*size, 5.0);
            assert_eq!(ack.ord_id, "ord-1");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(h.exchange.placed().len(), 1);
    assert_eq!(h.metrics.orders_submitted_total.get(), 1);
    assert_eq!(h.forecaster.calls(), 1);
    assert!(h.reports.latest().is_some());
}

#[tokio::test]
async fn disabled_trading_only_reports() {
    let mut config = trading_config();
    config.engine.trading_enabled = false;
    let h = harness_with(config, buy_market(), Some(vec![90.0, 100.0]));

    let report = h.engine.run_once().await.unwrap();
    assert_eq!(report.outcome, CycleOutcome::TradingDisabled);
    assert_eq!(report.signal.direction, SignalDirection::Buy);
    assert!(h.exchange.placed().is_empty());
    assert!(!h.exchange.calls().contains(&"pending_orders".to_string()));
    assert_eq!(h.forecaster.calls(), 0);
    assert_eq!(h.reports.latest().unwrap().outcome, CycleOutcome::TradingDisabled);
}

#[tokio::test]
async fn switch_toggles_trading_between_cycles() {
    let mut config = trading_config();
    config.engine.trading_enabled = false;
    let h = harness_with(config, buy_market(), Some(vec![90.0, 100.0]));

    h.engine.trading_switch().set(true);
    let report = h.engine.run_once().await.unwrap();
    assert!(matches!(report.outcome, CycleOutcome::OrderSubmitted { .. }));
}

#[tokio::test]
async fn short_history_holds() {
    let h = harness(
        FakeState {
            candles: declining_candles(10),
            ..FakeState::default()
        },
        Some(vec![90.0, 100.0]),
    );

    let report = h.engine.run_once().await.unwrap();
    assert_eq!(report.signal.direction, SignalDirection::Hold);
    assert_eq!(report.outcome, CycleOutcome::NoSignal);
    assert!(h.exchange.placed().is_empty());
}

#[tokio::test]
async fn contradicting_forecast_vetoes_trade() {
    let h = harness(buy_market(), Some(vec![100.0, 95.0, 90.0]));

    let report = h.engine.run_once().await.unwrap();
    assert_eq!(
        report.outcome,
        CycleOutcome::Vetoed {
            forecast: ForecastDirection::Sell,
            signal: SignalDirection::Buy,
        }
    );
    assert!(report.forecast.is_some());
    assert!(h.exchange.placed().is_empty());
}

#[tokio::test]
async fn flat_forecast_vetoes_trade() {
    let h = harness(buy_market(), Some(vec![100.0, 100.5, 100.2]));

    let report = h.engine.run_once().await.unwrap();
    assert!(matches!(
        report.outcome,
        CycleOutcome::Vetoed {
            forecast: ForecastDirection::Flat,
            ..
        }
    ));
}

#[tokio::test]
async fn missing_forecaster_skips_trade() {
    let h = harness(buy_market(), None);

    let report = h.engine.run_once().await.unwrap();
    assert_eq!(report.outcome, CycleOutcome::NoForecast);
    assert!(report.forecast.is_none());
    assert!(h.exchange.placed().is_empty());
}

#[tokio::test]
async fn contradicting_pending_order_is_cancelled() {
    let h = harness(
        FakeState {
            pending: vec![pending_order("42", OrderSide::Sell)],
            ..buy_market()
        },
        Some(vec![90.0, 100.0]),
    );

    let report = h.engine.run_once().await.unwrap();
    assert_eq!(
        report.outcome,
        CycleOutcome::PendingCancelled {
            ord_id: "42".to_string()
        }
    );
    assert_eq!(h.exchange.cancelled(), vec!["42"]);
    assert!(h.exchange.placed().is_empty());
    assert_eq!(h.metrics.orders_cancelled_total.get(), 1);

    // The slot is free on the next cycle
    let report = h.engine.run_once().await.unwrap();
    assert!(matches!(report.outcome, CycleOutcome::OrderSubmitted { .. }));
}

#[tokio::test]
async fn matching_pending_order_is_kept() {
    let h = harness(
        FakeState {
            pending: vec![pending_order("43", OrderSide::Buy)],
            ..buy_market()
        },
        Some(vec![90.0, 100.0]),
    );

    let report = h.engine.run_once().await.unwrap();
    assert_eq!(
        report.outcome,
        CycleOutcome::PendingKept {
            ord_id: "43".to_string()
        }
    );
    assert!(h.exchange.placed().is_empty());
}

#[tokio::test]
async fn open_position_reuses_cached_forecast() {
    let h = harness(
        FakeState {
            positions: vec![open_position(2.0)],
            ..buy_market()
        },
        Some(vec![90.0, 100.0]),
    );

    let report = h.engine.run_once().await.unwrap();
    assert_eq!(report.outcome, CycleOutcome::PositionOpen);
    assert_eq!(h.forecaster.calls(), 1);

    h.engine.run_once().await.unwrap();
    assert_eq!(h.forecaster.calls(), 1);

    h.exchange.with(|state| state.positions.clear());
    let report = h.engine.run_once().await.unwrap();
    assert!(matches!(report.outcome, CycleOutcome::OrderSubmitted { .. }));
    assert_eq!(h.forecaster.calls(), 2);
}

#[tokio::test]
async fn exchange_rejection_is_reported_not_raised() {
    let h = harness(
        FakeState {
            place_rejection: Some(("51008".to_string(), "Insufficient balance".to_string())),
            ..buy_market()
        },
        Some(vec![90.0, 100.0]),
    );

    let report = h.engine.run_once().await.unwrap();
    match report.outcome {
        CycleOutcome::OrderRejected { intent, reason } => {
            assert!(intent.is_some());
            assert!(reason.contains("51008"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(h.metrics.orders_rejected_total.get(), 1);
}

#[tokio::test]
async fn ticker_failure_aborts_cycle_without_report() {
    let h = harness(
        FakeState {
            ticker_fails: true,
            ..buy_market()
        },
        Some(vec![90.0, 100.0]),
    );

    let err = h.engine.run_once().await.unwrap_err();
    assert!(matches!(err, EngineError::MarketData(_)));
    assert!(h.reports.latest().is_none());
    assert!(h.exchange.calls().iter().all(|c| c != "candles"));
}

#[tokio::test]
async fn missing_last_price_aborts_cycle() {
    let h = harness(
        FakeState {
            ticker_last: None,
            ..buy_market()
        },
        None,
    );
    assert!(matches!(
        h.engine.run_once().await,
        Err(EngineError::MarketData(_))
    ));
}

#[tokio::test]
async fn unknown_positions_block_trading() {
    let h = harness(
        FakeState {
            positions_fail: true,
            ..buy_market()
        },
        Some(vec![90.0, 100.0]),
    );

    let err = h.engine.run_once().await.unwrap_err();
    assert!(matches!(err, EngineError::Gateway(_)));
    assert!(h.exchange.placed().is_empty());
    assert!(h.reports.latest().is_none());
}

#[tokio::test]
async fn unknown_positions_still_report_when_not_trading() {
    let mut config = trading_config();
    config.engine.trading_enabled = false;
    let h = harness_with(
        config,
        FakeState {
            positions_fail: true,
            ..buy_market()
        },
        None,
    );

    let report = h.engine.run_once().await.unwrap();
    assert_eq!(report.outcome, CycleOutcome::TradingDisabled);
    assert!(report.snapshot.positions.is_empty());
}
