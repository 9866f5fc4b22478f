//! Shared data models spanning the engine layers.

pub mod exchange;
pub mod indicators;
pub mod prediction;
pub mod report;
pub mod signal;
pub mod strategy;

pub use exchange::{
    AccountBalance, AccountConfig, AmendRequest, AttachedAlgoOrder, BalanceDetail, MarginMode,
    MaxSize, OrderAck, OrderRequest, OrderSide, OrderType, PendingOrder, Position, Ticker,
};
pub use indicators::{BollingerBands, Candle, Extremes, IndicatorSeries};
pub use prediction::{ForecastAnalysis, ForecastDirection, PredictionPoint, TradeIntent};
pub use report::{CycleOutcome, CycleReport, MarketSnapshot, PriceSummary};
pub use signal::{DivergenceKind, Signal, SignalDiagnostics, SignalDirection};
pub use strategy::{MaParams, RsiParams, StrategyMode, StrategyParams};
