//! Per-cycle results handed to the presentation collaborator

use crate::common::math::round_to;
use crate::models::exchange::{BalanceDetail, OrderAck, Position, Ticker};
use crate::models::indicators::Candle;
use crate::models::prediction::{ForecastAnalysis, ForecastDirection, TradeIntent};
use crate::models::signal::{Signal, SignalDirection};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSummary {
    pub last: f64,
    pub change_24h_pct: f64,
    pub high_24h: f64,
    pub low_24h: f64,
    pub vol_24h: f64,
}

impl PriceSummary {
    pub fn from_ticker(ticker: &Ticker) -> Self {
        let last = ticker.last.unwrap_or(0.0);
        let sod = ticker.sod_utc8.unwrap_or(0.0);
        let change_24h_pct = if sod != 0.0 {
            round_to((last - sod) / sod * 100.0, 2)
        } else {
            0.0
        };
        Self {
            last,
            change_24h_pct,
            high_24h: ticker.high_24h.unwrap_or(0.0),
            low_24h: ticker.low_24h.unwrap_or(0.0),
            vol_24h: ticker.vol_24h.unwrap_or(0.0),
        }
    }
}

/// Raw market state observed at the start of a cycle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub inst_id: String,
    pub price: PriceSummary,
    pub balances: Vec<BalanceDetail>,
    pub positions: Vec<Position>,
    pub candles: Vec<Candle>,
}

/// What the cycle decided to do after the signal was computed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CycleOutcome {
    TradingDisabled,
    NoSignal,
    NoForecast,
    PositionOpen,
    Vetoed {
        forecast: ForecastDirection,
        signal: SignalDirection,
    },
    PendingKept {
        ord_id: String,
    },
    PendingCancelled {
        ord_id: String,
    },
    OrderSubmitted {
        intent: TradeIntent,
        size: f64,
        ack: OrderAck,
    },
    OrderRejected {
        #[serde(skip_serializing_if = "Option::is_none")]
        intent: Option<TradeIntent>,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub snapshot: MarketSnapshot,
    pub signal: Signal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forecast: Option<ForecastAnalysis>,
    pub outcome: CycleOutcome,
}
