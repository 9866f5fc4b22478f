use crate::models::exchange::OrderSide;
use crate::models::signal::SignalDirection;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One forecast bar; a forecast is strictly increasing in timestamp
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionPoint {
    pub timestamp: i64,
    pub predicted_open: f64,
    pub predicted_high: f64,
    pub predicted_low: f64,
    pub predicted_close: f64,
    #[serde(default)]
    pub predicted_volume: f64,
}

impl PredictionPoint {
    /// Point with every price field set to `close`
    pub fn at_close(timestamp: i64, close: f64) -> Self {
        Self {
            timestamp,
            predicted_open: close,
            predicted_high: close,
            predicted_low: close,
            predicted_close: close,
            predicted_volume: 0.0,
        }
    }
}

/// Directional bias of a forecast path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForecastDirection {
    Flat,
    Buy,
    Sell,
}

impl ForecastDirection {
    pub fn matches(&self, signal: SignalDirection) -> bool {
        matches!(
            (self, signal),
            (ForecastDirection::Buy, SignalDirection::Buy)
                | (ForecastDirection::Sell, SignalDirection::Sell)
        )
    }

    pub fn side(&self) -> Option<OrderSide> {
        match self {
            ForecastDirection::Buy => Some(OrderSide::Buy),
            ForecastDirection::Sell => Some(OrderSide::Sell),
            ForecastDirection::Flat => None,
        }
    }
}

impl fmt::Display for ForecastDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ForecastDirection::Flat => "flat",
            ForecastDirection::Buy => "buy",
            ForecastDirection::Sell => "sell",
        };
        f.write_str(label)
    }
}

/// Extremes and bias of a forecast path
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastAnalysis {
    pub direction: ForecastDirection,
    pub max_price: f64,
    pub max_timestamp: i64,
    pub min_price: f64,
    pub min_timestamp: i64,
    pub start_price: f64,
    pub end_price: f64,
}

/// A priced, risk-bounded order the engine intends to submit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeIntent {
    pub side: OrderSide,
    pub limit_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<f64>,
    pub position_ratio: f64,
}
