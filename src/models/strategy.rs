//! Strategy selection and risk parameters

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which indicator path drives the signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyMode {
    Rsi,
    MovingAverage,
}

/// User-controlled strategy and risk settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyParams {
    pub strategy_mode: StrategyMode,
    pub rsi_period: usize,
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
    pub ma_short_period: usize,
    pub ma_long_period: usize,
    pub leverage: u32,
    pub max_position_ratio: f64,
    pub stop_loss_ratio: f64,
    pub take_profit_ratio: f64,
    /// Decimal places the exchange accepts for order size
    pub size_decimals: u32,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            strategy_mode: StrategyMode::Rsi,
            rsi_period: 20,
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
            ma_short_period: 40,
            ma_long_period: 120,
            leverage: 1,
            max_position_ratio: 0.5,
            stop_loss_ratio: 0.02,
            take_profit_ratio: 0.04,
            size_decimals: 2,
        }
    }
}

impl StrategyParams {
    /// Load from a JSON file; absent fields keep their defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn rsi_params(&self) -> RsiParams {
        RsiParams {
            period: Some(self.rsi_period),
            overbought: Some(self.rsi_overbought),
            oversold: Some(self.rsi_oversold),
        }
    }

    pub fn ma_params(&self) -> MaParams {
        MaParams {
            short_period: Some(self.ma_short_period),
            long_period: Some(self.ma_long_period),
        }
    }
}

/// RSI strategy inputs; any missing field makes the strategy hold
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RsiParams {
    pub period: Option<usize>,
    pub overbought: Option<f64>,
    pub oversold: Option<f64>,
}

impl RsiParams {
    pub fn new(period: usize, overbought: f64, oversold: f64) -> Self {
        Self {
            period: Some(period),
            overbought: Some(overbought),
            oversold: Some(oversold),
        }
    }
}

/// Moving-average crossover inputs; any missing field makes the strategy hold
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaParams {
    pub short_period: Option<usize>,
    pub long_period: Option<usize>,
}

impl MaParams {
    pub fn new(short_period: usize, long_period: usize) -> Self {
        Self {
            short_period: Some(short_period),
            long_period: Some(long_period),
        }
    }
}
