use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV bar; `timestamp` is unix seconds of the bar open
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn new(open: f64, high: f64, low: f64, close: f64, volume: f64, timestamp: i64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }
}

/// Sort ascending by timestamp and drop duplicate timestamps (first occurrence wins)
pub fn normalize_candles(mut candles: Vec<Candle>) -> Vec<Candle> {
    candles.sort_by_key(|c| c.timestamp);
    candles.dedup_by_key(|c| c.timestamp);
    candles
}

/// Closing prices of a candle series
pub fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

/// Indicator output aligned index-for-index with its source series.
/// Entries stay `None` until the lookback window is satisfied.
pub type IndicatorSeries = Vec<Option<f64>>;

/// Last value of an indicator series, if defined
pub fn last_defined(series: &[Option<f64>]) -> Option<f64> {
    series.last().copied().flatten()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BollingerBands {
    pub upper: IndicatorSeries,
    pub middle: IndicatorSeries,
    pub lower: IndicatorSeries,
}

/// Indices of local highs and lows, both in ascending order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extremes {
    pub highs: Vec<usize>,
    pub lows: Vec<usize>,
}
