use crate::config::ForecastWindow;
use crate::error::ForecastError;
use crate::models::indicators::Candle;
use crate::models::prediction::PredictionPoint;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Opaque price-path model: history in, one predicted bar per future timestamp out
#[async_trait]
pub trait Forecaster: Send + Sync {
    async fn forecast(
        &self,
        history: &[Candle],
        history_timestamps: &[i64],
        future_timestamps: &[i64],
    ) -> Result<Vec<PredictionPoint>, ForecastError>;
}

/// History window and timestamps handed to a [`Forecaster`]
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastInputs {
    pub history: Vec<Candle>,
    pub history_timestamps: Vec<i64>,
    pub future_timestamps: Vec<i64>,
}

/// Slice the trailing history window and lay out the forecast timestamps.
///
/// Future timestamps start with the last `overlap` history timestamps and are
/// extended bar by bar until `horizon` entries exist.
pub fn forecast_inputs(candles: &[Candle], window: &ForecastWindow, bar_seconds: i64) -> ForecastInputs {
    let start = candles.len().saturating_sub(window.history_limit);
    let history = candles[start..].to_vec();
    let history_timestamps: Vec<i64> = history.iter().map(|c| c.timestamp).collect();

    let overlap_start = history_timestamps.len().saturating_sub(window.overlap);
    let mut future_timestamps: Vec<i64> = history_timestamps[overlap_start..]
        .iter()
        .copied()
        .take(window.horizon)
        .collect();

    if let Some(&last) = history_timestamps.last() {
        let mut next = last;
        while future_timestamps.len() < window.horizon {
            next += bar_seconds;
            future_timestamps.push(next);
        }
    }

    ForecastInputs {
        history,
        history_timestamps,
        future_timestamps,
    }
}

#[derive(Serialize)]
struct ForecastRequest<'a> {
    history: &'a [Candle],
    history_timestamps: &'a [i64],
    future_timestamps: &'a [i64],
}

/// Forecaster backed by an HTTP model service
#[derive(Debug, Clone)]
pub struct RemoteForecaster {
    client: reqwest::Client,
    url: String,
}

impl RemoteForecaster {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, ForecastError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl Forecaster for RemoteForecaster {
    async fn forecast(
        &self,
        history: &[Candle],
        history_timestamps: &[i64],
        future_timestamps: &[i64],
    ) -> Result<Vec<PredictionPoint>, ForecastError> {
        let request = ForecastRequest {
            history,
            history_timestamps,
            future_timestamps,
        };

        let response = self.client.post(&self.url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ForecastError::Status(status.as_u16()));
        }

        let mut points: Vec<PredictionPoint> = response.json().await?;
        points.sort_by_key(|p| p.timestamp);
        points.dedup_by_key(|p| p.timestamp);

        debug!(target: "forecast", points = points.len(), "forecast received");
        Ok(points)
    }
}
