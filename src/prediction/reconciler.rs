use crate::models::exchange::OrderSide;
use crate::models::prediction::{ForecastAnalysis, ForecastDirection, PredictionPoint};
use crate::models::signal::{Signal, SignalDirection};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Relative max/min spread below which a forecast is considered flat
pub const FLAT_SPREAD: f64 = 0.02;

/// Extremes, boundary prices and directional bias of a forecast path.
///
/// Returns `None` for an empty forecast. The first occurrence wins when the
/// maximum or minimum close repeats; non-finite closes are ignored.
pub fn analyze_forecast(points: &[PredictionPoint]) -> Option<ForecastAnalysis> {
    let finite: Vec<&PredictionPoint> = points
        .iter()
        .filter(|p| p.predicted_close.is_finite())
        .collect();
    let first = *finite.first()?;
    let last = *finite.last()?;

    let mut max = first;
    let mut min = first;
    for &point in &finite[1..] {
        if point.predicted_close > max.predicted_close {
            max = point;
        }
        if point.predicted_close < min.predicted_close {
            min = point;
        }
    }

    let max_price = max.predicted_close;
    let min_price = min.predicted_close;
    let direction = if max_price <= 0.0 || (max_price - min_price) / max_price < FLAT_SPREAD {
        ForecastDirection::Flat
    } else if max.timestamp > min.timestamp {
        ForecastDirection::Buy
    } else {
        ForecastDirection::Sell
    };

    Some(ForecastAnalysis {
        direction,
        max_price,
        max_timestamp: max.timestamp,
        min_price,
        min_timestamp: min.timestamp,
        start_price: first.predicted_close,
        end_price: last.predicted_close,
    })
}

/// Forecast bias and indicator signal disagree; the trade must not fire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastVeto {
    pub forecast: ForecastDirection,
    pub signal: SignalDirection,
}

impl fmt::Display for ForecastVeto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "forecast direction '{}' does not match signal '{}'",
            self.forecast, self.signal
        )
    }
}

/// Order side to trade when forecast and signal agree
pub fn reconcile(signal: &Signal, analysis: &ForecastAnalysis) -> Result<OrderSide, ForecastVeto> {
    let veto = ForecastVeto {
        forecast: analysis.direction,
        signal: signal.direction,
    };
    if !analysis.direction.matches(signal.direction) {
        return Err(veto);
    }
    analysis.direction.side().ok_or(veto)
}
