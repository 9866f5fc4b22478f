//! Bollinger Bands indicator

use crate::common::math;
use crate::indicators::trend::sma;
use crate::models::indicators::{BollingerBands, IndicatorSeries};

/// Calculate Bollinger Bands
///
/// Middle Band = SMA(window)
/// Upper Band = Middle + (num_std * sample standard deviation)
/// Lower Band = Middle - (num_std * sample standard deviation)
pub fn bollinger(series: &[f64], window: usize, num_std: f64) -> BollingerBands {
    let middle = sma(series, window);
    let std = rolling_std(series, window);

    let band = |sign: f64| -> IndicatorSeries {
        middle
            .iter()
            .zip(std.iter())
            .map(|(m, s)| match (m, s) {
                (Some(m), Some(s)) => Some(m + sign * num_std * s),
                _ => None,
            })
            .collect()
    };

    BollingerBands {
        upper: band(1.0),
        lower: band(-1.0),
        middle,
    }
}

/// Trailing sample standard deviation; needs at least two values per window
pub fn rolling_std(series: &[f64], window: usize) -> IndicatorSeries {
    let mut out = vec![None; series.len()];
    if window < 2 || series.len() < window {
        return out;
    }
    for i in window - 1..series.len() {
        out[i] = math::sample_std_dev(&series[i + 1 - window..=i]);
    }
    out
}

/// Bollinger Bands with default parameters (20 SMA, 2σ)
pub fn bollinger_default(series: &[f64]) -> BollingerBands {
    bollinger(series, 20, 2.0)
}
