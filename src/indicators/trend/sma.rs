//! SMA (Simple Moving Average) indicator

use crate::models::indicators::IndicatorSeries;

/// Trailing arithmetic mean over `window` values.
///
/// Undefined before index `window - 1`; a zero window yields an all-`None` series.
pub fn sma(series: &[f64], window: usize) -> IndicatorSeries {
    let mut out = vec![None; series.len()];
    if window == 0 || series.len() < window {
        return out;
    }

    let mut sum: f64 = series[..window].iter().sum();
    out[window - 1] = Some(sum / window as f64);
    for i in window..series.len() {
        sum += series[i] - series[i - window];
        out[i] = Some(sum / window as f64);
    }
    out
}

/// Latest SMA value, if the series is long enough
pub fn latest_sma(series: &[f64], window: usize) -> Option<f64> {
    if window == 0 || series.len() < window {
        return None;
    }
    let tail = &series[series.len() - window..];
    Some(tail.iter().sum::<f64>() / window as f64)
}
