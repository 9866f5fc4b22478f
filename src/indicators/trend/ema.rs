//! EMA (Exponential Moving Average) indicator

use crate::models::indicators::IndicatorSeries;

/// Exponentially weighted mean with `alpha = 2 / (span + 1)`.
///
/// Uses bias-adjusted weights (`sum((1-a)^i * x[t-i]) / sum((1-a)^i)`), so the
/// series is defined from index 0; early values lean on short history.
pub fn ema(series: &[f64], span: usize) -> IndicatorSeries {
    if span == 0 {
        return vec![None; series.len()];
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let decay = 1.0 - alpha;
    let mut numerator = 0.0;
    let mut denominator = 0.0;

    series
        .iter()
        .map(|&value| {
            numerator = value + decay * numerator;
            denominator = 1.0 + decay * denominator;
            Some(numerator / denominator)
        })
        .collect()
}
