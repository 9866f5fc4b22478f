//! RSI (Relative Strength Index) indicator

use crate::models::indicators::IndicatorSeries;

/// Calculate RSI over a rolling window of `period` price changes
///
/// RSI = 100 - (100 / (1 + RS))
/// RS = Average Gain / Average Loss
///
/// The first `period` entries are undefined. A zero average loss saturates at 100.
pub fn rsi(series: &[f64], period: usize) -> IndicatorSeries {
    let mut out = vec![None; series.len()];
    if period == 0 || series.len() <= period {
        return out;
    }

    let mut gains = vec![0.0; series.len()];
    let mut losses = vec![0.0; series.len()];
    for i in 1..series.len() {
        let change = series[i] - series[i - 1];
        if change > 0.0 {
            gains[i] = change;
        } else {
            losses[i] = -change;
        }
    }

    for i in period..series.len() {
        let window = i + 1 - period..=i;
        let avg_gain = gains[window.clone()].iter().sum::<f64>() / period as f64;
        let avg_loss = losses[window].iter().sum::<f64>() / period as f64;
        out[i] = Some(rsi_from_averages(avg_gain, avg_loss));
    }
    out
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss <= 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    (100.0 - (100.0 / (1.0 + rs))).clamp(0.0, 100.0)
}
