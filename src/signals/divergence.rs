//! Price/RSI divergence detection

use crate::common::math::tail;
use crate::indicators::structure::local_extremes;
use crate::models::signal::DivergenceKind;

/// Maximum number of trailing bars searched for extrema
pub const DIVERGENCE_LOOKBACK: usize = 30;
/// Fewer bars than this and divergence is not evaluated
pub const MIN_DIVERGENCE_BARS: usize = 10;
pub const EXTREMA_WINDOW: usize = 3;

/// Compare the two most recent price and RSI extrema over the lookback window.
///
/// `prices` and `rsi` must be aligned; undefined RSI entries never form extrema.
/// Bullish divergence is checked first. Bearish divergence is only checked when
/// price or RSI has fewer than two lows in the window.
pub fn detect_divergence(prices: &[f64], rsi: &[Option<f64>]) -> Option<DivergenceKind> {
    let lookback = DIVERGENCE_LOOKBACK.min(rsi.len()).min(prices.len());
    if lookback < MIN_DIVERGENCE_BARS {
        return None;
    }

    let price_window = tail(prices, lookback);
    let rsi_values: Vec<f64> = rsi.iter().map(|v| v.unwrap_or(f64::NAN)).collect();
    let rsi_window = tail(&rsi_values, lookback);

    let price_extremes = local_extremes(price_window, EXTREMA_WINDOW);
    let rsi_extremes = local_extremes(rsi_window, EXTREMA_WINDOW);

    let last_two = |idx: &[usize]| -> Option<(usize, usize)> {
        match idx {
            [.., prev, latest] => Some((*prev, *latest)),
            _ => None,
        }
    };

    // Bearish is only examined when the lows cannot be compared
    if let (Some((p_prev, p_latest)), Some((r_prev, r_latest))) = (
        last_two(&price_extremes.lows),
        last_two(&rsi_extremes.lows),
    ) {
        let bullish = price_window[p_latest] < price_window[p_prev]
            && rsi_window[r_latest] > rsi_window[r_prev];
        return bullish.then_some(DivergenceKind::Bullish);
    }

    if let (Some((p_prev, p_latest)), Some((r_prev, r_latest))) = (
        last_two(&price_extremes.highs),
        last_two(&rsi_extremes.highs),
    ) {
        if price_window[p_latest] > price_window[p_prev] && rsi_window[r_latest] < rsi_window[r_prev]
        {
            return Some(DivergenceKind::Bearish);
        }
    }

    None
}
