//! Local extrema detection

use crate::models::indicators::Extremes;

/// Find strict local highs and lows.
///
/// Index `i` is a high when it is greater than each of its `window` neighbours
/// on both sides, a low when it is smaller than all of them. Indices within
/// `window` of either boundary are never reported. NaN never qualifies.
pub fn local_extremes(series: &[f64], window: usize) -> Extremes {
    let mut extremes = Extremes::default();
    if window == 0 || series.len() <= 2 * window {
        return extremes;
    }

    for i in window..series.len() - window {
        let value = series[i];
        let neighbours = (1..=window).flat_map(|j| [series[i - j], series[i + j]]);

        if neighbours.clone().all(|n| value > n) {
            extremes.highs.push(i);
        } else if neighbours.clone().all(|n| value < n) {
            extremes.lows.push(i);
        }
    }
    extremes
}
