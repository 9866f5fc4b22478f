//! Unit tests for SMA and EMA

use perptrader::indicators::trend::latest_sma;
use perptrader::indicators::{ema, sma};

#[test]
fn sma_undefined_before_window() {
    let out = sma(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
    assert_eq!(out, vec![None, None, Some(2.0), Some(3.0), Some(4.0)]);
}

#[test]
fn sma_with_short_series_is_all_none() {
    assert_eq!(sma(&[1.0, 2.0], 3), vec![None, None]);
    assert_eq!(sma(&[1.0, 2.0], 0), vec![None, None]);
}

#[test]
fn latest_sma_matches_series_tail() {
    let series: Vec<f64> = (1..=50).map(|i| i as f64).collect();
    let full = sma(&series, 10);
    let latest = latest_sma(&series, 10).unwrap();
    assert!((full[49].unwrap() - latest).abs() < 1e-9);
    assert_eq!(latest_sma(&series[..5], 10), None);
}

#[test]
fn ema_defined_from_first_value() {
    let out = ema(&[1.0, 2.0, 3.0], 2);
    assert_eq!(out[0], Some(1.0));
    // alpha = 2/3: (2 + 1/3 * 1) / (1 + 1/3)
    assert!((out[1].unwrap() - 1.75).abs() < 1e-12);
    assert!(out.iter().all(|v| v.is_some()));
}

#[test]
fn ema_of_constant_series_is_constant() {
    let out = ema(&[42.0; 30], 12);
    assert!(out.iter().all(|v| (v.unwrap() - 42.0).abs() < 1e-9));
}

#[test]
fn ema_tracks_trend_with_lag() {
    let series: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
    let fast = ema(&series, 5);
    let slow = ema(&series, 20);
    let last = series.len() - 1;
    assert!(fast[last].unwrap() < series[last]);
    assert!(slow[last].unwrap() < fast[last].unwrap());
}
