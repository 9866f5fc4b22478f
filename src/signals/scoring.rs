//! Strength formulas for the individual signal rules

/// Level below which an oversold reading gains extra weight
const DEEP_OVERSOLD: f64 = 30.0;
/// Level above which an overbought reading gains extra weight
const DEEP_OVERBOUGHT: f64 = 70.0;
/// Absolute-level factor used when RSI is past its threshold but not deep
const SHALLOW_LEVEL_FACTOR: f64 = 0.3;
const RSI_STRENGTH_GAIN: f64 = 1.5;
/// Volatility (price stddev) at which crossover strength is left undamped
const BASELINE_VOLATILITY: f64 = 0.01;

/// Strength of an oversold reading: depth below the threshold times an
/// absolute-level factor that grows as RSI approaches 0.
pub fn oversold_strength(rsi: f64, oversold: f64) -> f64 {
    let depth_factor = (oversold - rsi) / oversold;
    let level_factor = if rsi < DEEP_OVERSOLD {
        1.0 - rsi / DEEP_OVERSOLD
    } else {
        SHALLOW_LEVEL_FACTOR
    };
    clamp_unit(depth_factor * level_factor * RSI_STRENGTH_GAIN)
}

/// Mirror of [`oversold_strength`], growing as RSI approaches 100.
pub fn overbought_strength(rsi: f64, overbought: f64) -> f64 {
    let depth_factor = (rsi - overbought) / (100.0 - overbought);
    let level_factor = if rsi > DEEP_OVERBOUGHT {
        (rsi - DEEP_OVERBOUGHT) / (100.0 - DEEP_OVERBOUGHT)
    } else {
        SHALLOW_LEVEL_FACTOR
    };
    clamp_unit(depth_factor * level_factor * RSI_STRENGTH_GAIN)
}

/// `min(1, baseline / volatility)`; 1 when volatility is unknown or zero
pub fn volatility_dampening(volatility: Option<f64>) -> f64 {
    match volatility {
        Some(v) if v > 0.0 => (BASELINE_VOLATILITY / v).min(1.0),
        _ => 1.0,
    }
}

/// Normalized gap between the moving averages, damped by volatility
pub fn crossover_strength(short_ma: f64, long_ma: f64, dampening: f64) -> f64 {
    if long_ma == 0.0 {
        return 0.0;
    }
    clamp_unit((short_ma - long_ma).abs() / long_ma.abs() * dampening)
}

pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}
