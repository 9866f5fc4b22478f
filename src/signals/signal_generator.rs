use crate::common::math::{round_to, sample_std_dev, tail};
use crate::indicators::{rsi, sma};
use crate::models::indicators::last_defined;
use crate::models::signal::{Signal, SignalDiagnostics, SignalDirection};
use crate::models::strategy::{MaParams, RsiParams};
use crate::signals::aggregation::{fuse, PrimarySignal};
use crate::signals::divergence::detect_divergence;
use crate::signals::scoring::{
    crossover_strength, overbought_strength, oversold_strength, volatility_dampening,
};

/// Short/long gap must exceed this fraction of the long MA to count as a cross
const CROSSOVER_THRESHOLD: f64 = 0.001;
/// Pullback band below the short MA, as fractions of it
const PULLBACK_LOWER: f64 = 0.98;
const PULLBACK_UPPER: f64 = 0.995;
const PULLBACK_STRENGTH: f64 = 0.3;

/// Stateless signal rules over closing-price series
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalGenerator;

impl SignalGenerator {
    pub fn new() -> Self {
        Self
    }

    /// RSI threshold signal, confirmed or pre-empted by price/RSI divergence
    pub fn rsi_signal(&self, closes: &[f64], params: &RsiParams) -> Signal {
        let (period, overbought, oversold) =
            match (params.period, params.overbought, params.oversold) {
                (Some(period), Some(ob), Some(os)) if period > 0 => (period, ob, os),
                _ => return Signal::hold("RSI parameters incomplete"),
            };

        if !(oversold > 0.0 && oversold < overbought && overbought < 100.0) {
            return Signal::hold(format!(
                "invalid RSI thresholds: oversold={oversold}, overbought={overbought}"
            ));
        }

        if closes.len() <= period {
            return Signal::hold(format!(
                "insufficient data: RSI({period}) needs more than {period} prices, got {}",
                closes.len()
            ));
        }

        let rsi_series = rsi(closes, period);
        let Some(current) = last_defined(&rsi_series) else {
            return Signal::hold("RSI undefined for the latest bar");
        };

        let primary = if current <= oversold {
            Some(PrimarySignal {
                direction: SignalDirection::Buy,
                strength: oversold_strength(current, oversold),
                reason: format!("RSI oversold ({current:.2} <= {oversold})"),
            })
        } else if current >= overbought {
            Some(PrimarySignal {
                direction: SignalDirection::Sell,
                strength: overbought_strength(current, overbought),
                reason: format!("RSI overbought ({current:.2} >= {overbought})"),
            })
        } else {
            None
        };

        let divergence = detect_divergence(closes, &rsi_series);
        let fused = fuse(primary, divergence);

        Signal::new(fused.direction, fused.strength, fused.reason).with_diagnostics(
            SignalDiagnostics {
                rsi: Some(current),
                divergence,
                ..SignalDiagnostics::default()
            },
        )
    }

    /// Golden/death cross of two SMAs, with a buy-only pullback fallback
    pub fn ma_signal(&self, closes: &[f64], params: &MaParams) -> Signal {
        let (short_period, long_period) = match (params.short_period, params.long_period) {
            (Some(short), Some(long)) if short > 0 && long > 0 => (short, long),
            _ => return Signal::hold("moving-average parameters incomplete"),
        };

        if closes.len() < long_period {
            return Signal::hold(format!(
                "insufficient data: MA({long_period}) needs {long_period} prices, got {}",
                closes.len()
            ));
        }

        let short_series = sma(closes, short_period);
        let long_series = sma(closes, long_period);
        let n = closes.len();

        let (Some(cur_short), Some(cur_long)) = (short_series[n - 1], long_series[n - 1]) else {
            return Signal::hold("moving averages undefined for the latest bar");
        };
        let previous = if n >= 2 {
            short_series[n - 2].zip(long_series[n - 2])
        } else {
            None
        };

        let volatility = sample_std_dev(tail(closes, short_period));
        let dampening = volatility_dampening(volatility);
        let threshold = cur_long * CROSSOVER_THRESHOLD;
        let price = closes[n - 1];

        let diagnostics = SignalDiagnostics {
            short_ma: Some(cur_short),
            long_ma: Some(cur_long),
            volatility,
            ..SignalDiagnostics::default()
        };

        if let Some((prev_short, prev_long)) = previous {
            if prev_short <= prev_long && cur_short - cur_long > threshold {
                return Signal::new(
                    SignalDirection::Buy,
                    round_to(crossover_strength(cur_short, cur_long, dampening), 2),
                    format!("golden cross: MA{short_period} {cur_short:.4} above MA{long_period} {cur_long:.4}"),
                )
                .with_diagnostics(diagnostics);
            }
            if prev_short >= prev_long && cur_long - cur_short > threshold {
                return Signal::new(
                    SignalDirection::Sell,
                    round_to(crossover_strength(cur_short, cur_long, dampening), 2),
                    format!("death cross: MA{short_period} {cur_short:.4} below MA{long_period} {cur_long:.4}"),
                )
                .with_diagnostics(diagnostics);
            }
        }

        if cur_short > cur_long
            && price >= cur_short * PULLBACK_LOWER
            && price <= cur_short * PULLBACK_UPPER
        {
            return Signal::new(
                SignalDirection::Buy,
                PULLBACK_STRENGTH,
                format!("uptrend pullback to MA{short_period} ({price:.4} near {cur_short:.4})"),
            )
            .with_diagnostics(diagnostics);
        }

        Signal::hold("no moving-average crossover").with_diagnostics(diagnostics)
    }
}
