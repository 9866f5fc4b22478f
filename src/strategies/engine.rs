use crate::common::math::tail;
use crate::models::indicators::{closes, Candle};
use crate::models::signal::Signal;
use crate::models::strategy::{StrategyMode, StrategyParams};
use crate::signals::SignalGenerator;
use tracing::debug;

pub const MIN_CANDLES: usize = 16;
/// Closes handed to the RSI path
pub const RSI_WINDOW: usize = 48;

/// Dispatches a candle history to the configured strategy over a bounded window
#[derive(Debug, Clone, Default)]
pub struct StrategyEngine {
    generator: SignalGenerator,
}

impl StrategyEngine {
    pub fn new() -> Self {
        Self {
            generator: SignalGenerator::new(),
        }
    }

    /// Candles must already be sorted and de-duplicated
    pub fn analyze_market(&self, candles: &[Candle], params: &StrategyParams) -> Signal {
        if candles.len() < MIN_CANDLES {
            return Signal::hold(format!(
                "insufficient data: {} candles, need {MIN_CANDLES}",
                candles.len()
            ));
        }

        let all_closes = closes(candles);
        let signal = match params.strategy_mode {
            StrategyMode::Rsi => self
                .generator
                .rsi_signal(tail(&all_closes, RSI_WINDOW), &params.rsi_params()),
            StrategyMode::MovingAverage => {
                let window = params.ma_long_period.saturating_mul(2);
                self.generator
                    .ma_signal(tail(&all_closes, window), &params.ma_params())
            }
        };

        debug!(
            target: "engine",
            mode = ?params.strategy_mode,
            direction = %signal.direction,
            strength = signal.strength,
            "{}",
            signal.reason
        );
        signal
    }
}
