//! Signal generation: RSI and moving-average strategies with divergence confirmation.

pub mod aggregation;
pub mod divergence;
pub mod scoring;
pub mod signal_generator;

pub use aggregation::*;
pub use divergence::*;
pub use signal_generator::SignalGenerator;
