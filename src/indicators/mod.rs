//! Stateless indicator primitives over price series.
//!
//! Every function returns a series aligned index-for-index with its input;
//! entries before the lookback window is satisfied are `None`.

pub mod momentum;
pub mod structure;
pub mod trend;
pub mod volatility;

pub use momentum::rsi;
pub use structure::local_extremes;
pub use trend::{ema, sma};
pub use volatility::bollinger;
