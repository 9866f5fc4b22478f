//! Exchange connectivity.

pub mod exchange;
pub mod okx;

pub use exchange::{fetch_candle_history, ExchangeClient};
pub use okx::OkxRestClient;
