//! Strategy selection: picks the signal path and the closes it sees.

pub mod engine;

pub use engine::StrategyEngine;
