//! Perpetual-futures signal and execution engine.
//!
//! One cycle fetches market data from the exchange, derives an indicator
//! signal, reconciles it with a forecast price path and, when both agree,
//! submits a single risk-bounded order.

pub mod common;
pub mod config;
pub mod core;
pub mod error;
pub mod execution;
pub mod indicators;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod prediction;
pub mod services;
pub mod signals;
pub mod strategies;
