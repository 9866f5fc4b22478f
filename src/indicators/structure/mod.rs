//! Market structure: local extrema

pub mod extremes;

pub use extremes::*;
