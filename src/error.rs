//! Error types shared across the engine layers

use thiserror::Error;

/// Failures while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    Invalid { key: String, value: String },

    #[error("failed to read strategy config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse strategy config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures surfaced by the exchange gateway
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Rejected locally before any network call
    #[error("validation failed: {0}")]
    Validation(String),

    /// The exchange answered with a non-success code
    #[error("exchange rejected request (code {code}): {msg}")]
    Exchange { code: String, msg: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to decode exchange response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("missing credentials for private endpoint {0}")]
    MissingCredentials(String),
}

impl GatewayError {
    /// True when the exchange saw the request and declared an outcome
    pub fn is_declared_rejection(&self) -> bool {
        matches!(self, GatewayError::Exchange { .. })
    }
}

/// Failures of the forecast collaborator
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("forecast request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("forecast service returned status {0}")]
    Status(u16),
}

/// Failures that abort a trading cycle
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("market data unavailable: {0}")]
    MarketData(String),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}
