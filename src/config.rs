//! Environment-driven configuration

use crate::core::scheduler::interval_to_cron;
use crate::error::ConfigError;
use crate::models::strategy::StrategyParams;
use std::env;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub const DEFAULT_BASE_URL: &str = "https://www.okx.com";
pub const DEFAULT_INST_ID: &str = "BTC-USDT-SWAP";

/// Deployment environment (`APP_ENV`), defaults to `sandbox`
pub fn get_environment() -> String {
    env::var("APP_ENV").unwrap_or_else(|_| "sandbox".to_string())
}

/// API credentials for private exchange endpoints
#[derive(Clone, Default)]
pub struct ExchangeCredentials {
    pub api_key: String,
    pub secret_key: String,
    pub passphrase: String,
}

impl ExchangeCredentials {
    pub fn new(api_key: &str, secret_key: &str, passphrase: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            secret_key: secret_key.to_string(),
            passphrase: passphrase.to_string(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.api_key.is_empty() && !self.secret_key.is_empty() && !self.passphrase.is_empty()
    }
}

impl fmt::Debug for ExchangeCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExchangeCredentials")
            .field("api_key", &redact(&self.api_key))
            .field("secret_key", &"***")
            .field("passphrase", &"***")
            .finish()
    }
}

fn redact(value: &str) -> String {
    if value.chars().count() <= 4 {
        "***".to_string()
    } else {
        format!("{}***", value.chars().take(4).collect::<String>())
    }
}

/// Exchange connectivity and instrument settings
#[derive(Debug, Clone)]
pub struct ExchangeConfig {
    pub base_url: String,
    pub credentials: ExchangeCredentials,
    pub simulated_trading: bool,
    pub timeout_seconds: u64,
    pub inst_id: String,
    pub bar: String,
    pub candle_limit: u32,
    pub candle_pages: u32,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            credentials: ExchangeCredentials::default(),
            simulated_trading: false,
            timeout_seconds: 20,
            inst_id: DEFAULT_INST_ID.to_string(),
            bar: "15m".to_string(),
            candle_limit: 300,
            candle_pages: 2,
        }
    }
}

impl ExchangeConfig {
    /// Bar spacing in seconds derived from the bar label (`15m`, `1H`, `1D`...)
    pub fn bar_seconds(&self) -> Result<i64, ConfigError> {
        parse_bar_seconds(&self.bar)
    }
}

pub fn parse_bar_seconds(bar: &str) -> Result<i64, ConfigError> {
    let invalid = || ConfigError::Invalid {
        key: "BAR".to_string(),
        value: bar.to_string(),
    };
    if bar.len() < 2 {
        return Err(invalid());
    }
    let (amount, unit) = bar.split_at(bar.len() - 1);
    let amount: i64 = amount.parse().map_err(|_| invalid())?;
    if amount <= 0 {
        return Err(invalid());
    }
    let unit_seconds = match unit {
        "s" => 1,
        "m" => 60,
        "H" | "h" => 3_600,
        "D" | "d" => 86_400,
        "W" | "w" => 604_800,
        _ => return Err(invalid()),
    };
    Ok(amount * unit_seconds)
}

/// Shape of the history/future window handed to the forecaster
#[derive(Debug, Clone)]
pub struct ForecastWindow {
    pub history_limit: usize,
    pub overlap: usize,
    pub horizon: usize,
}

impl Default for ForecastWindow {
    fn default() -> Self {
        Self {
            history_limit: 500,
            overlap: 30,
            horizon: 120,
        }
    }
}

/// Cycle driver settings
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub interval_seconds: u64,
    pub trading_enabled: bool,
    pub port: u16,
    pub forecast_url: Option<String>,
    pub forecast_window: ForecastWindow,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 15,
            trading_enabled: false,
            port: 8080,
            forecast_url: None,
            forecast_window: ForecastWindow::default(),
        }
    }
}

/// Full application configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub exchange: ExchangeConfig,
    pub engine: EngineConfig,
    pub strategy: StrategyParams,
}

impl Config {
    /// Build the configuration from environment variables (after `.env` has been loaded)
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = ExchangeConfig::default();
        let exchange = ExchangeConfig {
            base_url: env::var("OKX_BASE_URL").unwrap_or(defaults.base_url),
            credentials: ExchangeCredentials {
                api_key: env::var("OKX_API_KEY").unwrap_or_default(),
                secret_key: env::var("OKX_SECRET_KEY").unwrap_or_default(),
                passphrase: env::var("OKX_PASSPHRASE").unwrap_or_default(),
            },
            simulated_trading: env_or("OKX_SIMULATED", defaults.simulated_trading)?,
            timeout_seconds: env_or("OKX_TIMEOUT_SECONDS", defaults.timeout_seconds)?,
            inst_id: env::var("INST_ID").unwrap_or(defaults.inst_id),
            bar: env::var("BAR").unwrap_or(defaults.bar),
            candle_limit: env_or("CANDLE_LIMIT", defaults.candle_limit)?,
            candle_pages: env_or("CANDLE_PAGES", defaults.candle_pages)?,
        };
        exchange.bar_seconds()?;

        let engine_defaults = EngineConfig::default();
        let engine = EngineConfig {
            interval_seconds: env_or("EVAL_INTERVAL_SECONDS", engine_defaults.interval_seconds)?,
            trading_enabled: env_or("TRADING_ENABLED", engine_defaults.trading_enabled)?,
            port: env_or("PORT", engine_defaults.port)?,
            forecast_url: env::var("FORECAST_URL").ok().filter(|u| !u.trim().is_empty()),
            forecast_window: engine_defaults.forecast_window,
        };
        if interval_to_cron(engine.interval_seconds).is_none() {
            return Err(ConfigError::Invalid {
                key: "EVAL_INTERVAL_SECONDS".to_string(),
                value: engine.interval_seconds.to_string(),
            });
        }

        let strategy = match env::var("STRATEGY_CONFIG") {
            Ok(path) if !path.trim().is_empty() => StrategyParams::load(Path::new(&path))?,
            _ => StrategyParams::default(),
        };

        Ok(Self {
            exchange,
            engine,
            strategy,
        })
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => {
            raw.trim().parse().map_err(|_| ConfigError::Invalid {
                key: key.to_string(),
                value: raw,
            })
        }
        _ => Ok(default),
    }
}
