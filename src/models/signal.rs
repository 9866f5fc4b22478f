use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalDirection {
    Buy,
    Sell,
    Hold,
}

impl SignalDirection {
    pub fn is_actionable(&self) -> bool {
        !matches!(self, SignalDirection::Hold)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalDirection::Buy => "buy",
            SignalDirection::Sell => "sell",
            SignalDirection::Hold => "hold",
        }
    }
}

impl fmt::Display for SignalDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DivergenceKind {
    /// Price makes a lower low while RSI makes a higher low
    Bullish,
    /// Price makes a higher high while RSI makes a lower high
    Bearish,
}

impl DivergenceKind {
    pub fn direction(&self) -> SignalDirection {
        match self {
            DivergenceKind::Bullish => SignalDirection::Buy,
            DivergenceKind::Bearish => SignalDirection::Sell,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            DivergenceKind::Bullish => "bullish divergence (price lower low, RSI higher low)",
            DivergenceKind::Bearish => "bearish divergence (price higher high, RSI lower high)",
        }
    }
}

/// Indicator values behind a signal, for display and logs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalDiagnostics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub divergence: Option<DivergenceKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_ma: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_ma: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volatility: Option<f64>,
}

/// Directional trading signal produced fresh every cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub direction: SignalDirection,
    pub strength: f64,
    pub reason: String,
    #[serde(default)]
    pub diagnostics: SignalDiagnostics,
}

impl Signal {
    pub fn new(direction: SignalDirection, strength: f64, reason: impl Into<String>) -> Self {
        Self {
            direction,
            strength: strength.clamp(0.0, 1.0),
            reason: reason.into(),
            diagnostics: SignalDiagnostics::default(),
        }
    }

    /// Neutral signal explaining why nothing fired
    pub fn hold(reason: impl Into<String>) -> Self {
        Self::new(SignalDirection::Hold, 0.0, reason)
    }

    pub fn with_diagnostics(mut self, diagnostics: SignalDiagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }
}
