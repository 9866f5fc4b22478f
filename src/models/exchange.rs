//! Exchange-side state and request bodies (OKX v5 field names)
//!
//! The engine treats these as externally owned truth, fetched fresh each cycle.

use crate::models::signal::SignalDirection;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// OKX encodes numbers as strings and uses "" for "not set"
fn opt_num<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        _ => None,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn from_signal(direction: SignalDirection) -> Option<Self> {
        match direction {
            SignalDirection::Buy => Some(OrderSide::Buy),
            SignalDirection::Sell => Some(OrderSide::Sell),
            SignalDirection::Hold => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "buy",
            OrderSide::Sell => "sell",
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarginMode {
    Isolated,
    Cross,
}

impl MarginMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarginMode::Isolated => "isolated",
            MarginMode::Cross => "cross",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Limit,
    Market,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceDetail {
    #[serde(default)]
    pub ccy: String,
    #[serde(default, deserialize_with = "opt_num")]
    pub avail_bal: Option<f64>,
    #[serde(default, deserialize_with = "opt_num")]
    pub eq: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountBalance {
    #[serde(default, deserialize_with = "opt_num")]
    pub total_eq: Option<f64>,
    #[serde(default)]
    pub details: Vec<BalanceDetail>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    #[serde(rename = "instId", default)]
    pub inst_id: String,
    #[serde(default, deserialize_with = "opt_num")]
    pub last: Option<f64>,
    #[serde(rename = "high24h", default, deserialize_with = "opt_num")]
    pub high_24h: Option<f64>,
    #[serde(rename = "low24h", default, deserialize_with = "opt_num")]
    pub low_24h: Option<f64>,
    #[serde(rename = "vol24h", default, deserialize_with = "opt_num")]
    pub vol_24h: Option<f64>,
    #[serde(rename = "sodUtc8", default, deserialize_with = "opt_num")]
    pub sod_utc8: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    #[serde(default)]
    pub inst_id: String,
    #[serde(default, deserialize_with = "opt_num")]
    pub pos: Option<f64>,
    #[serde(default)]
    pub pos_side: String,
    #[serde(default, deserialize_with = "opt_num")]
    pub avg_px: Option<f64>,
    #[serde(default, deserialize_with = "opt_num")]
    pub upl: Option<f64>,
    #[serde(default, deserialize_with = "opt_num")]
    pub lever: Option<f64>,
    #[serde(default)]
    pub mgn_mode: String,
}

impl Position {
    /// Non-zero position on the given instrument
    pub fn is_open_for(&self, inst_id: &str) -> bool {
        self.inst_id == inst_id && self.pos.map(|p| p != 0.0).unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingOrder {
    pub ord_id: String,
    #[serde(default)]
    pub cl_ord_id: String,
    #[serde(default)]
    pub inst_id: String,
    pub side: OrderSide,
    #[serde(default, deserialize_with = "opt_num")]
    pub px: Option<f64>,
    #[serde(default, deserialize_with = "opt_num")]
    pub sz: Option<f64>,
    #[serde(default)]
    pub ord_type: String,
    #[serde(default)]
    pub state: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaxSize {
    #[serde(default)]
    pub inst_id: String,
    #[serde(default, deserialize_with = "opt_num")]
    pub max_buy: Option<f64>,
    #[serde(default, deserialize_with = "opt_num")]
    pub max_sell: Option<f64>,
}

/// Per-order result returned by place/cancel/amend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAck {
    #[serde(default)]
    pub ord_id: String,
    #[serde(default)]
    pub cl_ord_id: String,
    #[serde(default)]
    pub s_code: String,
    #[serde(default)]
    pub s_msg: String,
}

impl OrderAck {
    pub fn is_success(&self) -> bool {
        self.s_code.is_empty() || self.s_code == "0"
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountConfig {
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub acct_lv: String,
    #[serde(default)]
    pub pos_mode: String,
}

/// Take-profit or stop-loss leg attached to an order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachedAlgoOrder {
    pub algo_cl_ord_id: String,
    pub sz: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tp_trigger_px: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tp_ord_px: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sl_trigger_px: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sl_ord_px: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub inst_id: String,
    pub td_mode: MarginMode,
    pub side: OrderSide,
    pub ord_type: OrderType,
    pub sz: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub px: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cl_ord_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attach_algo_ords: Vec<AttachedAlgoOrder>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmendRequest {
    pub inst_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ord_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cl_ord_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_sz: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_px: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelRequest {
    pub inst_id: String,
    pub ord_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeverageRequest {
    pub inst_id: String,
    pub lever: String,
    pub mgn_mode: MarginMode,
}
