//! Response envelope and row formats of the OKX v5 API

use crate::error::GatewayError;
use crate::models::indicators::Candle;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// `{"code": "0", "msg": "", "data": [...]}`
#[derive(Debug, Deserialize)]
pub struct Envelope {
    #[serde(deserialize_with = "code_string")]
    pub code: String,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub data: Value,
}

fn code_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        other => other.to_string(),
    })
}

impl Envelope {
    pub fn is_success(&self) -> bool {
        self.code == "0"
    }

    /// Typed `data` array, or the exchange's declared error.
    ///
    /// Batch endpoints report per-item failures through `sCode`/`sMsg`, which
    /// are preferred over the top-level code when present.
    pub fn into_data<T: DeserializeOwned>(self) -> Result<Vec<T>, GatewayError> {
        if !self.is_success() {
            let item = self.data.get(0);
            let s_code = item.and_then(|d| d.get("sCode")).and_then(Value::as_str);
            let s_msg = item.and_then(|d| d.get("sMsg")).and_then(Value::as_str);
            return Err(match s_code {
                Some(code) if code != "0" && !code.is_empty() => GatewayError::Exchange {
                    code: code.to_string(),
                    msg: s_msg.unwrap_or_default().to_string(),
                },
                _ => GatewayError::Exchange {
                    code: self.code,
                    msg: self.msg,
                },
            });
        }
        match self.data {
            Value::Null => Ok(Vec::new()),
            data => Ok(serde_json::from_value(data)?),
        }
    }
}

/// `[ts_ms, open, high, low, close, vol, ...]`; malformed rows yield `None`
pub fn parse_candle_row(row: &[Value]) -> Option<Candle> {
    if row.len() < 6 {
        return None;
    }
    let num = |v: &Value| -> Option<f64> {
        match v {
            Value::String(s) => s.parse().ok(),
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    };
    let ts_ms = match &row[0] {
        Value::String(s) => s.parse::<i64>().ok()?,
        Value::Number(n) => n.as_i64()?,
        _ => return None,
    };
    Some(Candle::new(
        num(&row[1])?,
        num(&row[2])?,
        num(&row[3])?,
        num(&row[4])?,
        num(&row[5])?,
        ts_ms / 1000,
    ))
}
