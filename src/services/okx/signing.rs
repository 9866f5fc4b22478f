//! OKX request signing
//!
//! `OK-ACCESS-SIGN = base64(HMAC-SHA256(secret, timestamp + METHOD + requestPath + body))`
//! where `requestPath` carries the query string for GET requests.

use crate::error::GatewayError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const HEADER_KEY: &str = "OK-ACCESS-KEY";
pub const HEADER_SIGN: &str = "OK-ACCESS-SIGN";
pub const HEADER_TIMESTAMP: &str = "OK-ACCESS-TIMESTAMP";
pub const HEADER_PASSPHRASE: &str = "OK-ACCESS-PASSPHRASE";
pub const HEADER_SIMULATED: &str = "x-simulated-trading";

/// ISO-8601 UTC timestamp with millisecond precision and a trailing `Z`
pub fn timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// URL-encoded query string with parameters sorted by key
pub fn sorted_query(params: &[(&str, String)]) -> Result<String, GatewayError> {
    let mut sorted: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    serde_urlencoded::to_string(&sorted)
        .map_err(|e| GatewayError::Validation(format!("cannot encode query: {e}")))
}

/// Path plus `?query` when there are parameters
pub fn request_path(path: &str, query: &str) -> String {
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{query}")
    }
}

pub fn prehash(timestamp: &str, method: &str, request_path: &str, body: &str) -> String {
    format!("{timestamp}{}{request_path}{body}", method.to_uppercase())
}

pub fn sign(
    secret: &str,
    timestamp: &str,
    method: &str,
    request_path: &str,
    body: &str,
) -> Result<String, GatewayError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| GatewayError::Validation(format!("failed to init signer: {e}")))?;
    mac.update(prehash(timestamp, method, request_path, body).as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}
