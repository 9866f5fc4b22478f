use perptrader::error::GatewayError;
use perptrader::models::exchange::{OrderAck, Ticker};
use perptrader::services::okx::messages::{parse_candle_row, Envelope};
use serde_json::json;

fn envelope(value: serde_json::Value) -> Envelope {
    serde_json::from_value(value).unwrap()
}

#[test]
fn successful_envelope_yields_typed_rows() {
    let env = envelope(json!({
        "code": "0",
        "msg": "",
        "data": [{"instId": "BTC-USDT-SWAP", "last": "43000.5", "high24h": "", "sodUtc8": "42000"}]
    }));
    assert!(env.is_success());

    let tickers: Vec<Ticker> = env.into_data().unwrap();
    assert_eq!(tickers.len(), 1);
    assert_eq!(tickers[0].last, Some(43000.5));
    assert_eq!(tickers[0].high_24h, None);
    assert_eq!(tickers[0].sod_utc8, Some(42000.0));
}

#[test]
fn missing_data_is_empty() {
    let env = envelope(json!({"code": "0", "msg": ""}));
    let rows: Vec<Ticker> = env.into_data().unwrap();
    assert!(rows.is_empty());
}

#[test]
fn item_level_error_is_preferred() {
    let env = envelope(json!({
        "code": "1",
        "msg": "Operation failed",
        "data": [{"ordId": "", "clOrdId": "pt1", "sCode": "51008", "sMsg": "Insufficient balance"}]
    }));
    match env.into_data::<OrderAck>() {
        Err(GatewayError::Exchange { code, msg }) => {
            assert_eq!(code, "51008");
            assert_eq!(msg, "Insufficient balance");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn top_level_error_is_used_without_item_code() {
    let env = envelope(json!({"code": 50113, "msg": "Invalid Sign", "data": []}));
    assert!(!env.is_success());
    match env.into_data::<OrderAck>() {
        Err(err @ GatewayError::Exchange { .. }) => {
            assert!(err.is_declared_rejection());
            assert_eq!(err.to_string(), "exchange rejected request (code 50113): Invalid Sign");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn numeric_zero_code_is_success() {
    let env = envelope(json!({"code": 0, "data": []}));
    assert!(env.is_success());
}

#[test]
fn candle_rows_accept_strings_and_numbers() {
    let row = json!(["1700000000000", "100.5", "101", 99.5, "100", "12.5", "0", "0", "1"]);
    let candle = parse_candle_row(row.as_array().unwrap()).unwrap();
    assert_eq!(candle.timestamp, 1_700_000_000);
    assert_eq!(candle.open, 100.5);
    assert_eq!(candle.high, 101.0);
    assert_eq!(candle.low, 99.5);
    assert_eq!(candle.close, 100.0);
    assert_eq!(candle.volume, 12.5);

    let numeric = json!([1700000900000_i64, 1, 2, 0.5, 1.5, 3]);
    assert_eq!(parse_candle_row(numeric.as_array().unwrap()).unwrap().timestamp, 1_700_000_900);
}

#[test]
fn malformed_candle_rows_are_rejected() {
    let short = json!(["1700000000000", "1", "2", "0.5", "1.5"]);
    assert!(parse_candle_row(short.as_array().unwrap()).is_none());

    let garbage = json!(["1700000000000", "abc", "2", "0.5", "1.5", "3"]);
    assert!(parse_candle_row(garbage.as_array().unwrap()).is_none());

    let bad_ts = json!([null, "1", "2", "0.5", "1.5", "3"]);
    assert!(parse_candle_row(bad_ts.as_array().unwrap()).is_none());
}
