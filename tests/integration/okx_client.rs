//! OKX REST client against a mock exchange

use crate::test_utils::INST;
use perptrader::config::{ExchangeConfig, ExchangeCredentials};
use perptrader::error::GatewayError;
use perptrader::models::exchange::{MarginMode, OrderRequest, OrderSide, OrderType};
use perptrader::services::okx::signing::{sign, HEADER_SIGN, HEADER_TIMESTAMP};
use perptrader::services::{fetch_candle_history, ExchangeClient, OkxRestClient};
use serde_json::{json, Value};
use wiremock::matchers::{header, header_exists, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn config(server: &MockServer, simulated: bool) -> ExchangeConfig {
    ExchangeConfig {
        base_url: server.uri(),
        credentials: ExchangeCredentials::new("test-key", "test-secret", "test-pass"),
        simulated_trading: simulated,
        timeout_seconds: 5,
        ..ExchangeConfig::default()
    }
}

fn ok(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"code": "0", "msg": "", "data": data}))
}

fn header_value<'a>(request: &'a Request, name: &str) -> &'a str {
    request.headers.get(name).unwrap().to_str().unwrap()
}

fn signed_path(request: &Request) -> String {
    match request.url.query() {
        Some(query) => format!("{}?{}", request.url.path(), query),
        None => request.url.path().to_string(),
    }
}

fn assert_signed(request: &Request) {
    let ts = header_value(request, HEADER_TIMESTAMP);
    let body = String::from_utf8(request.body.clone()).unwrap();
    let expected = sign(
        "test-secret",
        ts,
        request.method.as_str(),
        &signed_path(request),
        &body,
    )
    .unwrap();
    assert_eq!(header_value(request, HEADER_SIGN), expected);
}

#[tokio::test]
async fn private_get_is_signed_with_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v5/account/balance"))
        .and(header("OK-ACCESS-KEY", "test-key"))
        .and(header("OK-ACCESS-PASSPHRASE", "test-pass"))
        .and(header_exists("OK-ACCESS-SIGN"))
        .and(header_exists("OK-ACCESS-TIMESTAMP"))
        .respond_with(ok(json!([{
            "totalEq": "1000.5",
            "details": [{"ccy": "USDT", "availBal": "900", "eq": "1000.5"}]
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let client = OkxRestClient::new(&config(&server, false)).unwrap();
    let balance = client.balance().await.unwrap();
    assert_eq!(balance.total_eq, Some(1000.5));
    assert_eq!(balance.details[0].avail_bal, Some(900.0));

    let requests = server.received_requests().await.unwrap();
    assert_signed(&requests[0]);
    assert!(requests[0].headers.get("x-simulated-trading").is_none());
}

#[tokio::test]
async fn signature_covers_sorted_query_string() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v5/account/max-size"))
        .and(query_param("instId", INST))
        .and(query_param("tdMode", "isolated"))
        .respond_with(ok(json!([{"instId": INST, "maxBuy": "12.5", "maxSell": "11"}])))
        .mount(&server)
        .await;

    let client = OkxRestClient::new(&config(&server, false)).unwrap();
    let max = client.max_size(INST, MarginMode::Isolated).await.unwrap();
    assert_eq!(max.max_buy, Some(12.5));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(
        requests[0].url.query(),
        Some("instId=BTC-USDT-SWAP&tdMode=isolated")
    );
    assert_signed(&requests[0]);
}

#[tokio::test]
async fn post_signature_covers_exact_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v5/trade/order"))
        .and(header("x-simulated-trading", "1"))
        .respond_with(ok(json!([{"ordId": "9001", "clOrdId": "pt1", "sCode": "0", "sMsg": ""}])))
        .expect(1)
        .mount(&server)
        .await;

    let client = OkxRestClient::new(&config(&server, true)).unwrap();
    let order = OrderRequest {
        inst_id: INST.to_string(),
        td_mode: MarginMode::Isolated,
        side: OrderSide::Buy,
        ord_type: OrderType::Limit,
        sz: "1.5".to_string(),
        px: Some("100".to_string()),
        cl_ord_id: Some("pt1".to_string()),
        attach_algo_ords: Vec::new(),
    };
    let ack = client.place_order(&order).await.unwrap();
    assert_eq!(ack.ord_id, "9001");

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["instId"], INST);
    assert_eq!(body["tdMode"], "isolated");
    assert_eq!(body["sz"], "1.5");
    assert_signed(&requests[0]);
}

#[tokio::test]
async fn public_endpoints_are_not_signed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v5/market/ticker"))
        .and(query_param("instId", INST))
        .respond_with(ok(json!([{"instId": INST, "last": "43000", "sodUtc8": "42000"}])))
        .mount(&server)
        .await;

    let client = OkxRestClient::new(&ExchangeConfig {
        base_url: server.uri(),
        ..ExchangeConfig::default()
    })
    .unwrap();
    let ticker = client.ticker(INST).await.unwrap();
    assert_eq!(ticker.last, Some(43000.0));

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("OK-ACCESS-SIGN").is_none());
    assert!(requests[0].headers.get("OK-ACCESS-KEY").is_none());
}

#[tokio::test]
async fn candle_history_pages_backwards() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v5/market/candles"))
        .and(query_param("bar", "15m"))
        .and(query_param_is_missing("after"))
        .respond_with(ok(json!([
            ["1700002700000", "104", "105", "103", "104.5", "10"],
            ["1700001800000", "103", "104", "102", "103.5", "10"],
            ["1700000900000", "102", "103", "101", "102.5", "10"]
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v5/market/candles"))
        .and(query_param("after", "1700000900000"))
        .respond_with(ok(json!([
            ["1700000900000", "102", "103", "101", "102.5", "10"],
            ["1700000000000", "101", "102", "100", "101.5", "10"],
            ["bad-row"]
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = OkxRestClient::new(&config(&server, false)).unwrap();
    let candles = fetch_candle_history(&client, INST, "15m", 3, 2).await.unwrap();

    let timestamps: Vec<i64> = candles.iter().map(|c| c.timestamp).collect();
    assert_eq!(
        timestamps,
        vec![1_700_000_000, 1_700_000_900, 1_700_001_800, 1_700_002_700]
    );
    assert_eq!(candles[0].close, 101.5);
}

#[tokio::test]
async fn later_page_failure_keeps_collected_candles() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v5/market/candles"))
        .and(query_param_is_missing("after"))
        .respond_with(ok(json!([["1700000900000", "102", "103", "101", "102.5", "10"]])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v5/market/candles"))
        .and(query_param("after", "1700000900000"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let client = OkxRestClient::new(&config(&server, false)).unwrap();
    let candles = fetch_candle_history(&client, INST, "15m", 1, 3).await.unwrap();
    assert_eq!(candles.len(), 1);
}

#[tokio::test]
async fn exchange_error_code_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v5/account/positions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "code": "50113",
            "msg": "Invalid Sign",
            "data": []
        })))
        .mount(&server)
        .await;

    let client = OkxRestClient::new(&config(&server, false)).unwrap();
    match client.positions(INST).await {
        Err(GatewayError::Exchange { code, msg }) => {
            assert_eq!(code, "50113");
            assert_eq!(msg, "Invalid Sign");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn non_json_error_uses_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v5/market/ticker"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let client = OkxRestClient::new(&config(&server, false)).unwrap();
    match client.ticker(INST).await {
        Err(GatewayError::Exchange { code, msg }) => {
            assert_eq!(code, "503");
            assert_eq!(msg, "maintenance");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn rejected_order_reports_item_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v5/trade/order"))
        .respond_with(ok(json!([{"ordId": "", "clOrdId": "pt1", "sCode": "51008", "sMsg": "Insufficient balance"}])))
        .mount(&server)
        .await;

    let client = OkxRestClient::new(&config(&server, false)).unwrap();
    let order = OrderRequest {
        inst_id: INST.to_string(),
        td_mode: MarginMode::Isolated,
        side: OrderSide::Sell,
        ord_type: OrderType::Limit,
        sz: "1".to_string(),
        px: Some("100".to_string()),
        cl_ord_id: None,
        attach_algo_ords: Vec::new(),
    };
    let err = client.place_order(&order).await.unwrap_err();
    assert!(err.is_declared_rejection());
    assert!(err.to_string().contains("51008"));
}

#[tokio::test]
async fn pending_orders_request_live_state() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v5/trade/orders-pending"))
        .and(query_param("instId", INST))
        .and(query_param("state", "live"))
        .respond_with(ok(json!([{
            "ordId": "77", "instId": INST, "side": "sell", "px": "101", "sz": "2",
            "ordType": "limit", "state": "live"
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let client = OkxRestClient::new(&config(&server, false)).unwrap();
    let pending = client.pending_orders(INST).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].side, OrderSide::Sell);
}

#[tokio::test]
async fn missing_credentials_never_reach_the_exchange() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ok(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let client = OkxRestClient::new(&ExchangeConfig {
        base_url: server.uri(),
        ..ExchangeConfig::default()
    })
    .unwrap();
    let err = client.balance().await.unwrap_err();
    assert!(matches!(err, GatewayError::MissingCredentials(_)));
}
