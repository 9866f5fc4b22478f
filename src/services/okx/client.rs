use crate::config::{ExchangeConfig, ExchangeCredentials};
use crate::error::GatewayError;
use crate::models::exchange::{
    AccountBalance, AccountConfig, AmendRequest, CancelRequest, LeverageRequest, MarginMode,
    MaxSize, OrderAck, OrderRequest, PendingOrder, Position, Ticker,
};
use crate::models::indicators::Candle;
use crate::services::exchange::ExchangeClient;
use crate::services::okx::messages::{parse_candle_row, Envelope};
use crate::services::okx::signing::{
    self, HEADER_KEY, HEADER_PASSPHRASE, HEADER_SIGN, HEADER_SIMULATED, HEADER_TIMESTAMP,
};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

const BALANCE_PATH: &str = "/api/v5/account/balance";
const POSITIONS_PATH: &str = "/api/v5/account/positions";
const TICKER_PATH: &str = "/api/v5/market/ticker";
const CANDLES_PATH: &str = "/api/v5/market/candles";
const MAX_SIZE_PATH: &str = "/api/v5/account/max-size";
const PLACE_ORDER_PATH: &str = "/api/v5/trade/order";
const PENDING_ORDERS_PATH: &str = "/api/v5/trade/orders-pending";
const CANCEL_ORDER_PATH: &str = "/api/v5/trade/cancel-order";
const AMEND_ORDER_PATH: &str = "/api/v5/trade/amend-order";
const SET_LEVERAGE_PATH: &str = "/api/v5/account/set-leverage";
const ACCOUNT_CONFIG_PATH: &str = "/api/v5/account/config";

/// Signed REST client for the OKX v5 API
#[derive(Debug, Clone)]
pub struct OkxRestClient {
    http: reqwest::Client,
    base_url: String,
    credentials: ExchangeCredentials,
    simulated_trading: bool,
}

impl OkxRestClient {
    pub fn new(config: &ExchangeConfig) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials: config.credentials.clone(),
            simulated_trading: config.simulated_trading,
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
        private: bool,
    ) -> Result<Vec<T>, GatewayError> {
        let query = signing::sorted_query(params)?;
        let request_path = signing::request_path(path, &query);
        self.send(Method::GET, &request_path, String::new(), private)
            .await
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Vec<T>, GatewayError> {
        let body = serde_json::to_string(body)?;
        self.send(Method::POST, path, body, true).await
    }

    /// The signed body is the exact string sent on the wire
    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        request_path: &str,
        body: String,
        private: bool,
    ) -> Result<Vec<T>, GatewayError> {
        let url = format!("{}{}", self.base_url, request_path);
        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(CONTENT_TYPE, "application/json");

        if private {
            if !self.credentials.is_complete() {
                return Err(GatewayError::MissingCredentials(request_path.to_string()));
            }
            let ts = signing::timestamp(Utc::now());
            let signature = signing::sign(
                &self.credentials.secret_key,
                &ts,
                method.as_str(),
                request_path,
                &body,
            )?;
            request = request
                .header(HEADER_KEY, &self.credentials.api_key)
                .header(HEADER_SIGN, signature)
                .header(HEADER_TIMESTAMP, ts)
                .header(HEADER_PASSPHRASE, &self.credentials.passphrase);
        }
        if self.simulated_trading {
            request = request.header(HEADER_SIMULATED, "1");
        }
        if !body.is_empty() {
            request = request.body(body);
        }

        debug!(target: "okx", method = %method, path = request_path, "sending request");
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        let envelope: Envelope = match serde_json::from_str(&text) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(GatewayError::Exchange {
                    code: status.as_u16().to_string(),
                    msg: text,
                });
            }
            Err(e) => return Err(e.into()),
        };

        envelope.into_data().map_err(|e| {
            warn!(target: "okx", path = request_path, error = %e, "request failed");
            e
        })
    }

    fn single_ack(acks: Vec<OrderAck>, action: &str) -> Result<OrderAck, GatewayError> {
        let ack = acks.into_iter().next().ok_or_else(|| GatewayError::Exchange {
            code: "empty".to_string(),
            msg: format!("{action} returned no result"),
        })?;
        if !ack.is_success() {
            return Err(GatewayError::Exchange {
                code: ack.s_code,
                msg: ack.s_msg,
            });
        }
        Ok(ack)
    }
}

#[async_trait]
impl ExchangeClient for OkxRestClient {
    async fn balance(&self) -> Result<AccountBalance, GatewayError> {
        let balances: Vec<AccountBalance> = self.get(BALANCE_PATH, &[], true).await?;
        Ok(balances.into_iter().next().unwrap_or_default())
    }

    async fn positions(&self, inst_id: &str) -> Result<Vec<Position>, GatewayError> {
        self.get(POSITIONS_PATH, &[("instId", inst_id.to_string())], true)
            .await
    }

    async fn ticker(&self, inst_id: &str) -> Result<Ticker, GatewayError> {
        let tickers: Vec<Ticker> = self
            .get(TICKER_PATH, &[("instId", inst_id.to_string())], false)
            .await?;
        tickers.into_iter().next().ok_or_else(|| GatewayError::Exchange {
            code: "empty".to_string(),
            msg: format!("no ticker for {inst_id}"),
        })
    }

    async fn candles(
        &self,
        inst_id: &str,
        bar: &str,
        limit: u32,
        after: Option<i64>,
    ) -> Result<Vec<Candle>, GatewayError> {
        let mut params = vec![
            ("instId", inst_id.to_string()),
            ("bar", bar.to_string()),
            ("limit", limit.to_string()),
        ];
        if let Some(after) = after {
            params.push(("after", after.to_string()));
        }

        let rows: Vec<Vec<Value>> = self.get(CANDLES_PATH, &params, false).await?;
        let total = rows.len();
        let candles: Vec<Candle> = rows.iter().filter_map(|row| parse_candle_row(row)).collect();
        if candles.len() < total {
            warn!(
                target: "okx",
                skipped = total - candles.len(),
                "skipped malformed candle rows"
            );
        }
        Ok(candles)
    }

    async fn max_size(&self, inst_id: &str, td_mode: MarginMode) -> Result<MaxSize, GatewayError> {
        let sizes: Vec<MaxSize> = self
            .get(
                MAX_SIZE_PATH,
                &[
                    ("instId", inst_id.to_string()),
                    ("tdMode", td_mode.as_str().to_string()),
                ],
                true,
            )
            .await?;
        Ok(sizes.into_iter().next().unwrap_or_default())
    }

    async fn place_order(&self, order: &OrderRequest) -> Result<OrderAck, GatewayError> {
        let acks = self.post(PLACE_ORDER_PATH, order).await?;
        Self::single_ack(acks, "place order")
    }

    async fn pending_orders(&self, inst_id: &str) -> Result<Vec<PendingOrder>, GatewayError> {
        self.get(
            PENDING_ORDERS_PATH,
            &[("instId", inst_id.to_string()), ("state", "live".to_string())],
            true,
        )
        .await
    }

    async fn cancel_order(&self, request: &CancelRequest) -> Result<OrderAck, GatewayError> {
        let acks = self.post(CANCEL_ORDER_PATH, request).await?;
        Self::single_ack(acks, "cancel order")
    }

    async fn amend_order(&self, request: &AmendRequest) -> Result<OrderAck, GatewayError> {
        let acks = self.post(AMEND_ORDER_PATH, request).await?;
        Self::single_ack(acks, "amend order")
    }

    async fn set_leverage(&self, request: &LeverageRequest) -> Result<(), GatewayError> {
        let _: Vec<Value> = self.post(SET_LEVERAGE_PATH, request).await?;
        Ok(())
    }

    async fn account_config(&self) -> Result<AccountConfig, GatewayError> {
        let configs: Vec<AccountConfig> = self.get(ACCOUNT_CONFIG_PATH, &[], true).await?;
        Ok(configs.into_iter().next().unwrap_or_default())
    }
}
