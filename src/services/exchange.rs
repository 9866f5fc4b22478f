//! Exchange client interface consumed by the gateway and the cycle runtime

use crate::error::GatewayError;
use crate::models::exchange::{
    AccountBalance, AccountConfig, AmendRequest, CancelRequest, LeverageRequest, MarginMode,
    MaxSize, OrderAck, OrderRequest, PendingOrder, Position, Ticker,
};
use crate::models::indicators::{normalize_candles, Candle};
use async_trait::async_trait;
use tracing::warn;

#[async_trait]
pub trait ExchangeClient: Send + Sync {
    async fn balance(&self) -> Result<AccountBalance, GatewayError>;

    async fn positions(&self, inst_id: &str) -> Result<Vec<Position>, GatewayError>;

    async fn ticker(&self, inst_id: &str) -> Result<Ticker, GatewayError>;

    /// One page of candles, newest first as the exchange returns them.
    /// `after` is a millisecond cursor: only bars older than it are returned.
    async fn candles(
        &self,
        inst_id: &str,
        bar: &str,
        limit: u32,
        after: Option<i64>,
    ) -> Result<Vec<Candle>, GatewayError>;

    async fn max_size(&self, inst_id: &str, td_mode: MarginMode) -> Result<MaxSize, GatewayError>;

    async fn place_order(&self, order: &OrderRequest) -> Result<OrderAck, GatewayError>;

    async fn pending_orders(&self, inst_id: &str) -> Result<Vec<PendingOrder>, GatewayError>;

    async fn cancel_order(&self, request: &CancelRequest) -> Result<OrderAck, GatewayError>;

    async fn amend_order(&self, request: &AmendRequest) -> Result<OrderAck, GatewayError>;

    async fn set_leverage(&self, request: &LeverageRequest) -> Result<(), GatewayError>;

    async fn account_config(&self) -> Result<AccountConfig, GatewayError>;
}

/// Page backwards through candle history, `pages` requests at most.
///
/// Paging stops early on an empty page or a failed request; whatever was
/// collected is returned sorted ascending and de-duplicated. Only a failure of
/// the very first page is reported as an error.
pub async fn fetch_candle_history(
    client: &dyn ExchangeClient,
    inst_id: &str,
    bar: &str,
    limit: u32,
    pages: u32,
) -> Result<Vec<Candle>, GatewayError> {
    let mut collected: Vec<Candle> = Vec::new();
    let mut after: Option<i64> = None;

    for page in 0..pages.max(1) {
        let batch = match client.candles(inst_id, bar, limit, after).await {
            Ok(batch) => batch,
            Err(e) if page == 0 => return Err(e),
            Err(e) => {
                warn!(target: "okx", inst_id, page, error = %e, "candle paging stopped early");
                break;
            }
        };

        let Some(oldest) = batch.iter().map(|c| c.timestamp).min() else {
            break;
        };
        let next_after = oldest * 1000;
        if after.is_some_and(|prev| next_after >= prev) {
            collected.extend(batch);
            break;
        }

        collected.extend(batch);
        after = Some(next_after);
    }

    Ok(normalize_candles(collected))
}
