use crate::common::math::round_to;
use crate::error::GatewayError;
use crate::execution::pricing::trigger_warnings;
use crate::models::exchange::{
    AccountBalance, AccountConfig, AmendRequest, AttachedAlgoOrder, CancelRequest,
    LeverageRequest, MarginMode, OrderAck, OrderRequest, OrderSide, OrderType, PendingOrder,
    Position,
};
use crate::models::prediction::TradeIntent;
use crate::models::signal::SignalDirection;
use crate::services::exchange::ExchangeClient;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Market execution price for attached take-profit/stop-loss legs
const MARKET_ORDER_PX: &str = "-1";

/// What to do about existing exchange state before placing a new order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PendingAction {
    /// No pending order and no open position
    Submit,
    /// Pending order already on the signal's side
    KeepExisting { ord_id: String },
    /// Pending order contradicts the signal
    Cancel { ord_id: String },
    PositionOpen,
}

/// Decide from fresh exchange state; pending orders take precedence over positions
pub fn decide_pending(
    direction: SignalDirection,
    pending: &[PendingOrder],
    positions: &[Position],
    inst_id: &str,
) -> PendingAction {
    let open_position = positions.iter().any(|p| p.is_open_for(inst_id));
    let first_pending = pending
        .iter()
        .find(|o| o.inst_id.is_empty() || o.inst_id == inst_id);

    match first_pending {
        None if !open_position => PendingAction::Submit,
        None => PendingAction::PositionOpen,
        Some(order) if OrderSide::from_signal(direction) == Some(order.side) => {
            PendingAction::KeepExisting {
                ord_id: order.ord_id.clone(),
            }
        }
        Some(order) => PendingAction::Cancel {
            ord_id: order.ord_id.clone(),
        },
    }
}

/// An order the exchange accepted
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutedOrder {
    pub size: f64,
    pub ack: OrderAck,
}

/// Sizes, signs off and submits orders for a single instrument
pub struct ExecutionGateway {
    client: Arc<dyn ExchangeClient>,
    inst_id: String,
    margin_mode: MarginMode,
    order_seq: AtomicU64,
}

impl ExecutionGateway {
    pub fn new(client: Arc<dyn ExchangeClient>, inst_id: &str) -> Self {
        Self {
            client,
            inst_id: inst_id.to_string(),
            margin_mode: MarginMode::Isolated,
            order_seq: AtomicU64::new(0),
        }
    }

    pub fn inst_id(&self) -> &str {
        &self.inst_id
    }

    pub fn client(&self) -> &Arc<dyn ExchangeClient> {
        &self.client
    }

    /// Authenticated round-trip against the balance endpoint
    pub async fn test_connection(&self) -> Result<AccountBalance, GatewayError> {
        match self.client.balance().await {
            Ok(balance) => {
                info!(
                    target: "execution",
                    total_eq = ?balance.total_eq,
                    currencies = balance.details.len(),
                    "exchange connection ok"
                );
                Ok(balance)
            }
            Err(e) => {
                error!(target: "execution", error = %e, "exchange connection failed");
                Err(e)
            }
        }
    }

    pub async fn account_config(&self) -> Result<AccountConfig, GatewayError> {
        self.client.account_config().await
    }

    pub async fn set_leverage(&self, leverage: u32) -> Result<(), GatewayError> {
        if leverage == 0 {
            return Err(GatewayError::Validation("leverage must be at least 1".to_string()));
        }
        self.client
            .set_leverage(&LeverageRequest {
                inst_id: self.inst_id.clone(),
                lever: leverage.to_string(),
                mgn_mode: self.margin_mode,
            })
            .await?;
        info!(target: "execution", inst_id = %self.inst_id, leverage, "leverage set");
        Ok(())
    }

    /// `maxBuy * ratio` rounded to the exchange's size precision
    pub async fn compute_size(&self, ratio: f64, size_decimals: u32) -> Result<f64, GatewayError> {
        validate_ratio(ratio)?;
        let max = self.client.max_size(&self.inst_id, self.margin_mode).await?;
        let max_buy = max.max_buy.unwrap_or(0.0);
        let size = round_to(max_buy * ratio, size_decimals);
        if !(size > 0.0) {
            return Err(GatewayError::Validation(format!(
                "computed size {size} is not positive (maxBuy={max_buy}, ratio={ratio})"
            )));
        }
        Ok(size)
    }

    /// Set leverage, size and place a limit order with its protective legs.
    ///
    /// Ratio and price are validated before anything reaches the exchange.
    pub async fn execute(
        &self,
        intent: &TradeIntent,
        leverage: u32,
        size_decimals: u32,
    ) -> Result<ExecutedOrder, GatewayError> {
        validate_ratio(intent.position_ratio)?;
        if !(intent.limit_price > 0.0) || !intent.limit_price.is_finite() {
            return Err(GatewayError::Validation(format!(
                "limit price {} is not positive",
                intent.limit_price
            )));
        }
        for warning in trigger_warnings(intent) {
            warn!(target: "execution", side = %intent.side, "{warning}");
        }

        self.set_leverage(leverage).await?;
        let size = self.compute_size(intent.position_ratio, size_decimals).await?;

        let order = self.build_order(intent, size);
        match self.client.place_order(&order).await {
            Ok(ack) => {
                info!(
                    target: "execution",
                    inst_id = %self.inst_id,
                    side = %intent.side,
                    size,
                    price = intent.limit_price,
                    notional = size * intent.limit_price,
                    take_profit = ?intent.take_profit,
                    stop_loss = ?intent.stop_loss,
                    ord_id = %ack.ord_id,
                    "order placed"
                );
                Ok(ExecutedOrder { size, ack })
            }
            Err(e) => {
                error!(
                    target: "execution",
                    inst_id = %self.inst_id,
                    side = %intent.side,
                    size,
                    price = intent.limit_price,
                    error = %e,
                    "order placement failed"
                );
                Err(e)
            }
        }
    }

    /// Fetch pending orders and act on them; cancels a contradicting order
    pub async fn reconcile_pending(
        &self,
        direction: SignalDirection,
        positions: &[Position],
    ) -> Result<PendingAction, GatewayError> {
        let pending = self.client.pending_orders(&self.inst_id).await?;
        let action = decide_pending(direction, &pending, positions, &self.inst_id);

        match &action {
            PendingAction::Cancel { ord_id } => {
                self.cancel(ord_id).await?;
            }
            PendingAction::KeepExisting { ord_id } => {
                info!(target: "execution", ord_id = %ord_id, "pending order matches signal, keeping it");
            }
            PendingAction::PositionOpen => {
                info!(target: "execution", inst_id = %self.inst_id, "position already open");
            }
            PendingAction::Submit => {}
        }
        Ok(action)
    }

    pub async fn cancel(&self, ord_id: &str) -> Result<OrderAck, GatewayError> {
        let ack = self
            .client
            .cancel_order(&CancelRequest {
                inst_id: self.inst_id.clone(),
                ord_id: ord_id.to_string(),
            })
            .await?;
        info!(target: "execution", ord_id, "pending order cancelled");
        Ok(ack)
    }

    pub async fn amend_order(
        &self,
        ord_id: &str,
        new_size: Option<f64>,
        new_price: Option<f64>,
    ) -> Result<OrderAck, GatewayError> {
        if new_size.is_none() && new_price.is_none() {
            return Err(GatewayError::Validation("amend needs a new size or price".to_string()));
        }
        if new_size.is_some_and(|s| !(s > 0.0)) || new_price.is_some_and(|p| !(p > 0.0)) {
            return Err(GatewayError::Validation("amended size and price must be positive".to_string()));
        }
        self.client
            .amend_order(&AmendRequest {
                inst_id: self.inst_id.clone(),
                ord_id: Some(ord_id.to_string()),
                cl_ord_id: None,
                new_sz: new_size.map(|s| s.to_string()),
                new_px: new_price.map(|p| p.to_string()),
            })
            .await
    }

    fn build_order(&self, intent: &TradeIntent, size: f64) -> OrderRequest {
        let cl_ord_id = self.next_client_order_id();
        let sz = size.to_string();
        let secs = Utc::now().timestamp();

        let mut legs = Vec::new();
        if let Some(tp) = intent.take_profit {
            legs.push(AttachedAlgoOrder {
                algo_cl_ord_id: format!("{cl_ord_id}TP{secs}"),
                sz: sz.clone(),
                tp_trigger_px: Some(tp.to_string()),
                tp_ord_px: Some(MARKET_ORDER_PX.to_string()),
                sl_trigger_px: None,
                sl_ord_px: None,
            });
        }
        if let Some(sl) = intent.stop_loss {
            legs.push(AttachedAlgoOrder {
                algo_cl_ord_id: format!("{cl_ord_id}SL{secs}"),
                sz: sz.clone(),
                tp_trigger_px: None,
                tp_ord_px: None,
                sl_trigger_px: Some(sl.to_string()),
                sl_ord_px: Some(MARKET_ORDER_PX.to_string()),
            });
        }

        OrderRequest {
            inst_id: self.inst_id.clone(),
            td_mode: self.margin_mode,
            side: intent.side,
            ord_type: OrderType::Limit,
            sz,
            px: Some(intent.limit_price.to_string()),
            cl_ord_id: Some(cl_ord_id),
            attach_algo_ords: legs,
        }
    }

    /// Alphanumeric, unique within the process
    fn next_client_order_id(&self) -> String {
        let seq = self.order_seq.fetch_add(1, Ordering::Relaxed) % 10_000;
        format!("pt{}{seq:04}", Utc::now().timestamp_millis())
    }
}

fn validate_ratio(ratio: f64) -> Result<(), GatewayError> {
    if ratio > 0.0 && ratio <= 1.0 {
        Ok(())
    } else {
        Err(GatewayError::Validation(format!(
            "position ratio {ratio} must be in (0, 1]"
        )))
    }
}
