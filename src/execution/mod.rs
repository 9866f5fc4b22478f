//! Order pricing, sizing, submission and pending-order reconciliation

pub mod gateway;
pub mod pricing;

pub use gateway::{decide_pending, ExecutedOrder, ExecutionGateway, PendingAction};
pub use pricing::{plan_intent, trigger_warnings};
