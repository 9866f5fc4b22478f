use crate::models::exchange::OrderSide;
use crate::models::prediction::{ForecastAnalysis, TradeIntent};
use crate::models::strategy::StrategyParams;

/// Price a trade against the forecast extremes.
///
/// Buys enter at the cheaper of market and forecast minimum, sells at the
/// richer of market and forecast maximum. Take-profit never goes beyond the
/// favourable forecast extreme; stop-loss is a plain ratio off the entry.
/// A zero ratio leaves the corresponding leg out.
pub fn plan_intent(
    side: OrderSide,
    last_price: f64,
    analysis: &ForecastAnalysis,
    params: &StrategyParams,
) -> TradeIntent {
    let tp_ratio = params.take_profit_ratio;
    let sl_ratio = params.stop_loss_ratio;

    let (limit_price, take_profit, stop_loss) = match side {
        OrderSide::Buy => {
            let px = if last_price < analysis.min_price {
                last_price
            } else {
                analysis.min_price
            };
            let tp = (tp_ratio > 0.0).then(|| (px * (1.0 + tp_ratio)).min(analysis.max_price));
            let sl = (sl_ratio > 0.0).then(|| px * (1.0 - sl_ratio));
            (px, tp, sl)
        }
        OrderSide::Sell => {
            let px = if last_price > analysis.max_price {
                last_price
            } else {
                analysis.max_price
            };
            let tp = (tp_ratio > 0.0).then(|| (px * (1.0 - tp_ratio)).max(analysis.min_price));
            let sl = (sl_ratio > 0.0).then(|| px * (1.0 + sl_ratio));
            (px, tp, sl)
        }
    };

    TradeIntent {
        side,
        limit_price,
        take_profit,
        stop_loss,
        position_ratio: params.max_position_ratio,
    }
}

/// Triggers sitting on the wrong side of the entry price
pub fn trigger_warnings(intent: &TradeIntent) -> Vec<String> {
    let px = intent.limit_price;
    let mut warnings = Vec::new();
    match intent.side {
        OrderSide::Buy => {
            if let Some(tp) = intent.take_profit.filter(|tp| *tp <= px) {
                warnings.push(format!("buy take-profit {tp} is not above entry {px}"));
            }
            if let Some(sl) = intent.stop_loss.filter(|sl| *sl >= px) {
                warnings.push(format!("buy stop-loss {sl} is not below entry {px}"));
            }
        }
        OrderSide::Sell => {
            if let Some(tp) = intent.take_profit.filter(|tp| *tp >= px) {
                warnings.push(format!("sell take-profit {tp} is not below entry {px}"));
            }
            if let Some(sl) = intent.stop_loss.filter(|sl| *sl <= px) {
                warnings.push(format!("sell stop-loss {sl} is not above entry {px}"));
            }
        }
    }
    warnings
}
