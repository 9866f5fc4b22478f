use perptrader::models::signal::{DivergenceKind, SignalDirection};
use perptrader::signals::aggregation::{fuse, PrimarySignal};

fn primary(direction: SignalDirection, strength: f64) -> PrimarySignal {
    PrimarySignal {
        direction,
        strength,
        reason: format!("primary {direction}"),
    }
}

#[test]
fn nothing_fires_without_inputs() {
    let fused = fuse(None, None);
    assert_eq!(fused.direction, SignalDirection::Hold);
    assert_eq!(fused.strength, 0.0);
}

#[test]
fn divergence_alone_is_an_early_signal() {
    let fused = fuse(None, Some(DivergenceKind::Bullish));
    assert_eq!(fused.direction, SignalDirection::Buy);
    assert_eq!(fused.strength, 0.48);
    assert!(fused.reason.starts_with("early"));

    let fused = fuse(None, Some(DivergenceKind::Bearish));
    assert_eq!(fused.direction, SignalDirection::Sell);
    assert_eq!(fused.strength, 0.48);
}

#[test]
fn agreement_boosts_strength() {
    let fused = fuse(
        Some(primary(SignalDirection::Buy, 0.5)),
        Some(DivergenceKind::Bullish),
    );
    assert_eq!(fused.direction, SignalDirection::Buy);
    assert_eq!(fused.strength, 0.68);
    assert!(fused.reason.contains("primary buy"));
    assert!(fused.reason.contains("bullish divergence"));
}

#[test]
fn boosted_strength_is_capped() {
    let fused = fuse(
        Some(primary(SignalDirection::Sell, 0.95)),
        Some(DivergenceKind::Bearish),
    );
    assert_eq!(fused.strength, 1.0);
}

#[test]
fn conflicting_divergence_is_ignored() {
    let fused = fuse(
        Some(primary(SignalDirection::Sell, 0.4)),
        Some(DivergenceKind::Bullish),
    );
    assert_eq!(fused.direction, SignalDirection::Sell);
    assert_eq!(fused.strength, 0.4);
    assert_eq!(fused.reason, "primary sell");
}
