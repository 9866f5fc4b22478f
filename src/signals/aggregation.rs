//! Fusion of the primary RSI signal with divergence confirmation

use crate::common::math::round_to;
use crate::models::signal::{DivergenceKind, SignalDirection};

/// Base strength of a divergence reading
pub const DIVERGENCE_STRENGTH: f64 = 0.6;
/// Discount applied when divergence fires on its own
pub const EARLY_SIGNAL_FACTOR: f64 = 0.8;
/// Share of the divergence strength added when it confirms the primary signal
pub const CONFIRMATION_BOOST: f64 = 0.3;

/// Threshold-based reading before divergence is considered
#[derive(Debug, Clone, PartialEq)]
pub struct PrimarySignal {
    pub direction: SignalDirection,
    pub strength: f64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FusedSignal {
    pub direction: SignalDirection,
    pub strength: f64,
    pub reason: String,
}

/// Combine a primary signal with an optional divergence.
///
/// - divergence alone fires at `EARLY_SIGNAL_FACTOR` of its strength
/// - agreement boosts the primary strength, capped at 1.0
/// - disagreement leaves the primary signal untouched
pub fn fuse(primary: Option<PrimarySignal>, divergence: Option<DivergenceKind>) -> FusedSignal {
    let fused = match (primary, divergence) {
        (None, None) => FusedSignal {
            direction: SignalDirection::Hold,
            strength: 0.0,
            reason: "no clear signal".to_string(),
        },
        (None, Some(kind)) => FusedSignal {
            direction: kind.direction(),
            strength: DIVERGENCE_STRENGTH * EARLY_SIGNAL_FACTOR,
            reason: format!("early {}", kind.description()),
        },
        (Some(primary), Some(kind)) if primary.direction == kind.direction() => FusedSignal {
            direction: primary.direction,
            strength: (primary.strength + DIVERGENCE_STRENGTH * CONFIRMATION_BOOST).min(1.0),
            reason: format!("{} and {}, signal reinforced", primary.reason, kind.description()),
        },
        (Some(primary), _) => FusedSignal {
            direction: primary.direction,
            strength: primary.strength,
            reason: primary.reason,
        },
    };

    FusedSignal {
        strength: round_to(fused.strength, 2),
        ..fused
    }
}
