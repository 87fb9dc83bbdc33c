//! Moving-average regime state machine.
//!
//! Three states, two signal-emitting transitions:
//!
//! ```text
//!   Below ──► Above   BUY
//!   Above ──► Below   SELL
//!   any   ──► Flat    (nothing)
//!   Flat  ──► any     (nothing)
//! ```
//!
//! A tie resets to `Flat`; it does not continue the previous regime. So
//! `Above → Flat → Below` is a bearish crossing that emits no SELL.

use serde::{Deserialize, Serialize};

use crate::domain::SignalKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Regime {
    Above,
    Below,
    Flat,
}

impl Regime {
    /// Classify one bar from its short and long moving averages.
    /// An undefined (NaN) average is `Flat`.
    pub fn classify(short: f64, long: f64) -> Self {
        if short.is_nan() || long.is_nan() {
            Regime::Flat
        } else if short > long {
            Regime::Above
        } else if short < long {
            Regime::Below
        } else {
            Regime::Flat
        }
    }

    /// Signal emitted when moving from `self` to `next`, if any.
    pub fn transition(self, next: Regime) -> Option<SignalKind> {
        match (self, next) {
            (Regime::Below, Regime::Above) => Some(SignalKind::Buy),
            (Regime::Above, Regime::Below) => Some(SignalKind::Sell),
            _ => None,
        }
    }

    /// Whether the backtest holds a long position in this regime.
    pub fn is_long(self) -> bool {
        self == Regime::Above
    }
}
