//! Signal: a discrete BUY/SELL event emitted at a crossover.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Strategy name attached to every moving-average crossover event.
pub const SMA_CROSS: &str = "SMA_CROSS";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalKind {
    Buy,
    Sell,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalKind::Buy => write!(f, "BUY"),
            SignalKind::Sell => write!(f, "SELL"),
        }
    }
}

/// A trade signal. Created once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub date: NaiveDate,
    pub symbol: String,
    pub kind: SignalKind,
    /// Close of the bar the event fired on.
    pub price: f64,
    pub strategy: String,
}
