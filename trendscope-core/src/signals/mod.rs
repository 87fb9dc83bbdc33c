//! Signal generator: discrete BUY/SELL events at SMA crossovers.

pub mod crossover;
pub mod regime;

pub use crossover::{crossover_signals, generate_signals, regimes};
pub use regime::Regime;
