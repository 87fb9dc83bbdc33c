//! Domain types for TrendScope

pub mod bar;
pub mod signal;

pub use bar::{Bar, BarError, RawBar};
pub use signal::{Signal, SignalKind, SMA_CROSS};

/// Symbol type alias
pub type Symbol = String;
