//! Backtest engine: long/cash simulation of the SMA crossover strategy and
//! its performance metrics.

pub mod engine;
pub mod metrics;
pub mod result;

pub use engine::run_backtest;
pub use metrics::TRADING_DAYS_PER_YEAR;
pub use result::BacktestResult;
