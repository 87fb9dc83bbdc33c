//! TrendScope Core: indicators, crossover signals, and backtest metrics over
//! daily OHLCV bars.
//!
//! This crate holds the pure computation layer:
//! - Domain types (bars, signals) and bar-series normalization
//! - Rolling SMA and RSI indicators
//! - SMA crossover signal generation
//! - Long/cash backtest with return, Sharpe and drawdown metrics
//!
//! Nothing here touches the filesystem or holds global state. Loading,
//! configuration and export live in `trendscope-runner`.

pub mod backtest;
pub mod data;
pub mod domain;
pub mod error;
pub mod indicators;
pub mod params;
pub mod signals;

pub use backtest::{run_backtest, BacktestResult};
pub use data::{normalize, EmptyPolicy, Normalized};
pub use domain::{Bar, RawBar, Signal, SignalKind};
pub use error::CoreError;
pub use indicators::{rsi_series, sma_series, IndicatorSeries};
pub use params::StrategyParams;
pub use signals::{crossover_signals, generate_signals};
