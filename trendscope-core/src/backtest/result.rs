//! Backtest result record.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::metrics::finite_or_zero;
use crate::domain::Signal;

/// Outcome of one long/cash SMA crossover simulation.
///
/// Every scalar and every equity-curve point is finite: values are passed
/// through [`finite_or_zero`] when the record is built, so it always
/// serializes to valid JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub initial_capital: f64,
    pub final_value: f64,
    pub total_return: f64,
    pub annualized_return: f64,
    pub sharpe_ratio: f64,
    /// Non-positive fraction in [-1, 0].
    pub max_drawdown: f64,
    /// Buy-and-hold total return over the same bars.
    pub benchmark_return: f64,
    pub bar_count: usize,
    /// Cumulative strategy multiplier per date, starting at the first bar
    /// with a defined return. Serialized with `YYYY-MM-DD` keys.
    pub equity_curve: BTreeMap<NaiveDate, f64>,
    /// Position changes in date order: BUY on cash→long, SELL on long→cash.
    pub trades: Vec<Signal>,
}

/// Raw engine output before sanitization.
#[derive(Debug, Clone)]
pub(crate) struct RawOutcome {
    pub initial_capital: f64,
    pub total_return: f64,
    pub annualized_return: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub benchmark_return: f64,
    pub bar_count: usize,
    pub equity_curve: Vec<(NaiveDate, f64)>,
    pub trades: Vec<Signal>,
}

impl From<RawOutcome> for BacktestResult {
    fn from(raw: RawOutcome) -> Self {
        let total_return = finite_or_zero(raw.total_return);
        Self {
            initial_capital: finite_or_zero(raw.initial_capital),
            final_value: finite_or_zero(raw.initial_capital * (1.0 + total_return)),
            total_return,
            annualized_return: finite_or_zero(raw.annualized_return),
            sharpe_ratio: finite_or_zero(raw.sharpe_ratio),
            max_drawdown: finite_or_zero(raw.max_drawdown),
            benchmark_return: finite_or_zero(raw.benchmark_return),
            bar_count: raw.bar_count,
            equity_curve: raw
                .equity_curve
                .into_iter()
                .map(|(date, v)| (date, finite_or_zero(v)))
                .collect(),
            trades: raw.trades,
        }
    }
}

impl BacktestResult {
    /// Last equity-curve value, or 1.0 when no return was ever defined.
    pub fn final_multiplier(&self) -> f64 {
        self.equity_curve.values().next_back().copied().unwrap_or(1.0)
    }
}
