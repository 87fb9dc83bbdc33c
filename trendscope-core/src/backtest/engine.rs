//! Long/cash SMA crossover simulation.
//!
//! Position is fully long while the short SMA is above the long SMA and cash
//! otherwise (ties and warmup included). The position decided on bar t earns
//! the market return of bar t+1.

use tracing::debug;

use super::metrics::{
    annualized_return, cumulative, max_drawdown, sharpe_ratio, simple_return, total_return,
};
use super::result::{BacktestResult, RawOutcome};
use crate::domain::{Bar, Signal, SignalKind, SMA_CROSS};
use crate::error::CoreError;
use crate::params::StrategyParams;
use crate::signals::regimes;

/// Run the SMA crossover backtest over a normalized bar series.
///
/// Fails with `EmptyInput` for no bars and `InsufficientData` for fewer bars
/// than the longest moving-average window.
pub fn run_backtest(bars: &[Bar], params: &StrategyParams) -> Result<BacktestResult, CoreError> {
    params.validate()?;
    if bars.is_empty() {
        return Err(CoreError::EmptyInput);
    }
    let required = params.required_bars();
    if bars.len() < required {
        return Err(CoreError::InsufficientData {
            required,
            available: bars.len(),
        });
    }

    let n = bars.len();
    let long: Vec<bool> = regimes(bars, params.short_window, params.long_window)
        .into_iter()
        .map(|r| r.is_long())
        .collect();

    let mut market_returns = Vec::with_capacity(n.saturating_sub(1));
    let mut strategy_returns = Vec::with_capacity(n.saturating_sub(1));
    for t in 1..n {
        let r = simple_return(bars[t - 1].close, bars[t].close);
        let held = if long[t - 1] { 1.0 } else { 0.0 };
        market_returns.push(r);
        strategy_returns.push(r * held);
    }

    let equity = cumulative(&strategy_returns);
    let benchmark = cumulative(&market_returns);
    let total = total_return(&equity);

    let outcome = RawOutcome {
        initial_capital: params.initial_capital,
        total_return: total,
        annualized_return: annualized_return(total, n),
        sharpe_ratio: sharpe_ratio(&strategy_returns),
        max_drawdown: max_drawdown(&equity),
        benchmark_return: total_return(&benchmark),
        bar_count: n,
        equity_curve: bars[1..].iter().map(|b| b.date).zip(equity).collect(),
        trades: position_changes(bars, &long),
    };
    let result = BacktestResult::from(outcome);

    debug!(
        bars = n,
        trades = result.trades.len(),
        total_return = result.total_return,
        sharpe = result.sharpe_ratio,
        max_drawdown = result.max_drawdown,
        "backtest complete"
    );

    Ok(result)
}

/// Cash→long and long→cash changes, dated on the bar the decision was made.
fn position_changes(bars: &[Bar], long: &[bool]) -> Vec<Signal> {
    let mut trades = Vec::new();
    let mut was_long = false;
    for (bar, &is_long) in bars.iter().zip(long) {
        if is_long != was_long {
            trades.push(Signal {
                date: bar.date,
                symbol: String::new(),
                kind: if is_long {
                    SignalKind::Buy
                } else {
                    SignalKind::Sell
                },
                price: bar.close,
                strategy: SMA_CROSS.to_string(),
            });
        }
        was_long = is_long;
    }
    trades
}
