//! Moving average crossover signal: golden cross and death cross detection.
//!
//! Fires BUY when the short SMA crosses from below to above the long SMA,
//! SELL on the reverse. One pass, fresh state per call.

use crate::domain::{Bar, Signal, SMA_CROSS};
use crate::indicators::{Indicator, Sma};
use crate::params::StrategyParams;

use super::regime::Regime;

/// Per-bar regimes for a short/long SMA pair, aligned with `bars`.
///
/// Shared by the signal generator and the backtest engine so both read the
/// same classification.
pub fn regimes(bars: &[Bar], short_window: usize, long_window: usize) -> Vec<Regime> {
    let short = Sma::new(short_window).compute(bars);
    let long = Sma::new(long_window).compute(bars);
    short
        .iter()
        .zip(&long)
        .map(|(&s, &l)| Regime::classify(s, l))
        .collect()
}

/// Crossover signals for one instrument.
///
/// Returns an empty list, never an error, for empty input or input shorter
/// than the longest window.
pub fn crossover_signals(
    bars: &[Bar],
    symbol: &str,
    short_window: usize,
    long_window: usize,
) -> Vec<Signal> {
    if bars.is_empty() || bars.len() < short_window.max(long_window) {
        return Vec::new();
    }

    let regimes = regimes(bars, short_window, long_window);
    let mut signals = Vec::new();
    let mut prev = Regime::Flat;

    for (bar, &regime) in bars.iter().zip(&regimes) {
        if let Some(kind) = prev.transition(regime) {
            signals.push(Signal {
                date: bar.date,
                symbol: symbol.to_string(),
                kind,
                price: bar.close,
                strategy: SMA_CROSS.to_string(),
            });
        }
        prev = regime;
    }

    signals
}

/// Crossover signals using the windows in `params`.
pub fn generate_signals(bars: &[Bar], symbol: &str, params: &StrategyParams) -> Vec<Signal> {
    crossover_signals(bars, symbol, params.short_window, params.long_window)
}
