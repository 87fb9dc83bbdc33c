//! Performance metrics: pure functions over return and equity series.
//!
//! Equity here is a cumulative multiplier (1.0 = flat since inception), not
//! a currency amount. Every function defines its degenerate cases instead of
//! returning a non-finite value.

/// Trading days per year used for annualization.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Standard deviations below this are treated as zero.
const STD_EPSILON: f64 = 1e-15;

/// Replace NaN or infinite values with 0.0.
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Simple return between two closes. A non-positive previous close has no
/// defined move and yields 0.0.
pub fn simple_return(prev_close: f64, close: f64) -> f64 {
    if prev_close > 0.0 {
        close / prev_close - 1.0
    } else {
        0.0
    }
}

/// Running product of `(1 + r)`.
pub fn cumulative(returns: &[f64]) -> Vec<f64> {
    returns
        .iter()
        .scan(1.0_f64, |acc, r| {
            *acc *= 1.0 + r;
            Some(*acc)
        })
        .collect()
}

/// Total return from a cumulative multiplier series: `last - 1`.
/// An empty series has no gain or loss.
pub fn total_return(equity: &[f64]) -> f64 {
    equity.last().map_or(0.0, |last| last - 1.0)
}

/// `(1 + total_return)^(252 / bar_count) - 1`. Zero bars → 0.0.
pub fn annualized_return(total_return: f64, bar_count: usize) -> f64 {
    if bar_count == 0 {
        return 0.0;
    }
    (1.0 + total_return).powf(TRADING_DAYS_PER_YEAR / bar_count as f64) - 1.0
}

/// Annualized Sharpe ratio of per-bar returns (zero risk-free rate).
///
/// Sharpe = mean / sample std * sqrt(252).
/// Returns 0.0 with fewer than 2 returns or zero variance.
pub fn sharpe_ratio(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let std = sample_std_dev(returns);
    if !std.is_finite() || std < STD_EPSILON {
        return 0.0;
    }
    mean(returns) / std * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Maximum drawdown of a multiplier series as a non-positive fraction.
///
/// Returns 0.0 if equity is empty, constant, or monotonically increasing.
pub fn max_drawdown(equity: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd = 0.0_f64;

    for &eq in equity {
        if eq > peak {
            peak = eq;
        }
        if peak > 0.0 {
            let dd = (eq - peak) / peak;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

/// Arithmetic mean, left-to-right accumulation. Empty → 0.0.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator). Fewer than 2 values → 0.0.
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}
