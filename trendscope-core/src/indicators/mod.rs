//! Indicator engine: rolling SMA and RSI over a normalized bar series.
//!
//! Indicators are pure functions: bar history in, numeric series out, one
//! value per bar. Undefined (warmup) points are `f64::NAN` in the raw output
//! and `None` in the date-aligned [`IndicatorSeries`].

pub mod rsi;
pub mod sma;
pub mod window;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::Bar;

pub use rsi::Rsi;
pub use sma::Sma;
pub use window::RollingWindow;

/// Trait for indicators.
///
/// Implementations return a `Vec<f64>` of the same length as `bars`; the
/// first `lookback()` values are `f64::NAN`.
///
/// # Look-ahead contamination guard
/// No indicator value at bar t may depend on price data from bar t+1 or later.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_50", "rsi_14").
    fn name(&self) -> &str;

    /// Number of leading bars with no value.
    fn lookback(&self) -> usize;

    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

/// One date-aligned indicator observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

/// A named indicator series aligned 1:1 with the bar series it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSeries {
    pub name: String,
    pub lookback: usize,
    pub points: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub fn compute(indicator: &dyn Indicator, bars: &[Bar]) -> Self {
        let values = indicator.compute(bars);
        let points = bars
            .iter()
            .zip(values)
            .map(|(bar, v)| IndicatorPoint {
                date: bar.date,
                value: if v.is_nan() { None } else { Some(v) },
            })
            .collect();
        Self {
            name: indicator.name().to_string(),
            lookback: indicator.lookback(),
            points,
        }
    }

    /// Value on `date`, if the date is in the series and the value is defined.
    /// Relies on the series being date-sorted, as normalized input always is.
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .and_then(|i| self.points[i].value)
    }

    /// Most recent defined value.
    pub fn latest(&self) -> Option<f64> {
        self.points.iter().rev().find_map(|p| p.value)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn defined_count(&self) -> usize {
        self.points.iter().filter(|p| p.value.is_some()).count()
    }
}

/// Simple moving average of closes, date-aligned.
pub fn sma_series(bars: &[Bar], window: usize) -> IndicatorSeries {
    IndicatorSeries::compute(&Sma::new(window), bars)
}

/// Relative strength index of closes, date-aligned.
pub fn rsi_series(bars: &[Bar], window: usize) -> IndicatorSeries {
    IndicatorSeries::compute(&Rsi::new(window), bars)
}

/// Create synthetic bars from close prices for testing.
///
/// Generates plausible OHLV: open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let base_date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: (open.min(close) - 1.0).max(0.0),
                close,
                volume: 1000,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_aligns_dates_and_marks_warmup() {
        let bars = make_bars(&[1.0, 2.0, 3.0, 4.0]);
        let s = sma_series(&bars, 2);
        assert_eq!(s.name, "sma_2");
        assert_eq!(s.lookback, 1);
        assert_eq!(s.len(), 4);
        assert_eq!(s.points[0].value, None);
        assert_eq!(s.points[1].value, Some(1.5));
        assert_eq!(s.get(bars[3].date), Some(3.5));
        assert_eq!(s.get(bars[0].date), None);
        assert_eq!(s.defined_count(), 3);
    }

    #[test]
    fn get_missing_date() {
        let bars = make_bars(&[1.0, 2.0]);
        let s = sma_series(&bars, 1);
        let absent = bars[1].date + chrono::Duration::days(10);
        assert_eq!(s.get(absent), None);
    }

    #[test]
    fn latest_skips_undefined() {
        let mut bars = make_bars(&[1.0, 2.0, 3.0]);
        bars[2].close = f64::NAN;
        let s = sma_series(&bars, 1);
        assert_eq!(s.latest(), Some(2.0));
        assert_eq!(sma_series(&[], 3).latest(), None);
    }

    #[test]
    fn series_serializes_undefined_as_null() {
        let bars = make_bars(&[10.0, 12.0]);
        let json = serde_json::to_value(rsi_series(&bars, 1)).unwrap();
        assert!(json["points"][0]["value"].is_null());
        assert_eq!(json["points"][1]["value"], 100.0);
        assert_eq!(json["points"][1]["date"], "2024-01-03");
    }
}
