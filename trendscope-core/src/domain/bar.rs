//! Bar: the fundamental market data unit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OHLCV bar for a single instrument on a single day.
///
/// Bars are immutable once normalized. The indicator, signal, and backtest
/// operations read them through `&[Bar]` and never retain a reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Why a bar failed its field invariants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BarError {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("field '{field}' is not finite ({value})")]
    NonFinite { field: &'static str, value: f64 },

    #[error("field '{field}' is negative ({value})")]
    Negative { field: &'static str, value: f64 },

    #[error("OHLC violation: {0}")]
    OhlcViolation(String),
}

impl Bar {
    /// Check the field invariants: finite non-negative prices and
    /// `low <= {open, close} <= high`.
    pub fn validate(&self) -> Result<(), BarError> {
        for (field, value) in [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ] {
            if !value.is_finite() {
                return Err(BarError::NonFinite { field, value });
            }
            if value < 0.0 {
                return Err(BarError::Negative { field, value });
            }
        }

        if self.low > self.high {
            return Err(BarError::OhlcViolation(format!(
                "low {} > high {}",
                self.low, self.high
            )));
        }
        for (field, value) in [("open", self.open), ("close", self.close)] {
            if value < self.low || value > self.high {
                return Err(BarError::OhlcViolation(format!(
                    "{field} {value} outside [{}, {}]",
                    self.low, self.high
                )));
            }
        }
        Ok(())
    }

    /// Convenience predicate over [`Bar::validate`].
    pub fn is_sane(&self) -> bool {
        self.validate().is_ok()
    }
}

/// Provider-facing bar shape, before normalization.
///
/// Every field is optional so a provider response with a missing or empty
/// cell is representable; the normalizer rejects such bars.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub open: Option<f64>,
    #[serde(default)]
    pub high: Option<f64>,
    #[serde(default)]
    pub low: Option<f64>,
    #[serde(default)]
    pub close: Option<f64>,
    #[serde(default)]
    pub volume: Option<u64>,
}

impl RawBar {
    /// Convert into a validated `Bar`, reporting the first violation found.
    pub fn into_bar(self) -> Result<Bar, BarError> {
        let bar = Bar {
            date: self.date.ok_or(BarError::MissingField("date"))?,
            open: self.open.ok_or(BarError::MissingField("open"))?,
            high: self.high.ok_or(BarError::MissingField("high"))?,
            low: self.low.ok_or(BarError::MissingField("low"))?,
            close: self.close.ok_or(BarError::MissingField("close"))?,
            volume: self.volume.ok_or(BarError::MissingField("volume"))?,
        };
        bar.validate()?;
        Ok(bar)
    }
}

impl From<Bar> for RawBar {
    fn from(bar: Bar) -> Self {
        Self {
            date: Some(bar.date),
            open: Some(bar.open),
            high: Some(bar.high),
            low: Some(bar.low),
            close: Some(bar.close),
            volume: Some(bar.volume),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bar() -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            open: 100.0,
            high: 105.0,
            low: 98.0,
            close: 103.0,
            volume: 50_000,
        }
    }

    #[test]
    fn bar_is_sane() {
        assert!(sample_bar().is_sane());
    }

    #[test]
    fn bar_detects_nan() {
        let mut bar = sample_bar();
        bar.open = f64::NAN;
        assert!(matches!(
            bar.validate(),
            Err(BarError::NonFinite { field: "open", .. })
        ));
    }

    #[test]
    fn bar_detects_insane_high_low() {
        let mut bar = sample_bar();
        bar.high = 97.0; // below low
        assert!(matches!(bar.validate(), Err(BarError::OhlcViolation(_))));
    }

    #[test]
    fn bar_detects_close_above_high() {
        let mut bar = sample_bar();
        bar.close = 106.0;
        assert!(!bar.is_sane());
    }

    #[test]
    fn bar_detects_negative_price() {
        let bar = Bar {
            open: -1.0,
            low: -2.0,
            ..sample_bar()
        };
        assert!(matches!(bar.validate(), Err(BarError::Negative { .. })));
    }

    #[test]
    fn zero_prices_are_allowed() {
        let bar = Bar {
            open: 0.0,
            high: 0.0,
            low: 0.0,
            close: 0.0,
            ..sample_bar()
        };
        assert!(bar.is_sane());
    }

    #[test]
    fn raw_bar_missing_close_is_rejected() {
        let raw = RawBar {
            close: None,
            ..RawBar::from(sample_bar())
        };
        assert_eq!(raw.into_bar(), Err(BarError::MissingField("close")));
    }

    #[test]
    fn raw_bar_round_trips_through_bar() {
        let bar = sample_bar();
        assert_eq!(RawBar::from(bar.clone()).into_bar(), Ok(bar));
    }

    #[test]
    fn raw_bar_deserializes_with_absent_fields() {
        let raw: RawBar = serde_json::from_str(r#"{"date":"2024-01-02","close":101.5}"#).unwrap();
        assert_eq!(raw.close, Some(101.5));
        assert_eq!(raw.open, None);
        assert_eq!(raw.volume, None);
    }
}
