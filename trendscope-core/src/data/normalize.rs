//! Bar series normalization: validate, sort, de-duplicate.
//!
//! Raw bars arrive in provider order, possibly unsorted, duplicated, or with
//! missing fields. The normalizer produces the canonical series every other
//! component consumes: strictly increasing dates, one bar per date.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;

use crate::domain::{Bar, BarError, RawBar};
use crate::error::CoreError;

/// Whether an empty normalized series is acceptable to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyPolicy {
    Allow,
    Reject,
}

/// A raw bar dropped during normalization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejection {
    /// Position in the raw input.
    pub index: usize,
    pub date: Option<NaiveDate>,
    #[serde(serialize_with = "serialize_display")]
    pub reason: BarError,
}

/// Output of [`normalize`].
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub bars: Vec<Bar>,
    pub rejected: Vec<Rejection>,
}

impl Normalized {
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

/// Normalize a raw bar collection.
///
/// - Bars failing their field invariants are dropped and reported.
/// - The survivors are sorted ascending by date.
/// - Duplicate dates collapse to the last well-formed bar in input order.
///
/// Fails with `CoreError::MalformedBar` only when the result is empty and
/// `policy` is `EmptyPolicy::Reject`.
pub fn normalize<I>(raw: I, policy: EmptyPolicy) -> Result<Normalized, CoreError>
where
    I: IntoIterator<Item = RawBar>,
{
    let mut by_date: BTreeMap<NaiveDate, Bar> = BTreeMap::new();
    let mut rejected = Vec::new();
    let mut received = 0usize;

    for (index, raw_bar) in raw.into_iter().enumerate() {
        received += 1;
        let date = raw_bar.date;
        match raw_bar.into_bar() {
            // Insert overwrites: last write wins.
            Ok(bar) => {
                by_date.insert(bar.date, bar);
            }
            Err(reason) => {
                warn!(index, ?date, %reason, "rejected malformed bar");
                rejected.push(Rejection {
                    index,
                    date,
                    reason,
                });
            }
        }
    }

    let bars: Vec<Bar> = by_date.into_values().collect();

    if bars.is_empty() && policy == EmptyPolicy::Reject {
        return Err(CoreError::MalformedBar(format!(
            "no usable bars after normalization ({received} received, {} rejected)",
            rejected.len()
        )));
    }

    Ok(Normalized { bars, rejected })
}

/// Check that an already-built series satisfies the canonical ordering:
/// strictly increasing dates.
pub fn is_canonical(bars: &[Bar]) -> bool {
    bars.windows(2).all(|w| w[0].date < w[1].date)
}

fn serialize_display<S>(value: &BarError, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_str(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(day: u32, close: f64) -> RawBar {
        RawBar {
            date: NaiveDate::from_ymd_opt(2024, 1, day),
            open: Some(close),
            high: Some(close + 1.0),
            low: Some(close - 1.0),
            close: Some(close),
            volume: Some(1000),
        }
    }

    #[test]
    fn sorts_by_date() {
        let out = normalize(vec![raw(3, 103.0), raw(1, 101.0), raw(2, 102.0)], EmptyPolicy::Allow)
            .unwrap();
        let closes: Vec<f64> = out.bars.iter().map(|b| b.close).collect();
        assert_eq!(closes, vec![101.0, 102.0, 103.0]);
        assert!(is_canonical(&out.bars));
        assert!(out.rejected.is_empty());
    }

    #[test]
    fn duplicate_dates_last_write_wins() {
        let out = normalize(
            vec![raw(1, 100.0), raw(2, 200.0), raw(1, 150.0)],
            EmptyPolicy::Allow,
        )
        .unwrap();
        assert_eq!(out.bars.len(), 2);
        assert_eq!(out.bars[0].close, 150.0);
        assert_eq!(out.bars[1].close, 200.0);
    }

    #[test]
    fn malformed_duplicate_does_not_overwrite() {
        let mut bad = raw(1, 150.0);
        bad.high = Some(10.0); // below low
        let out = normalize(vec![raw(1, 100.0), bad], EmptyPolicy::Allow).unwrap();
        assert_eq!(out.bars.len(), 1);
        assert_eq!(out.bars[0].close, 100.0);
        assert_eq!(out.rejected.len(), 1);
        assert_eq!(out.rejected[0].index, 1);
    }

    #[test]
    fn missing_field_is_rejected() {
        let mut missing = raw(2, 102.0);
        missing.volume = None;
        let out = normalize(vec![raw(1, 101.0), missing], EmptyPolicy::Allow).unwrap();
        assert_eq!(out.bars.len(), 1);
        assert_eq!(out.rejected[0].reason, BarError::MissingField("volume"));
    }

    #[test]
    fn missing_date_is_rejected() {
        let mut missing = raw(2, 102.0);
        missing.date = None;
        let out = normalize(vec![missing], EmptyPolicy::Allow).unwrap();
        assert!(out.is_empty());
        assert_eq!(out.rejected[0].reason, BarError::MissingField("date"));
    }

    #[test]
    fn empty_allowed() {
        let out = normalize(Vec::new(), EmptyPolicy::Allow).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn empty_rejected_when_required() {
        let result = normalize(Vec::new(), EmptyPolicy::Reject);
        assert!(matches!(result, Err(CoreError::MalformedBar(_))));
    }

    #[test]
    fn all_malformed_rejected_when_required() {
        let mut bad = raw(1, 100.0);
        bad.close = Some(f64::INFINITY);
        let result = normalize(vec![bad], EmptyPolicy::Reject);
        assert!(matches!(result, Err(CoreError::MalformedBar(_))));
    }

    #[test]
    fn rejection_serializes_reason_as_text() {
        let mut bad = raw(1, 100.0);
        bad.open = None;
        let out = normalize(vec![bad], EmptyPolicy::Allow).unwrap();
        let json = serde_json::to_value(&out.rejected[0]).unwrap();
        assert_eq!(json["reason"], "missing required field 'open'");
    }
}
