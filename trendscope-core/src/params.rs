//! Strategy parameters accepted by the signal generator and backtest engine.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Window sizes and capital for the SMA crossover strategy.
///
/// Passed explicitly to every operation; there is no global configuration.
/// `short_window >= long_window` is accepted and yields a well-defined,
/// if financially meaningless, result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyParams {
    pub short_window: usize,
    pub long_window: usize,
    pub rsi_window: usize,
    pub initial_capital: f64,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            short_window: 50,
            long_window: 200,
            rsi_window: 14,
            initial_capital: 10_000.0,
        }
    }
}

impl StrategyParams {
    pub fn new(short_window: usize, long_window: usize) -> Self {
        Self {
            short_window,
            long_window,
            ..Self::default()
        }
    }

    /// The longest moving-average window; the minimum bar count for a backtest.
    pub fn required_bars(&self) -> usize {
        self.short_window.max(self.long_window)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        for (name, window) in [
            ("short_window", self.short_window),
            ("long_window", self.long_window),
            ("rsi_window", self.rsi_window),
        ] {
            if window == 0 {
                return Err(CoreError::InvalidParams(format!("{name} must be >= 1")));
            }
        }
        if !self.initial_capital.is_finite() || self.initial_capital <= 0.0 {
            return Err(CoreError::InvalidParams(format!(
                "initial_capital must be positive and finite, got {}",
                self.initial_capital
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let p = StrategyParams::default();
        assert_eq!(p.short_window, 50);
        assert_eq!(p.long_window, 200);
        assert_eq!(p.rsi_window, 14);
        assert_eq!(p.initial_capital, 10_000.0);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn degenerate_windows_pass_validation() {
        let p = StrategyParams::new(200, 50);
        assert!(p.validate().is_ok());
        assert_eq!(p.required_bars(), 200);
    }

    #[test]
    fn zero_window_rejected() {
        let p = StrategyParams::new(0, 200);
        assert!(matches!(p.validate(), Err(CoreError::InvalidParams(_))));
    }

    #[test]
    fn bad_capital_rejected() {
        let p = StrategyParams {
            initial_capital: f64::NAN,
            ..StrategyParams::default()
        };
        assert!(p.validate().is_err());
        let p = StrategyParams {
            initial_capital: -5.0,
            ..StrategyParams::default()
        };
        assert!(p.validate().is_err());
    }

    #[test]
    fn partial_deserialization_fills_defaults() {
        let p: StrategyParams = serde_json::from_str(r#"{"short_window": 10}"#).unwrap();
        assert_eq!(p.short_window, 10);
        assert_eq!(p.long_window, 200);
    }
}
