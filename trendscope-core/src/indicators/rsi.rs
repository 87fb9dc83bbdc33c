//! Relative Strength Index (RSI).
//!
//! Simple (not Wilder-smoothed) averages of gains and losses:
//! RSI = 100 - 100 / (1 + mean(gain) / mean(loss)) over the trailing
//! `period` close-to-close deltas.
//! Lookback: period (the first delta exists at index 1).
//! Edge case: mean(loss) == 0 → RSI = 100, including the flat-price case.

use super::window::RollingWindow;
use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let mut result = vec![f64::NAN; bars.len()];
        let mut gains = RollingWindow::new(self.period);
        let mut losses = RollingWindow::new(self.period);

        for i in 1..bars.len() {
            let delta = bars[i].close - bars[i - 1].close;
            // NaN delta stays NaN in both legs so the windows go undefined.
            let (gain, loss) = if delta.is_nan() {
                (f64::NAN, f64::NAN)
            } else {
                (delta.max(0.0), (-delta).max(0.0))
            };
            gains.push(gain);
            losses.push(loss);

            if let (Some(avg_gain), Some(avg_loss)) = (gains.mean(), losses.mean()) {
                result[i] = compute_rsi(avg_gain, avg_loss);
            }
        }

        result
    }
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    // Clamp running-sum residue; both legs are sums of non-negative values.
    let avg_gain = avg_gain.max(0.0);
    let avg_loss = avg_loss.max(0.0);
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars};

    #[test]
    fn rsi_all_gains() {
        let bars = make_bars(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0]);
        let result = Rsi::new(3).compute(&bars);
        assert_approx(result[3], 100.0, 1e-9);
        assert_approx(result[5], 100.0, 1e-9);
    }

    #[test]
    fn rsi_all_losses() {
        let bars = make_bars(&[105.0, 104.0, 103.0, 102.0, 101.0, 100.0]);
        let result = Rsi::new(3).compute(&bars);
        assert_approx(result[3], 0.0, 1e-9);
    }

    #[test]
    fn rsi_flat_prices_saturate_at_100() {
        let bars = make_bars(&[50.0; 8]);
        let result = Rsi::new(3).compute(&bars);
        assert_eq!(result[3], 100.0);
        assert_eq!(result[7], 100.0);
    }

    #[test]
    fn rsi_mixed_known_value() {
        // Changes: +0.34, -0.25, -0.48, +0.72
        // period=3 at index 3: gains = 0.34, losses = 0.73
        // RSI = 100 - 100 / (1 + 0.34/0.73)
        let bars = make_bars(&[44.0, 44.34, 44.09, 43.61, 44.33]);
        let result = Rsi::new(3).compute(&bars);

        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert!(result[2].is_nan());
        let expected = 100.0 - 100.0 / (1.0 + 0.34 / 0.73);
        assert_approx(result[3], expected, 1e-9);

        // Index 4 window: -0.25, -0.48, +0.72 → gains 0.72, losses 0.73
        let expected = 100.0 - 100.0 / (1.0 + 0.72 / 0.73);
        assert_approx(result[4], expected, 1e-9);
    }

    #[test]
    fn rsi_bounds() {
        let bars = make_bars(&[100.0, 105.0, 98.0, 110.0, 95.0, 115.0, 90.0, 120.0]);
        let result = Rsi::new(3).compute(&bars);
        for (i, &v) in result.iter().enumerate() {
            if !v.is_nan() {
                assert!(
                    (0.0..=100.0).contains(&v),
                    "RSI out of bounds at bar {i}: {v}"
                );
            }
        }
    }

    #[test]
    fn rsi_first_window_bars_undefined() {
        let bars = make_bars(&[1.0, 2.0, 1.5, 2.5, 2.0, 3.0, 2.8]);
        let result = Rsi::new(4).compute(&bars);
        assert!(result[..4].iter().all(|v| v.is_nan()));
        assert!(result[4..].iter().all(|v| !v.is_nan()));
    }

    #[test]
    fn rsi_nan_recovers_after_window() {
        let mut bars = make_bars(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0, 106.0, 107.0]);
        bars[2].close = f64::NAN;
        let result = Rsi::new(2).compute(&bars);
        // Deltas at 2 and 3 are NaN; windows covering them are undefined.
        assert!(result[2].is_nan());
        assert!(result[3].is_nan());
        assert!(result[4].is_nan());
        assert_approx(result[5], 100.0, 1e-9);
    }

    #[test]
    fn rsi_lookback() {
        assert_eq!(Rsi::new(14).lookback(), 14);
        assert_eq!(Rsi::new(14).name(), "rsi_14");
    }
}
