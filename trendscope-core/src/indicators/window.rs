//! Fixed-capacity rolling window with a running sum.
//!
//! Shared aggregation primitive for every windowed indicator. Each push is
//! O(1); the running sum is re-accumulated left to right from the buffer once
//! per full rotation so rounding drift stays bounded on long series.

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct RollingWindow {
    buf: VecDeque<f64>,
    capacity: usize,
    sum: f64,
    /// Non-finite values currently inside the window. They are excluded from
    /// `sum`; while any is present the window has no mean.
    invalid: usize,
    evictions: usize,
}

impl RollingWindow {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 1, "window capacity must be >= 1");
        Self {
            buf: VecDeque::with_capacity(capacity),
            capacity,
            sum: 0.0,
            invalid: 0,
            evictions: 0,
        }
    }

    /// Push a value, returning the one that fell out of the window (if any).
    pub fn push(&mut self, value: f64) -> Option<f64> {
        let evicted = if self.buf.len() == self.capacity {
            self.buf.pop_front()
        } else {
            None
        };

        if let Some(old) = evicted {
            if old.is_finite() {
                self.sum -= old;
            } else {
                self.invalid -= 1;
            }
            self.evictions += 1;
        }

        if value.is_finite() {
            self.sum += value;
        } else {
            self.invalid += 1;
        }
        self.buf.push_back(value);

        if self.evictions >= self.capacity {
            self.resync();
        }

        evicted
    }

    /// Arithmetic mean of the window, defined only once the window is full
    /// and holds no non-finite values.
    pub fn mean(&self) -> Option<f64> {
        if self.is_full() && self.invalid == 0 {
            Some(self.sum / self.capacity as f64)
        } else {
            None
        }
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.buf.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn resync(&mut self) {
        self.sum = self.buf.iter().filter(|v| v.is_finite()).sum();
        self.evictions = 0;
    }
}
