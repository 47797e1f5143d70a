//! Bounded FIFO window of recent samples.
//!
//! Statistics are recomputed on read over at most `capacity` values, so they
//! always describe exactly the samples currently held and never any evicted
//! history.

use std::collections::VecDeque;

/// A fixed-capacity window of scalar samples.
///
/// When full, pushing evicts the oldest value first.
#[derive(Clone, Debug)]
pub struct RollingWindow {
    values: VecDeque<f64>,
    capacity: usize,
}

impl RollingWindow {
    /// Create an empty window. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a value, evicting the oldest if the window is full.
    pub fn push(&mut self, value: f64) {
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    /// Number of values currently held.
    pub fn count(&self) -> usize {
        self.values.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.values.len() == self.capacity
    }

    /// Held values, oldest first.
    pub fn values(&self) -> impl ExactSizeIterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    /// Most recently pushed value.
    pub fn latest(&self) -> Option<f64> {
        self.values.back().copied()
    }

    /// Arithmetic mean, or `None` when empty.
    pub fn mean(&self) -> Option<f64> {
        self.moments().map(|(mean, _)| mean)
    }

    /// Population variance (sum of squared deviations divided by n).
    pub fn variance(&self) -> Option<f64> {
        self.moments().map(|(_, variance)| variance)
    }

    /// Population standard deviation, or `None` when empty.
    pub fn stddev(&self) -> Option<f64> {
        self.variance().map(f64::sqrt)
    }

    /// Mean and population variance, accumulated relative to the oldest held
    /// value. A window of identical values yields exactly that value and 0.
    fn moments(&self) -> Option<(f64, f64)> {
        let origin = *self.values.front()?;
        let n = self.values.len() as f64;
        let offset = self.values.iter().map(|v| v - origin).sum::<f64>() / n;
        let variance = self
            .values
            .iter()
            .map(|v| (v - origin - offset).powi(2))
            .sum::<f64>()
            / n;
        Some((origin + offset, variance))
    }

    /// Drop every held value; capacity is unchanged.
    pub fn clear(&mut self) {
        self.values.clear();
    }
}
