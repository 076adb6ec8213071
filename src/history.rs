// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Stock Market Engine - Price History Window

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Bounded newest-first series of post-tick values for one good.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceHistory {
    values: VecDeque<f64>,
    capacity: usize,
}

impl PriceHistory {
    /// Start a window holding only `initial`. A zero capacity is treated as 1.
    pub fn new(initial: f64, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut values = VecDeque::with_capacity(capacity + 1);
        values.push_front(initial);
        Self { values, capacity }
    }

    pub fn record(&mut self, value: f64) {
        self.values.push_front(value);
        if self.values.len() > self.capacity {
            self.values.pop_back();
        }
    }

    pub fn latest(&self) -> Option<f64> {
        self.values.front().copied()
    }

    /// Value recorded before the latest one.
    pub fn previous(&self) -> Option<f64> {
        self.values.get(1).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Newest first.
    pub fn to_vec(&self) -> Vec<f64> {
        self.values.iter().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_first_and_capped() {
        let mut h = PriceHistory::new(1.0, 3);
        for v in [2.0, 3.0, 4.0, 5.0] {
            h.record(v);
        }
        assert_eq!(h.to_vec(), vec![5.0, 4.0, 3.0]);
        assert_eq!(h.latest(), Some(5.0));
        assert_eq!(h.previous(), Some(4.0));
    }

    #[test]
    fn test_seeded_with_initial_value() {
        let h = PriceHistory::new(10.0, 65);
        assert_eq!(h.len(), 1);
        assert_eq!(h.previous(), None);
        assert_eq!(h.capacity(), 65);
    }

    #[test]
    fn test_zero_capacity_keeps_latest() {
        let mut h = PriceHistory::new(1.0, 0);
        h.record(2.0);
        assert_eq!(h.to_vec(), vec![2.0]);
    }
}
