// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Stock Market Engine - Resting Value & Price Bounds

use crate::config::DampeningConfig;

const RESTING_BASE: f64 = 10.0;
const RESTING_PER_ID: f64 = 10.0;
const RESTING_PER_BANK_LEVEL: f64 = 1.0;

/// Equilibrium price a good drifts toward: `10 + 10·id + (bank_level − 1)`.
///
/// A `bank_level` of 0 is treated as 1.
pub fn resting_value(id: u32, bank_level: u32) -> f64 {
    let levels_above_first = bank_level.max(1) - 1;
    RESTING_BASE + RESTING_PER_ID * id as f64 + RESTING_PER_BANK_LEVEL * levels_above_first as f64
}

/// Price above which upward momentum is damped: `100 + (bank_level − 1)·3` by default.
pub fn value_ceiling(bank_level: u32, dampening: &DampeningConfig) -> f64 {
    let levels_above_first = bank_level.max(1) - 1;
    dampening.ceiling_base + dampening.ceiling_per_bank_level * levels_above_first as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resting_value_scenarios() {
        assert!((resting_value(0, 1) - 10.0).abs() < f64::EPSILON);
        assert!((resting_value(5, 3) - 62.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_resting_value_monotonic() {
        for id in 0..20 {
            for level in 1..20 {
                assert!(resting_value(id + 1, level) > resting_value(id, level));
                assert!(resting_value(id, level + 1) > resting_value(id, level));
            }
        }
    }

    #[test]
    fn test_resting_value_clamps_bank_level_zero() {
        assert_eq!(resting_value(2, 0), resting_value(2, 1));
    }

    #[test]
    fn test_value_ceiling() {
        let dampening = DampeningConfig::default();
        assert!((value_ceiling(1, &dampening) - 100.0).abs() < f64::EPSILON);
        assert!((value_ceiling(11, &dampening) - 130.0).abs() < f64::EPSILON);
    }
}
