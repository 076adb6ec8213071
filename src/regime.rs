// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Stock Market Engine - Regime Expiry & Selection
//
// Regime state machine. Transitions happen mid-tick (Fast Rise flipping to
// Fast Fall, see tick.rs) or here, when the remaining duration runs out.
// There is no terminal regime.

use crate::config::RegimeConfig;
use crate::rng::UniformSource;
use crate::types::Mode;

/// Weighted pick table: Slow Rise and Slow Fall occupy two slots each.
pub const MODE_SLOTS: [Mode; 8] = [
    Mode::Stable,
    Mode::SlowRise,
    Mode::SlowRise,
    Mode::SlowFall,
    Mode::SlowFall,
    Mode::FastRise,
    Mode::FastFall,
    Mode::Chaotic,
];

/// Outcome of the expiry stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegimeOutcome {
    pub mode: Mode,
    pub remaining_mode_duration: u32,
    pub rolled: bool,
}

/// Count down the current regime and re-roll it once it expires.
///
/// The countdown saturates at zero, so a shock-zeroed duration expires on
/// the same tick.
pub fn advance(
    mode: Mode,
    remaining_mode_duration: u32,
    dragon_boost: f64,
    config: &RegimeConfig,
    rng: &mut impl UniformSource,
) -> RegimeOutcome {
    let remaining = remaining_mode_duration.saturating_sub(1);
    if remaining > 0 {
        return RegimeOutcome { mode, remaining_mode_duration: remaining, rolled: false };
    }

    let remaining_mode_duration = roll_duration(dragon_boost, config, rng);
    let mode = roll_mode(mode, dragon_boost, config, rng);
    RegimeOutcome { mode, remaining_mode_duration, rolled: true }
}

/// `floor(min + rand·(span − reduction·dragon_boost))`, never below 1.
pub fn roll_duration(dragon_boost: f64, config: &RegimeConfig, rng: &mut impl UniformSource) -> u32 {
    let span = config.duration_span - config.dragon_duration_reduction * dragon_boost;
    let raw = (config.min_duration as f64 + rng.next_f64() * span).floor();
    // `as` saturates; a huge negative span from extrapolated boosts lands on 0.
    (raw as u32).max(1)
}

/// Pick the next regime. Draws follow short-circuit order: the second dragon
/// gate is only drawn when the first passes.
pub fn roll_mode(
    current: Mode,
    dragon_boost: f64,
    config: &RegimeConfig,
    rng: &mut impl UniformSource,
) -> Mode {
    if rng.next_f64() < dragon_boost && rng.next_f64() < config.dragon_chaos_probability {
        return Mode::Chaotic;
    }
    if rng.next_f64() < config.fast_to_chaos_probability && current.is_trending_fast() {
        return Mode::Chaotic;
    }
    let slot = (rng.next_f64() * MODE_SLOTS.len() as f64) as usize;
    MODE_SLOTS[slot.min(MODE_SLOTS.len() - 1)]
}

/// Exclusive upper bound of a rolled duration for the given boost.
pub fn duration_upper_bound(dragon_boost: f64, config: &RegimeConfig) -> f64 {
    config.min_duration as f64 + config.duration_span - config.dragon_duration_reduction * dragon_boost
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SequenceSource;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashMap;

    #[test]
    fn test_countdown_without_roll() {
        let mut rng = SequenceSource::constant(0.5);
        let out = advance(Mode::SlowFall, 5, 0.0, &RegimeConfig::default(), &mut rng);
        assert_eq!(out, RegimeOutcome { mode: Mode::SlowFall, remaining_mode_duration: 4, rolled: false });
        assert_eq!(rng.consumed(), 0);
    }

    #[test]
    fn test_zero_duration_rolls_immediately() {
        // duration draw, dragon gate (fails at boost 0), fast gate, slot pick
        let mut rng = SequenceSource::new(vec![0.5, 0.9, 0.9, 0.0]);
        let out = advance(Mode::Chaotic, 0, 0.0, &RegimeConfig::default(), &mut rng);
        assert!(out.rolled);
        assert_eq!(out.remaining_mode_duration, 355);
        assert_eq!(out.mode, Mode::Stable);
        assert_eq!(rng.consumed(), 4);
    }

    #[test]
    fn test_dragon_gate_short_circuits() {
        // First draw 0.3 < boost 0.5 passes, second 0.2 < 0.5 picks Chaotic.
        let mut rng = SequenceSource::new(vec![0.3, 0.2]);
        let mode = roll_mode(Mode::Stable, 0.5, &RegimeConfig::default(), &mut rng);
        assert_eq!(mode, Mode::Chaotic);
        assert_eq!(rng.consumed(), 2);

        // First gate fails: only one draw before the fast gate.
        let mut rng = SequenceSource::new(vec![0.9, 0.1, 0.99]);
        let mode = roll_mode(Mode::Stable, 0.5, &RegimeConfig::default(), &mut rng);
        assert_eq!(mode, Mode::Chaotic);
        assert_eq!(rng.consumed(), 3);
    }

    #[test]
    fn test_fast_modes_tend_to_chaos() {
        let mut rng = SequenceSource::new(vec![0.9, 0.6]);
        let mode = roll_mode(Mode::FastFall, 0.0, &RegimeConfig::default(), &mut rng);
        assert_eq!(mode, Mode::Chaotic);

        // Same draws on a slow regime fall through to the weighted pick.
        let mut rng = SequenceSource::new(vec![0.9, 0.6, 0.4]);
        let mode = roll_mode(Mode::SlowRise, 0.0, &RegimeConfig::default(), &mut rng);
        assert_eq!(mode, Mode::SlowFall);
    }

    #[test]
    fn test_duration_bounds() {
        let config = RegimeConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for boost in [0.0, 0.5, 1.0] {
            let upper = duration_upper_bound(boost, &config);
            for _ in 0..10_000 {
                let d = roll_duration(boost, &config, &mut rng);
                assert!(d >= 10, "duration {} below minimum", d);
                assert!((d as f64) < upper, "duration {} reached bound {}", d, upper);
            }
        }
        assert!((duration_upper_bound(0.0, &config) - 700.0).abs() < f64::EPSILON);
        assert!((duration_upper_bound(1.0, &config) - 500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_extrapolated_boost_keeps_duration_positive() {
        let mut rng = SequenceSource::constant(0.99);
        let d = roll_duration(10.0, &RegimeConfig::default(), &mut rng);
        assert_eq!(d, 1);
    }

    #[test]
    fn test_mode_distribution_matches_weights() {
        let config = RegimeConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let n = 80_000;
        let mut counts: HashMap<Mode, u32> = HashMap::new();
        for _ in 0..n {
            *counts.entry(roll_mode(Mode::Stable, 0.0, &config, &mut rng)).or_default() += 1;
        }
        let expected = [
            (Mode::Stable, 1.0),
            (Mode::SlowRise, 2.0),
            (Mode::SlowFall, 2.0),
            (Mode::FastRise, 1.0),
            (Mode::FastFall, 1.0),
            (Mode::Chaotic, 1.0),
        ];
        for (mode, weight) in expected {
            let share = *counts.get(&mode).unwrap_or(&0) as f64 / n as f64;
            let target = weight / 8.0;
            assert!(
                (share - target).abs() < 0.01,
                "{:?}: {:.3} expected ~{:.3}", mode, share, target
            );
        }
    }
}
