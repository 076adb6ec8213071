// Per-Tick Metric Trackers: floor, regime and occupancy accounting
// Fed once per tick with the market's report and post-tick goods

use stock_market_engine::{GameEnvironment, Good, Mode, TickReport};

// ─── Market Tracker ─────────────────────────────────────────────────────────

/// Accumulates invariant violations and price statistics over one run.
pub struct MarketTracker {
    pub floor: f64,
    pub ticks: u64,
    pub good_ticks: u64,
    pub floor_violations: u64,
    pub duration_violations: u64,
    pub shocked_ticks: u64,
    pub regime_changes: u64,
    pub rolls_per_good: Vec<u64>,
    pub mode_counts: [u64; 6],
    pub value_sum: f64,
    pub resting_sum: f64,
    pub min_value: f64,
    pub max_value: f64,
}

impl MarketTracker {
    pub fn new(goods: usize, floor: f64) -> Self {
        Self {
            floor,
            ticks: 0,
            good_ticks: 0,
            floor_violations: 0,
            duration_violations: 0,
            shocked_ticks: 0,
            regime_changes: 0,
            rolls_per_good: vec![0; goods],
            mode_counts: [0; 6],
            value_sum: 0.0,
            resting_sum: 0.0,
            min_value: f64::INFINITY,
            max_value: f64::NEG_INFINITY,
        }
    }

    pub fn record_tick(&mut self, report: &TickReport, goods: &[Good], env: &GameEnvironment) {
        self.ticks += 1;
        if report.shock.is_some() {
            self.shocked_ticks += 1;
        }
        self.regime_changes += report.regime_changes() as u64;

        for t in &report.transitions {
            if t.regime_rolled {
                if let Some(rolls) = self.rolls_per_good.get_mut(t.id as usize) {
                    *rolls += 1;
                }
            }
        }

        for good in goods {
            self.good_ticks += 1;
            // Tolerate rounding at the clamp itself.
            if good.value < self.floor - 1e-9 {
                self.floor_violations += 1;
            }
            if good.remaining_mode_duration == 0 {
                self.duration_violations += 1;
            }
            self.mode_counts[good.mode.code() as usize] += 1;
            self.value_sum += good.value;
            self.resting_sum += good.resting_value(env);
            self.min_value = self.min_value.min(good.value);
            self.max_value = self.max_value.max(good.value);
        }
    }

    pub fn total_rolls(&self) -> u64 {
        self.rolls_per_good.iter().sum()
    }

    /// Fewest re-rolls any single good saw.
    pub fn min_rolls(&self) -> u64 {
        self.rolls_per_good.iter().copied().min().unwrap_or(0)
    }

    pub fn mode_shares(&self) -> [f64; 6] {
        let mut shares = [0.0; 6];
        if self.good_ticks == 0 {
            return shares;
        }
        for (share, count) in shares.iter_mut().zip(self.mode_counts.iter()) {
            *share = *count as f64 / self.good_ticks as f64;
        }
        shares
    }

    pub fn share_of(&self, mode: Mode) -> f64 {
        self.mode_shares()[mode.code() as usize]
    }

    pub fn mean_value(&self) -> f64 {
        if self.good_ticks == 0 { return 0.0; }
        self.value_sum / self.good_ticks as f64
    }

    pub fn mean_resting_value(&self) -> f64 {
        if self.good_ticks == 0 { return 0.0; }
        self.resting_sum / self.good_ticks as f64
    }

    /// Relative gap between mean value and mean resting value, in percent.
    pub fn mean_drift_pct(&self) -> f64 {
        let resting = self.mean_resting_value();
        if resting <= 0.0 { return 0.0; }
        (self.mean_value() - resting).abs() / resting * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stock_market_engine::{GoodTransition, MarketShock};

    fn report(rolled: bool, shock: Option<MarketShock>) -> TickReport {
        TickReport {
            tick: 1,
            shock,
            transitions: vec![GoodTransition {
                id: 0,
                previous_mode: Mode::Stable,
                mode: Mode::Chaotic,
                value: 12.0,
                change: 2.0,
                regime_rolled: rolled,
            }],
        }
    }

    #[test]
    fn test_counts_rolls_and_modes() {
        let env = GameEnvironment::default();
        let good = Good { value: 12.0, mode: Mode::Chaotic, remaining_mode_duration: 30, ..Good::new(0) };
        let mut tracker = MarketTracker::new(1, 1.0);
        tracker.record_tick(&report(true, Some(MarketShock::new(1.0, 1.0))), &[good], &env);
        tracker.record_tick(&report(false, None), &[good], &env);
        assert_eq!(tracker.total_rolls(), 1);
        assert_eq!(tracker.shocked_ticks, 1);
        assert_eq!(tracker.regime_changes, 2);
        assert!((tracker.share_of(Mode::Chaotic) - 1.0).abs() < f64::EPSILON);
        assert!((tracker.mean_drift_pct() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_flags_floor_and_duration_violations() {
        let env = GameEnvironment::default();
        let good = Good { value: 0.5, ..Good::new(0) };
        let mut tracker = MarketTracker::new(1, 1.0);
        tracker.record_tick(&report(false, None), &[good], &env);
        assert_eq!(tracker.floor_violations, 1);
        assert_eq!(tracker.duration_violations, 1);
    }
}
