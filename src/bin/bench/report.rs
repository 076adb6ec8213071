// Benchmark Report Types
// Structured output for offline analysis of price behavior across seeds

use serde::Serialize;

// ─── Statistics (per-metric Monte Carlo aggregation) ────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub mean: f64,
    pub std_dev: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub min: f64,
    pub max: f64,
    pub n: usize,
}

impl Stats {
    pub fn from_samples(samples: &[f64]) -> Self {
        let n = samples.len();
        if n == 0 {
            return Self { mean: 0.0, std_dev: 0.0, ci_lower: 0.0, ci_upper: 0.0, min: 0.0, max: 0.0, n: 0 };
        }
        let mean = samples.iter().sum::<f64>() / n as f64;
        let variance = if n > 1 {
            samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };
        let std_dev = variance.sqrt();
        let stderr = std_dev / (n as f64).sqrt();
        let z = 1.96; // 95% CI
        Self {
            mean,
            std_dev,
            ci_lower: mean - z * stderr,
            ci_upper: mean + z * stderr,
            min: samples.iter().cloned().fold(f64::INFINITY, f64::min),
            max: samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            n,
        }
    }

    pub fn half_width(&self) -> f64 {
        (self.ci_upper - self.ci_lower) / 2.0
    }
}

// ─── Single-Run Result ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct BenchResult {
    pub scenario: String,
    pub name: String,
    pub category: String,
    pub seed: u64,
    pub pass: bool,
    pub ticks: u64,
    pub goods: usize,
    pub floor_violations: u64,
    pub duration_violations: u64,
    pub shocked_ticks: u64,
    pub total_regime_rolls: u64,
    pub min_regime_rolls: u64,
    pub regime_changes: u64,
    /// Share of good-ticks spent in each mode, indexed by mode code.
    pub mode_shares: [f64; 6],
    pub chaotic_share: f64,
    pub mean_value: f64,
    pub mean_resting_value: f64,
    pub mean_drift_pct: f64,
    pub min_value: f64,
    pub max_value: f64,
    pub final_total_value: f64,
    pub elapsed_ms: u128,
    pub ticks_per_sec: f64,
}

// ─── Monte Carlo Report (per-scenario aggregation) ──────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct MonteCarloReport {
    pub scenario_name: String,
    pub label: String,
    pub category: String,
    pub n_runs: usize,
    pub pass_rate: f64,
    pub floor_violations: Stats,
    pub duration_violations: Stats,
    pub regime_rolls: Stats,
    pub regime_changes: Stats,
    pub chaotic_share: Stats,
    pub mean_value: Stats,
    pub mean_drift_pct: Stats,
    pub max_value: Stats,
    pub elapsed_ms: Stats,
    pub ticks_per_sec: Stats,
    pub individual_runs: Vec<BenchResult>,
}

// ─── Invariant Validation Summary ───────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct InvariantValidation {
    pub floor_holds: bool,
    pub durations_positive: bool,
    pub dragon_raises_chaos: bool,
    pub shocks_reroll_regimes: bool,
    pub lowest_value_seen: f64,
}

impl InvariantValidation {
    pub fn all_pass(&self) -> bool {
        self.floor_holds
            && self.durations_positive
            && self.dragon_raises_chaos
            && self.shocks_reroll_regimes
    }
}

// ─── Top-Level Report ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct BenchReport {
    pub timestamp: String,
    pub version: &'static str,
    pub prng: &'static str,
    pub n_runs_per_scenario: usize,
    pub summary: Summary,
    pub invariant_validation: InvariantValidation,
    pub scenarios: Vec<MonteCarloReport>,
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub pass_rate: f64,
}
