// Monte Carlo Infrastructure: N runs per scenario with statistical aggregation
// Each scenario runs N times with seeds base..base+N-1, computing mean ± 95% CI

use stock_market_engine::{GameEnvironment, MarketConfig, MarketError, Mode, StockMarket};
use tracing::{debug, warn};

use crate::metrics::MarketTracker;
use crate::report::*;
use crate::scenarios::Scenario;
use crate::time_series::TimeSeriesRecorder;

use std::path::Path;
use std::time::Instant;

/// Run a single scenario iteration with a specific seed.
pub fn run_single(
    scenario: &Scenario,
    seed: u64,
    base_config: &MarketConfig,
    ticks: u64,
    time_series_dir: Option<&Path>,
) -> Result<BenchResult, MarketError> {
    let start = Instant::now();

    let mut config = base_config.clone();
    if let Some(tweak) = scenario.tweak_config {
        tweak(&mut config);
    }
    let env = GameEnvironment::new(scenario.bank_level, scenario.num_brokers, scenario.dragon_boost)?;
    let mut market = StockMarket::with_default_listings(config, env, seed)?;

    let mut tracker = MarketTracker::new(market.len(), market.config().dampening.min_stock_value);
    let mut time_series = time_series_dir.map(|_| TimeSeriesRecorder::new());

    for tick in 0..ticks {
        // Apply curves
        if let Some(curve) = scenario.dragon_curve {
            let env = GameEnvironment { dragon_boost: curve(tick), ..*market.environment() };
            market.update_environment(env)?;
        }
        if let Some(schedule) = scenario.shock_schedule {
            if let Some(shock) = schedule(tick) {
                market.schedule_shock(shock)?;
            }
        }

        // Mid-scenario events (e.g., bank upgrade at tick 2000)
        if let Some(event) = &scenario.mid_event {
            event(&mut market, tick);
        }

        let report = market.tick_core();
        tracker.record_tick(&report, market.goods(), market.environment());
        if let Some(ts) = time_series.as_mut() {
            ts.record(&report, market.goods(), market.environment());
        }
    }

    // Write time series if enabled
    if let (Some(ts), Some(dir)) = (&time_series, time_series_dir) {
        let path = dir.join(format!("seed-{}.jsonl", seed));
        if let Err(e) = ts.write_jsonl(&path) {
            warn!(path = %path.display(), error = %e, "Failed to write time series");
        }
    }

    let elapsed = start.elapsed();
    let elapsed_secs = elapsed.as_secs_f64().max(0.001);

    // Evaluate pass/fail
    let criteria = &scenario.criteria;
    let mut pass = tracker.floor_violations <= criteria.max_floor_violations
        && tracker.duration_violations <= criteria.max_duration_violations;
    if let Some(min_rolls) = criteria.min_regime_rolls {
        if tracker.min_rolls() < min_rolls {
            pass = false;
        }
    }
    if let Some(max_drift) = criteria.max_mean_drift_pct {
        if tracker.mean_drift_pct() > max_drift {
            pass = false;
        }
    }
    if let Some(min_chaos) = criteria.min_chaotic_share {
        if tracker.share_of(Mode::Chaotic) < min_chaos {
            pass = false;
        }
    }

    debug!(scenario = scenario.name, seed, pass, "Run finished");

    Ok(BenchResult {
        scenario: scenario.label.to_string(),
        name: scenario.name.to_string(),
        category: scenario.category.to_string(),
        seed,
        pass,
        ticks,
        goods: market.len(),
        floor_violations: tracker.floor_violations,
        duration_violations: tracker.duration_violations,
        shocked_ticks: tracker.shocked_ticks,
        total_regime_rolls: tracker.total_rolls(),
        min_regime_rolls: tracker.min_rolls(),
        regime_changes: tracker.regime_changes,
        mode_shares: tracker.mode_shares(),
        chaotic_share: tracker.share_of(Mode::Chaotic),
        mean_value: tracker.mean_value(),
        mean_resting_value: tracker.mean_resting_value(),
        mean_drift_pct: tracker.mean_drift_pct(),
        min_value: tracker.min_value,
        max_value: tracker.max_value,
        final_total_value: market.goods().iter().map(|g| g.value).sum(),
        elapsed_ms: elapsed.as_millis(),
        ticks_per_sec: ticks as f64 / elapsed_secs,
    })
}

/// Run Monte Carlo: N runs of a scenario, aggregate stats.
pub fn run_monte_carlo(
    scenario: &Scenario,
    n_runs: usize,
    base_seed: u64,
    base_config: &MarketConfig,
    ticks_override: Option<u64>,
    time_series_base: Option<&Path>,
) -> Result<MonteCarloReport, MarketError> {
    let ts_dir = time_series_base.map(|base| base.join(scenario.name.to_lowercase()));
    let ticks = ticks_override.unwrap_or(scenario.ticks);

    let mut results = Vec::with_capacity(n_runs);
    for i in 0..n_runs {
        let seed = base_seed + i as u64;
        results.push(run_single(scenario, seed, base_config, ticks, ts_dir.as_deref())?);
    }

    Ok(aggregate(scenario, results))
}

fn stats_of(results: &[BenchResult], f: impl Fn(&BenchResult) -> f64) -> Stats {
    Stats::from_samples(&results.iter().map(f).collect::<Vec<_>>())
}

/// Aggregate individual runs into a MonteCarloReport.
fn aggregate(scenario: &Scenario, results: Vec<BenchResult>) -> MonteCarloReport {
    let n = results.len();
    let passed = results.iter().filter(|r| r.pass).count();
    let pass_rate = if n == 0 { 0.0 } else { passed as f64 / n as f64 };

    MonteCarloReport {
        scenario_name: scenario.name.to_string(),
        label: scenario.label.to_string(),
        category: scenario.category.to_string(),
        n_runs: n,
        pass_rate,
        floor_violations: stats_of(&results, |r| r.floor_violations as f64),
        duration_violations: stats_of(&results, |r| r.duration_violations as f64),
        regime_rolls: stats_of(&results, |r| r.total_regime_rolls as f64),
        regime_changes: stats_of(&results, |r| r.regime_changes as f64),
        chaotic_share: stats_of(&results, |r| r.chaotic_share),
        mean_value: stats_of(&results, |r| r.mean_value),
        mean_drift_pct: stats_of(&results, |r| r.mean_drift_pct),
        max_value: stats_of(&results, |r| r.max_value),
        elapsed_ms: stats_of(&results, |r| r.elapsed_ms as f64),
        ticks_per_sec: stats_of(&results, |r| r.ticks_per_sec),
        individual_runs: results,
    }
}
