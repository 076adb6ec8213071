// Stock Market Benchmark Runner v0.1.0: Monte Carlo price-engine validation
// Seeded ChaCha8Rng per run, invariant tracking, optional per-tick JSONL output
//
// Usage:
//   cargo run --release --bin bench                        # Run all scenarios (30 runs each)
//   cargo run --release --bin bench -- --runs 5            # Quick mode (5 runs each)
//   cargo run --release --bin bench -- DRAGON              # Filter by name, label or category
//   cargo run --release --bin bench -- --time-series       # Enable JSONL output
//   cargo run --release --bin bench -- --seed 42           # Custom base seed
//   cargo run --release --bin bench -- --ticks 1000        # Override every scenario's length
//   cargo run --release --bin bench -- --config cfg.json   # Partial MarketConfig override
//
// Log verbosity follows RUST_LOG (default: info, engine at warn).

mod report;
mod scenarios;
mod monte_carlo;
mod metrics;
mod time_series;

use report::*;
use scenarios::*;
use stock_market_engine::MarketConfig;
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const PASS_THRESHOLD: f64 = 0.933;

// ─── CLI Parsing ────────────────────────────────────────────────────────────

struct CliArgs {
    runs: usize,
    seed: u64,
    ticks: Option<u64>,
    time_series: bool,
    config: Option<PathBuf>,
    filter: Option<String>,
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut cli = CliArgs {
        runs: 30,
        seed: 0,
        ticks: None,
        time_series: false,
        config: None,
        filter: None,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--runs" => {
                i += 1;
                if i < args.len() {
                    cli.runs = args[i].parse().unwrap_or(30);
                }
            }
            "--seed" => {
                i += 1;
                if i < args.len() {
                    cli.seed = args[i].parse().unwrap_or(0);
                }
            }
            "--ticks" => {
                i += 1;
                if i < args.len() {
                    cli.ticks = args[i].parse().ok();
                }
            }
            "--config" => {
                i += 1;
                if i < args.len() {
                    cli.config = Some(PathBuf::from(&args[i]));
                }
            }
            "--time-series" => {
                cli.time_series = true;
            }
            arg if !arg.starts_with('-') => {
                cli.filter = Some(arg.to_string());
            }
            _ => {
                warn!(argument = %args[i], "Unknown argument");
            }
        }
        i += 1;
    }

    cli
}

fn load_config(path: Option<&Path>) -> Result<MarketConfig, String> {
    let Some(path) = path else {
        return Ok(MarketConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    MarketConfig::from_json(&json).map_err(|e| format!("invalid config {}: {}", path.display(), e))
}

fn find<'a>(reports: &'a [MonteCarloReport], name: &str) -> Option<&'a MonteCarloReport> {
    reports.iter().find(|r| r.scenario_name == name)
}

fn pass_label(ok: bool) -> &'static str {
    if ok { "PASS" } else { "FAIL" }
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,stock_market_engine=warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = parse_args();
    let base_config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };
    let all_scenarios = scenarios();

    let to_run: Vec<&Scenario> = match &cli.filter {
        Some(f) => {
            let f_lower = f.to_lowercase();
            all_scenarios.iter()
                .filter(|s| s.name.to_lowercase().contains(&f_lower)
                          || s.label.to_lowercase().contains(&f_lower)
                          || s.category.to_lowercase().contains(&f_lower))
                .collect()
        }
        None => all_scenarios.iter().collect(),
    };

    if to_run.is_empty() {
        error!(filter = ?cli.filter, "No scenarios match filter");
        std::process::exit(1);
    }

    let ts_dir = cli.time_series.then(|| PathBuf::from("benchmark-results/time-series"));

    info!(runs = cli.runs, seed = cli.seed, scenarios = to_run.len(), "Starting benchmark");
    println!("\n  Stock Market Benchmark Runner v0.1.0");
    println!("  PRNG: ChaCha8Rng | Runs/scenario: {} | Base seed: {}", cli.runs, cli.seed);
    println!("  Running {} scenario(s)...\n", to_run.len());
    println!("  {:<30} {:>5} {:>6} {:>10} {:>8} {:>13} {:>8} {:>7}",
        "Scenario", "Pass%", "Floor", "Rolls", "Chaos%", "Mean value", "Drift%", "Time");
    println!("  {}", "-".repeat(96));

    let suite_start = Instant::now();
    let mut mc_reports = Vec::new();

    for scenario in &to_run {
        let report = match monte_carlo::run_monte_carlo(
            scenario,
            cli.runs,
            cli.seed,
            &base_config,
            cli.ticks,
            ts_dir.as_deref(),
        ) {
            Ok(report) => report,
            Err(e) => {
                error!(scenario = scenario.name, error = %e, "Scenario could not be built");
                std::process::exit(1);
            }
        };

        let pass_pct = report.pass_rate * 100.0;
        let status = pass_label(report.pass_rate >= PASS_THRESHOLD);

        println!("  {:<30} {:>4}% {:>6.0} {:>10.0} {:>7.1}% {:>7.1}±{:<5.1} {:>7.1}% {:>5.0}ms  {}",
            report.label,
            pass_pct as u32,
            report.floor_violations.max,
            report.regime_rolls.mean,
            report.chaotic_share.mean * 100.0,
            report.mean_value.mean, report.mean_value.half_width(),
            report.mean_drift_pct.mean,
            report.elapsed_ms.mean,
            status,
        );

        mc_reports.push(report);
    }

    let suite_elapsed = suite_start.elapsed();

    // ─── Invariant Validation ───────────────────────────────────────────

    let floor_holds = mc_reports.iter().all(|r| r.floor_violations.max == 0.0);
    let durations_positive = mc_reports.iter().all(|r| r.duration_violations.max == 0.0);
    let lowest_value_seen = mc_reports.iter()
        .flat_map(|r| r.individual_runs.iter().map(|run| run.min_value))
        .fold(f64::INFINITY, f64::min);

    // Only compared when both sides of the pair were run
    let calm = find(&mc_reports, "CALM_MARKET");
    let dragon_raises_chaos = match (calm, find(&mc_reports, "DRAGON_FULL")) {
        (Some(calm), Some(dragon)) => dragon.chaotic_share.mean > calm.chaotic_share.mean,
        _ => true,
    };
    let shocks_reroll_regimes = match (calm, find(&mc_reports, "MARKET_CRASH")) {
        (Some(calm), Some(crash)) if crash.individual_runs.iter().any(|r| r.shocked_ticks > 0) => {
            crash.regime_rolls.mean > calm.regime_rolls.mean
        }
        _ => true,
    };

    let validation = InvariantValidation {
        floor_holds,
        durations_positive,
        dragon_raises_chaos,
        shocks_reroll_regimes,
        lowest_value_seen,
    };

    // ─── Summary ────────────────────────────────────────────────────────

    let total = mc_reports.len();
    let passed = mc_reports.iter().filter(|r| r.pass_rate >= PASS_THRESHOLD).count();
    let failed = total - passed;

    println!("  {}", "-".repeat(96));
    println!("  Total: {}  Passed: {}  Failed: {}  Suite time: {:.1}s\n",
        total, passed, failed, suite_elapsed.as_secs_f64());

    println!("  Invariant Validation:");
    println!("    Price floor holds:      {}", pass_label(validation.floor_holds));
    println!("    Durations positive:     {}", pass_label(validation.durations_positive));
    println!("    Dragon raises chaos:    {}", pass_label(validation.dragon_raises_chaos));
    println!("    Shocks re-roll regimes: {}", pass_label(validation.shocks_reroll_regimes));
    println!("    Lowest value seen:      {:.4}\n", validation.lowest_value_seen);

    let all_valid = validation.all_pass();

    // ─── Write JSON Report ──────────────────────────────────────────────

    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let timestamp = format!("{}", ts);

    let report = BenchReport {
        timestamp: timestamp.clone(),
        version: env!("CARGO_PKG_VERSION"),
        prng: "ChaCha8Rng",
        n_runs_per_scenario: cli.runs,
        summary: Summary {
            total,
            passed,
            failed,
            pass_rate: passed as f64 / total as f64,
        },
        invariant_validation: validation,
        scenarios: mc_reports,
    };

    let dir = Path::new("benchmark-results");
    let path = dir.join(format!("bench-{}.json", timestamp));
    let written = std::fs::create_dir_all(dir)
        .map_err(|e| e.to_string())
        .and_then(|_| serde_json::to_string_pretty(&report).map_err(|e| e.to_string()))
        .and_then(|json| std::fs::write(&path, json).map_err(|e| e.to_string()));
    match written {
        Ok(()) => println!("  Results saved to: {}\n", path.display()),
        Err(e) => {
            error!(path = %path.display(), error = %e, "Failed to write benchmark report");
            std::process::exit(1);
        }
    }

    if failed > 0 || !all_valid {
        std::process::exit(1);
    }
}
