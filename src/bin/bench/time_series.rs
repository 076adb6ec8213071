// Per-Tick JSONL Time Series Recorder
// Outputs one JSON line per tick for independent analysis

use serde::Serialize;
use stock_market_engine::{GameEnvironment, Good, TickReport};
use std::io::Write;

#[derive(Debug, Serialize)]
pub struct TickSnapshot {
    pub tick: u64,
    pub bank_level: u32,
    pub dragon_boost: f64,
    pub shock_delta: Option<f64>,
    pub shock_probability: Option<f64>,
    pub regime_changes: usize,
    pub total_value: f64,
    pub values: Vec<f64>,
    pub deltas: Vec<f64>,
    /// Mode codes, one per good.
    pub modes: Vec<u8>,
}

impl TickSnapshot {
    pub fn from_tick(report: &TickReport, goods: &[Good], env: &GameEnvironment) -> Self {
        Self {
            tick: report.tick,
            bank_level: env.bank_level,
            dragon_boost: env.dragon_boost,
            shock_delta: report.shock.map(|s| s.global_delta),
            shock_probability: report.shock.map(|s| s.probability),
            regime_changes: report.regime_changes(),
            total_value: goods.iter().map(|g| g.value).sum(),
            values: goods.iter().map(|g| g.value).collect(),
            deltas: goods.iter().map(|g| g.delta).collect(),
            modes: goods.iter().map(|g| g.mode.code()).collect(),
        }
    }
}

/// Time series recorder that accumulates snapshots and writes JSONL
pub struct TimeSeriesRecorder {
    snapshots: Vec<TickSnapshot>,
}

impl TimeSeriesRecorder {
    pub fn new() -> Self {
        Self { snapshots: Vec::new() }
    }

    pub fn record(&mut self, report: &TickReport, goods: &[Good], env: &GameEnvironment) {
        self.snapshots.push(TickSnapshot::from_tick(report, goods, env));
    }

    /// Write all snapshots to a JSONL file
    pub fn write_jsonl(&self, path: &std::path::Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::File::create(path)?;
        for snapshot in &self.snapshots {
            let line = serde_json::to_string(snapshot)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
            writeln!(file, "{}", line)?;
        }
        Ok(())
    }
}
