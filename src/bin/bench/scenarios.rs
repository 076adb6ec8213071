// Scenario Definitions: calm, boosted, crash and stress markets
// All scenario logic lives in curve functions and the config tweak hook

use stock_market_engine::{GameEnvironment, MarketConfig, MarketShock, StockMarket};
use tracing::warn;

// ─── Scenario Configuration ─────────────────────────────────────────────────

pub struct Scenario {
    pub name: &'static str,
    pub label: &'static str,
    pub category: &'static str,
    pub ticks: u64,
    pub bank_level: u32,
    pub num_brokers: u32,
    pub dragon_boost: f64,
    pub dragon_curve: Option<fn(u64) -> f64>,
    /// Shock fired on the given tick, if any.
    pub shock_schedule: Option<fn(u64) -> Option<MarketShock>>,
    /// Adjust the base config before the market is built.
    pub tweak_config: Option<fn(&mut MarketConfig)>,
    pub criteria: PassCriteria,
    /// Mid-run events (e.g., bank upgrade at a given tick)
    pub mid_event: Option<Box<dyn Fn(&mut StockMarket, u64) + Send + Sync>>,
}

pub struct PassCriteria {
    pub max_floor_violations: u64,
    pub max_duration_violations: u64,
    /// Every listed good must re-roll its regime at least this often.
    pub min_regime_rolls: Option<u64>,
    /// Mean value across goods must stay within this fraction of mean resting value.
    pub max_mean_drift_pct: Option<f64>,
    /// Minimum share of good-ticks spent Chaotic.
    pub min_chaotic_share: Option<f64>,
}

impl Default for PassCriteria {
    fn default() -> Self {
        Self {
            max_floor_violations: 0,
            max_duration_violations: 0,
            min_regime_rolls: None,
            max_mean_drift_pct: None,
            min_chaotic_share: None,
        }
    }
}

// ─── Curve Functions ────────────────────────────────────────────────────────

fn dragon_ramp(tick: u64) -> f64 {
    (tick as f64 / 2000.0).min(1.0)
}

fn dragon_pulse(tick: u64) -> f64 {
    if (tick / 500) % 2 == 1 { 1.0 } else { 0.0 }
}

fn crash_every_1000(tick: u64) -> Option<MarketShock> {
    if tick > 0 && tick % 1000 == 0 {
        Some(MarketShock::new(8.0, 0.9))
    } else {
        None
    }
}

fn boom_every_750(tick: u64) -> Option<MarketShock> {
    if tick > 0 && tick % 750 == 0 {
        Some(MarketShock::new(-6.0, 0.7))
    } else {
        None
    }
}

fn jittery_shocks(tick: u64) -> Option<MarketShock> {
    if tick % 25 == 0 {
        Some(MarketShock::new(2.0, 0.25))
    } else {
        None
    }
}

fn high_volatility(config: &mut MarketConfig) {
    config.fluctuation.large_jump_probability = 0.15;
    config.fast_mode.flip_probability = 0.1;
    config.drift.chaotic_noise = 0.6;
}

fn short_regimes(config: &mut MarketConfig) {
    config.regime.min_duration = 2;
    config.regime.duration_span = 40.0;
    config.regime.dragon_duration_reduction = 20.0;
}

fn raised_floor(config: &mut MarketConfig) {
    config.dampening.min_stock_value = 4.0;
}

pub fn scenarios() -> Vec<Scenario> {
    vec![
        // ─── Market Conditions ──────────────────────────────────────────
        Scenario { name: "CALM_MARKET", label: "Calm Market", category: "market",
            ticks: 5000, bank_level: 1, num_brokers: 0, dragon_boost: 0.0,
            dragon_curve: None, shock_schedule: None, tweak_config: None,
            criteria: PassCriteria { min_regime_rolls: Some(2), max_mean_drift_pct: Some(100.0), ..Default::default() },
            mid_event: None },
        Scenario { name: "BANK_LEVEL_10", label: "Bank Level 10", category: "market",
            ticks: 5000, bank_level: 10, num_brokers: 20, dragon_boost: 0.0,
            dragon_curve: None, shock_schedule: None, tweak_config: None,
            criteria: PassCriteria { max_mean_drift_pct: Some(100.0), ..Default::default() },
            mid_event: None },
        Scenario { name: "BANK_UPGRADE", label: "Bank Upgrade Mid-Run", category: "market",
            ticks: 4000, bank_level: 1, num_brokers: 0, dragon_boost: 0.0,
            dragon_curve: None, shock_schedule: None, tweak_config: None,
            criteria: PassCriteria::default(),
            mid_event: Some(Box::new(|market: &mut StockMarket, tick: u64| {
                if tick == 2000 {
                    let env = GameEnvironment { bank_level: 15, ..*market.environment() };
                    if let Err(e) = market.update_environment(env) {
                        warn!(tick, error = %e, "Bank upgrade rejected");
                    }
                }
            })) },

        // ─── Dragon Boost ───────────────────────────────────────────────
        Scenario { name: "DRAGON_FULL", label: "Full Dragon Boost", category: "dragon",
            ticks: 5000, bank_level: 1, num_brokers: 0, dragon_boost: 1.0,
            dragon_curve: None, shock_schedule: None, tweak_config: None,
            criteria: PassCriteria { min_chaotic_share: Some(0.2), ..Default::default() },
            mid_event: None },
        Scenario { name: "DRAGON_RAMP", label: "Dragon Ramp 0→1", category: "dragon",
            ticks: 4000, bank_level: 1, num_brokers: 0, dragon_boost: 0.0,
            dragon_curve: Some(dragon_ramp), shock_schedule: None, tweak_config: None,
            criteria: PassCriteria::default(),
            mid_event: None },
        Scenario { name: "DRAGON_PULSE", label: "Dragon Pulse", category: "dragon",
            ticks: 4000, bank_level: 3, num_brokers: 0, dragon_boost: 0.0,
            dragon_curve: Some(dragon_pulse), shock_schedule: None, tweak_config: None,
            criteria: PassCriteria::default(),
            mid_event: None },

        // ─── Shocks ─────────────────────────────────────────────────────
        Scenario { name: "MARKET_CRASH", label: "Recurring Crash", category: "shock",
            ticks: 5000, bank_level: 1, num_brokers: 0, dragon_boost: 0.0,
            dragon_curve: None, shock_schedule: Some(crash_every_1000), tweak_config: None,
            criteria: PassCriteria::default(),
            mid_event: None },
        Scenario { name: "MARKET_BOOM", label: "Recurring Boom", category: "shock",
            ticks: 5000, bank_level: 1, num_brokers: 0, dragon_boost: 0.3,
            dragon_curve: None, shock_schedule: Some(boom_every_750), tweak_config: None,
            criteria: PassCriteria::default(),
            mid_event: None },
        Scenario { name: "JITTER_SHOCKS", label: "Frequent Small Shocks", category: "shock",
            ticks: 3000, bank_level: 2, num_brokers: 0, dragon_boost: 0.5,
            dragon_curve: None, shock_schedule: Some(jittery_shocks), tweak_config: None,
            criteria: PassCriteria { min_regime_rolls: Some(10), ..Default::default() },
            mid_event: None },

        // ─── Config Stress ──────────────────────────────────────────────
        Scenario { name: "HIGH_VOLATILITY", label: "High Volatility Config", category: "stress",
            ticks: 5000, bank_level: 1, num_brokers: 0, dragon_boost: 0.5,
            dragon_curve: None, shock_schedule: None, tweak_config: Some(high_volatility),
            criteria: PassCriteria::default(),
            mid_event: None },
        Scenario { name: "SHORT_REGIMES", label: "Short Regimes", category: "stress",
            ticks: 3000, bank_level: 1, num_brokers: 0, dragon_boost: 1.0,
            dragon_curve: None, shock_schedule: None, tweak_config: Some(short_regimes),
            criteria: PassCriteria { min_regime_rolls: Some(50), ..Default::default() },
            mid_event: None },
        Scenario { name: "RAISED_FLOOR", label: "Raised Floor Crash", category: "stress",
            ticks: 3000, bank_level: 1, num_brokers: 0, dragon_boost: 0.0,
            dragon_curve: None, shock_schedule: Some(crash_every_1000), tweak_config: Some(raised_floor),
            criteria: PassCriteria::default(),
            mid_event: None },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bank_upgrade_event_applies() {
        let all = scenarios();
        let upgrade = all.iter().find(|s| s.name == "BANK_UPGRADE").unwrap();
        let event = upgrade.mid_event.as_ref().unwrap();
        let mut market = StockMarket::new(3);
        event(&mut market, 1999);
        assert_eq!(market.environment().bank_level, 1);
        event(&mut market, 2000);
        assert_eq!(market.environment().bank_level, 15);
    }

    #[test]
    fn test_scheduled_shocks_are_well_formed() {
        for scenario in scenarios() {
            if let Some(schedule) = scenario.shock_schedule {
                for tick in 0..scenario.ticks {
                    if let Some(shock) = schedule(tick) {
                        assert!(shock.is_well_formed(), "{} tick {}", scenario.name, tick);
                    }
                }
            }
        }
    }
}
