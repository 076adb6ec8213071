// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Stock Market Engine - Market Core
//
// Owns the listed goods, the shared environment and config, and the seeded
// generator every tick draws from. Goods never read each other's state, so
// the per-tick loop order only matters for which draws each good receives.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};
use wasm_bindgen::prelude::*;

use crate::catalog;
use crate::config::{ConfigError, MarketConfig};
use crate::history::PriceHistory;
use crate::tick;
use crate::types::*;

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum MarketError {
    #[error("no good with id {0}")]
    UnknownGood(u32),
    #[error("shock needs a finite delta and a probability in [0, 1], got delta {global_delta}, probability {probability}")]
    InvalidShock { global_delta: f64, probability: f64 },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Environment(#[from] EnvironmentError),
}

// ─── StockMarket struct ──────────────────────────────────────────────────────

#[wasm_bindgen]
pub struct StockMarket {
    pub(crate) goods: Vec<Good>,
    pub(crate) listings: Vec<Listing>,
    pub(crate) histories: Vec<PriceHistory>,
    // Starting state per good, restored by reset().
    pub(crate) initial: Vec<Good>,

    pub(crate) env: GameEnvironment,
    pub(crate) config: MarketConfig,

    pub(crate) rng: ChaCha8Rng,
    pub(crate) seed: u64,
    pub(crate) current_tick: u64,
    pub(crate) pending_shock: Option<MarketShock>,
}

// ─── Internal Logic (Testable, pure Rust) ────────────────────────────────────

impl StockMarket {
    /// Empty market after validating `config` and `env`.
    pub fn with_config(config: MarketConfig, env: GameEnvironment, seed: u64) -> Result<Self, MarketError> {
        config.validate()?;
        env.validate()?;
        Ok(Self::from_parts(config, env, seed))
    }

    /// Market with the standard listings, each starting at its resting value.
    pub fn with_default_listings(config: MarketConfig, env: GameEnvironment, seed: u64) -> Result<Self, MarketError> {
        let mut market = Self::with_config(config, env, seed)?;
        for listing in catalog::default_listings() {
            market.list_good_at_rest(listing);
        }
        Ok(market)
    }

    pub(crate) fn from_parts(config: MarketConfig, env: GameEnvironment, seed: u64) -> Self {
        if !env.dragon_boost_in_range() {
            warn!(dragon_boost = env.dragon_boost, "Dragon boost outside [0, 1]; volatility extrapolated");
        }
        info!(seed, bank_level = env.bank_level, brokers = env.num_brokers, "Market opened");
        Self {
            goods: Vec::new(),
            listings: Vec::new(),
            histories: Vec::new(),
            initial: Vec::new(),
            env,
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            current_tick: 0,
            pending_shock: None,
        }
    }

    /// List a fresh good (value 1, regime due for a re-roll). Returns its id.
    pub fn list_good(&mut self, listing: Listing) -> u32 {
        let id = self.goods.len() as u32;
        self.insert(Good::new(id), listing)
    }

    /// List a good starting at its resting value for the current bank level.
    pub fn list_good_at_rest(&mut self, listing: Listing) -> u32 {
        let id = self.goods.len() as u32;
        self.insert(Good::at_rest(id, self.env.effective_bank_level()), listing)
    }

    fn insert(&mut self, good: Good, listing: Listing) -> u32 {
        debug!(id = good.id, symbol = %listing.symbol, value = good.value, "Good listed");
        self.histories.push(PriceHistory::new(good.value, self.config.history_len));
        self.initial.push(good);
        self.goods.push(good);
        self.listings.push(listing);
        good.id
    }

    /// Apply a shock to the next tick only. Rejects non-finite deltas and
    /// probabilities outside `[0, 1]`.
    pub fn schedule_shock(&mut self, shock: MarketShock) -> Result<(), MarketError> {
        if !shock.is_well_formed() {
            return Err(MarketError::InvalidShock {
                global_delta: shock.global_delta,
                probability: shock.probability,
            });
        }
        info!(
            global_delta = shock.global_delta,
            probability = shock.probability,
            tick = self.current_tick + 1,
            "Market shock scheduled"
        );
        self.pending_shock = Some(shock);
        Ok(())
    }

    pub fn tick_core(&mut self) -> TickReport {
        self.current_tick += 1;
        let shock = self.pending_shock.take().filter(|s| s.is_active());

        let mut transitions = Vec::with_capacity(self.goods.len());
        for (good, history) in self.goods.iter_mut().zip(self.histories.iter_mut()) {
            let (next, outcome) =
                tick::tick_good_with_events(good, &self.env, shock, &self.config, &mut self.rng);
            history.record(next.value);
            transitions.push(GoodTransition {
                id: next.id,
                previous_mode: good.mode,
                mode: next.mode,
                value: next.value,
                change: next.value - good.value,
                regime_rolled: outcome.regime_rolled,
            });
            *good = next;
        }

        let report = TickReport { tick: self.current_tick, shock, transitions };
        debug!(tick = report.tick, regime_changes = report.regime_changes(), "Market ticked");
        report
    }

    pub fn run_ticks(&mut self, ticks: u32) {
        for _ in 0..ticks {
            self.tick_core();
        }
    }

    pub fn update_environment(&mut self, env: GameEnvironment) -> Result<(), MarketError> {
        env.validate()?;
        if !env.dragon_boost_in_range() {
            warn!(dragon_boost = env.dragon_boost, "Dragon boost outside [0, 1]; volatility extrapolated");
        }
        self.env = env;
        Ok(())
    }

    /// Return every good and the generator to their starting state.
    pub fn restart(&mut self) {
        self.goods = self.initial.clone();
        self.histories = self
            .initial
            .iter()
            .map(|g| PriceHistory::new(g.value, self.config.history_len))
            .collect();
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.current_tick = 0;
        self.pending_shock = None;
    }

    pub fn good(&self, id: u32) -> Result<&Good, MarketError> {
        self.goods.get(id as usize).ok_or(MarketError::UnknownGood(id))
    }

    pub fn listing(&self, id: u32) -> Result<&Listing, MarketError> {
        self.listings.get(id as usize).ok_or(MarketError::UnknownGood(id))
    }

    pub fn value_of(&self, id: u32) -> Result<f64, MarketError> {
        self.good(id).map(|g| g.value)
    }

    pub fn mode_of(&self, id: u32) -> Result<Mode, MarketError> {
        self.good(id).map(|g| g.mode)
    }

    pub fn history(&self, id: u32) -> Result<&PriceHistory, MarketError> {
        self.histories.get(id as usize).ok_or(MarketError::UnknownGood(id))
    }

    pub fn snapshot(&self, id: u32) -> Result<GoodSnapshot, MarketError> {
        let good = self.good(id)?;
        let listing = self.listing(id)?;
        Ok(GoodSnapshot {
            id,
            symbol: listing.symbol.clone(),
            name: listing.name.clone(),
            value: good.value,
            delta: good.delta,
            mode: good.mode,
            mode_label: good.mode.label().to_string(),
            remaining_mode_duration: good.remaining_mode_duration,
            resting_value: good.resting_value(&self.env),
        })
    }

    pub fn snapshots(&self) -> Vec<GoodSnapshot> {
        (0..self.goods.len() as u32).filter_map(|id| self.snapshot(id).ok()).collect()
    }

    pub fn goods(&self) -> &[Good] {
        &self.goods
    }

    pub fn environment(&self) -> &GameEnvironment {
        &self.env
    }

    pub fn config(&self) -> &MarketConfig {
        &self.config
    }

    pub fn current_tick(&self) -> u64 {
        self.current_tick
    }

    pub fn len(&self) -> usize {
        self.goods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goods.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn market(seed: u64) -> StockMarket {
        StockMarket::with_default_listings(MarketConfig::default(), GameEnvironment::default(), seed).unwrap()
    }

    #[test]
    fn test_default_listings_start_at_rest() {
        let m = market(1);
        assert_eq!(m.len(), 16);
        assert!((m.value_of(0).unwrap() - 10.0).abs() < f64::EPSILON);
        assert!((m.value_of(15).unwrap() - 160.0).abs() < f64::EPSILON);
        assert_eq!(m.history(3).unwrap().len(), 1);
    }

    #[test]
    fn test_rejects_invalid_inputs() {
        let env = GameEnvironment { bank_level: 0, num_brokers: 0, dragon_boost: 0.0 };
        assert!(matches!(
            StockMarket::with_config(MarketConfig::default(), env, 0),
            Err(MarketError::Environment(EnvironmentError::BankLevelTooLow(0)))
        ));

        let config = MarketConfig { history_len: 0, ..Default::default() };
        assert!(matches!(
            StockMarket::with_config(config, GameEnvironment::default(), 0),
            Err(MarketError::Config(ConfigError::EmptyHistory))
        ));
    }

    #[test]
    fn test_unknown_good() {
        let m = market(1);
        assert!(matches!(m.value_of(99), Err(MarketError::UnknownGood(99))));
        assert!(m.snapshot(16).is_err());
    }

    #[test]
    fn test_tick_records_history() {
        let mut m = market(3);
        let report = m.tick_core();
        assert_eq!(report.tick, 1);
        assert_eq!(report.transitions.len(), 16);
        let h = m.history(4).unwrap();
        assert_eq!(h.len(), 2);
        assert_eq!(h.latest(), Some(m.value_of(4).unwrap()));
    }

    #[test]
    fn test_history_capped_by_config() {
        let mut m = market(3);
        m.run_ticks(100);
        assert_eq!(m.history(0).unwrap().len(), 65);
    }

    #[test]
    fn test_shock_applies_to_next_tick_only() {
        let mut m = market(5);
        m.schedule_shock(MarketShock::new(5.0, 1.0)).unwrap();
        let first = m.tick_core();
        assert!(first.shock.is_some());
        let second = m.tick_core();
        assert!(second.shock.is_none());
    }

    #[test]
    fn test_zero_shock_is_dropped() {
        let mut m = market(5);
        m.schedule_shock(MarketShock::new(0.0, 1.0)).unwrap();
        assert!(m.tick_core().shock.is_none());
    }

    #[test]
    fn test_rejects_malformed_shock() {
        let mut m = market(5);
        for shock in [
            MarketShock::new(f64::NAN, 1.0),
            MarketShock::new(f64::INFINITY, 0.5),
            MarketShock::new(2.0, f64::NAN),
            MarketShock::new(2.0, 1.5),
            MarketShock::new(2.0, -0.1),
        ] {
            assert!(matches!(m.schedule_shock(shock), Err(MarketError::InvalidShock { .. })));
        }
        let report = m.tick_core();
        assert!(report.shock.is_none());
        assert!(m.goods().iter().all(|g| g.delta.is_finite() && g.value.is_finite()));
    }

    #[test]
    fn test_restart_replays_same_series() {
        let mut m = market(8);
        m.run_ticks(50);
        let first: Vec<f64> = m.goods().iter().map(|g| g.value).collect();
        m.restart();
        assert_eq!(m.current_tick(), 0);
        m.run_ticks(50);
        let second: Vec<f64> = m.goods().iter().map(|g| g.value).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_update_environment_validates() {
        let mut m = market(1);
        let bad = GameEnvironment { bank_level: 0, num_brokers: 1, dragon_boost: 0.0 };
        assert!(m.update_environment(bad).is_err());
        assert_eq!(m.environment().bank_level, 1);
        let good = GameEnvironment::new(4, 2, 0.5).unwrap();
        m.update_environment(good).unwrap();
        assert_eq!(m.snapshot(0).unwrap().resting_value, 13.0);
    }
}
