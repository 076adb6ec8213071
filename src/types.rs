// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Stock Market Engine - Type Definitions

use serde::{Deserialize, Serialize};

// ─── Mode ────────────────────────────────────────────────────────────────────

/// Volatility regime of a good. Codes match the game's save encoding.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Mode {
    Stable = 0,
    SlowRise = 1,
    SlowFall = 2,
    FastRise = 3,
    FastFall = 4,
    Chaotic = 5,
}

impl Default for Mode {
    fn default() -> Self { Mode::Stable }
}

impl Mode {
    pub const ALL: [Mode; 6] = [
        Mode::Stable,
        Mode::SlowRise,
        Mode::SlowFall,
        Mode::FastRise,
        Mode::FastFall,
        Mode::Chaotic,
    ];

    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Stable => "Stable",
            Self::SlowRise => "Slow Rise",
            Self::SlowFall => "Slow Fall",
            Self::FastRise => "Fast Rise",
            Self::FastFall => "Fast Fall",
            Self::Chaotic => "Chaotic",
        }
    }

    /// Regimes that get extra per-tick volatility and bias the re-roll toward Chaotic.
    pub fn is_fast(&self) -> bool {
        matches!(self, Self::FastRise | Self::FastFall | Self::Chaotic)
    }

    pub fn is_trending_fast(&self) -> bool {
        matches!(self, Self::FastRise | Self::FastFall)
    }
}

// ─── Environment ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EnvironmentError {
    #[error("bank level must be at least 1, got {0}")]
    BankLevelTooLow(u32),
    #[error("dragon boost must be finite, got {0}")]
    NonFiniteDragonBoost(f64),
}

/// External economy state shared by every good during a tick.
///
/// `dragon_boost` is conventionally in `[0, 1]`; values outside that range are
/// accepted and extrapolate the volatility formulas linearly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GameEnvironment {
    pub bank_level: u32,
    pub num_brokers: u32,
    pub dragon_boost: f64,
}

impl Default for GameEnvironment {
    fn default() -> Self {
        Self { bank_level: 1, num_brokers: 0, dragon_boost: 0.0 }
    }
}

impl GameEnvironment {
    pub fn new(bank_level: u32, num_brokers: u32, dragon_boost: f64) -> Result<Self, EnvironmentError> {
        let env = Self { bank_level, num_brokers, dragon_boost };
        env.validate()?;
        Ok(env)
    }

    pub fn validate(&self) -> Result<(), EnvironmentError> {
        if self.bank_level < 1 {
            return Err(EnvironmentError::BankLevelTooLow(self.bank_level));
        }
        if !self.dragon_boost.is_finite() {
            return Err(EnvironmentError::NonFiniteDragonBoost(self.dragon_boost));
        }
        Ok(())
    }

    /// Bank level as used by the tick formulas. Never below 1.
    pub fn effective_bank_level(&self) -> u32 {
        self.bank_level.max(1)
    }

    pub fn dragon_boost_in_range(&self) -> bool {
        (0.0..=1.0).contains(&self.dragon_boost)
    }
}

// ─── Market Shock ────────────────────────────────────────────────────────────

/// Economy-wide price event. A positive `global_delta` pushes prices down.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MarketShock {
    pub global_delta: f64,
    pub probability: f64,
}

impl MarketShock {
    pub fn new(global_delta: f64, probability: f64) -> Self {
        Self { global_delta, probability }
    }

    pub fn is_active(&self) -> bool {
        self.global_delta != 0.0
    }

    /// Finite delta and a probability in `[0, 1]`.
    pub fn is_well_formed(&self) -> bool {
        self.global_delta.is_finite() && (0.0..=1.0).contains(&self.probability)
    }
}

// ─── Good ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Good {
    pub id: u32,
    pub value: f64,
    pub delta: f64,
    pub mode: Mode,
    pub remaining_mode_duration: u32,
}

impl Good {
    /// Fresh good as the game creates it: value 1, no momentum, regime due for a re-roll.
    pub fn new(id: u32) -> Self {
        Self {
            id,
            value: 1.0,
            delta: 0.0,
            mode: Mode::Stable,
            remaining_mode_duration: 0,
        }
    }

    /// Good seeded at its equilibrium price for the given bank level.
    pub fn at_rest(id: u32, bank_level: u32) -> Self {
        Self {
            value: crate::valuation::resting_value(id, bank_level),
            ..Self::new(id)
        }
    }

    pub fn resting_value(&self, env: &GameEnvironment) -> f64 {
        crate::valuation::resting_value(self.id, env.effective_bank_level())
    }

    pub fn price_state(&self) -> PriceState {
        PriceState {
            value: self.value,
            delta: self.delta,
            mode: self.mode,
            remaining_mode_duration: self.remaining_mode_duration,
        }
    }

    pub fn with_state(&self, state: PriceState) -> Self {
        Self {
            id: self.id,
            value: state.value,
            delta: state.delta,
            mode: state.mode,
            remaining_mode_duration: state.remaining_mode_duration,
        }
    }
}

/// The part of a good that the tick engine transforms.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PriceState {
    pub value: f64,
    pub delta: f64,
    pub mode: Mode,
    pub remaining_mode_duration: u32,
}

/// Per-good inputs to one tick, derived from the environment and any shock.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TickParams {
    pub resting_value: f64,
    pub bank_level: u32,
    pub global_delta: f64,
    pub shock_probability: f64,
    pub dragon_boost: f64,
}

impl TickParams {
    pub fn for_good(good: &Good, env: &GameEnvironment, shock: Option<MarketShock>) -> Self {
        let shock = shock.unwrap_or(MarketShock::new(0.0, 0.0));
        Self {
            resting_value: good.resting_value(env),
            bank_level: env.effective_bank_level(),
            global_delta: shock.global_delta,
            shock_probability: shock.probability,
            dragon_boost: env.dragon_boost,
        }
    }
}

// ─── Listing ─────────────────────────────────────────────────────────────────

/// Display metadata for a listed good.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Listing {
    pub name: String,
    pub symbol: String,
    pub company: String,
    #[serde(default)]
    pub description: String,
}

impl Listing {
    pub fn new(name: &str, symbol: &str, company: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            symbol: symbol.to_string(),
            company: company.to_string(),
            description: description.to_string(),
        }
    }
}

// ─── Snapshots ───────────────────────────────────────────────────────────────

/// A good's state as exposed to display and charting layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoodSnapshot {
    pub id: u32,
    pub symbol: String,
    pub name: String,
    pub value: f64,
    pub delta: f64,
    pub mode: Mode,
    pub mode_label: String,
    pub remaining_mode_duration: u32,
    pub resting_value: f64,
}

/// Per-good events observed during a market tick.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoodTransition {
    pub id: u32,
    pub previous_mode: Mode,
    pub mode: Mode,
    pub value: f64,
    pub change: f64,
    pub regime_rolled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickReport {
    pub tick: u64,
    pub shock: Option<MarketShock>,
    pub transitions: Vec<GoodTransition>,
}

impl TickReport {
    pub fn regime_changes(&self) -> usize {
        self.transitions.iter().filter(|t| t.previous_mode != t.mode).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_codes_round_trip() {
        for mode in Mode::ALL {
            assert_eq!(Mode::from_code(mode.code()), Some(mode));
        }
        assert_eq!(Mode::from_code(6), None);
        assert_eq!(Mode::Chaotic.code(), 5);
    }

    #[test]
    fn test_fast_modes() {
        assert!(Mode::Chaotic.is_fast());
        assert!(Mode::FastRise.is_fast());
        assert!(!Mode::SlowRise.is_fast());
        assert!(!Mode::Chaotic.is_trending_fast());
        assert!(Mode::FastFall.is_trending_fast());
    }

    #[test]
    fn test_new_good_defaults() {
        let good = Good::new(3);
        assert_eq!(good.value, 1.0);
        assert_eq!(good.delta, 0.0);
        assert_eq!(good.mode, Mode::Stable);
        assert_eq!(good.remaining_mode_duration, 0);
    }

    #[test]
    fn test_good_at_rest() {
        let good = Good::at_rest(5, 3);
        assert!((good.value - 62.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_environment_rejects_bank_level_zero() {
        assert_eq!(
            GameEnvironment::new(0, 2, 0.0),
            Err(EnvironmentError::BankLevelTooLow(0))
        );
        assert!(GameEnvironment::new(1, 0, 0.5).is_ok());
    }

    #[test]
    fn test_environment_rejects_nan_boost() {
        assert!(matches!(
            GameEnvironment::new(1, 0, f64::NAN),
            Err(EnvironmentError::NonFiniteDragonBoost(_))
        ));
    }

    #[test]
    fn test_effective_bank_level_clamps() {
        let env = GameEnvironment { bank_level: 0, num_brokers: 0, dragon_boost: 0.0 };
        assert_eq!(env.effective_bank_level(), 1);
    }

    #[test]
    fn test_tick_params_without_shock() {
        let env = GameEnvironment::new(3, 1, 0.25).unwrap();
        let params = TickParams::for_good(&Good::new(5), &env, None);
        assert_eq!(params.global_delta, 0.0);
        assert_eq!(params.bank_level, 3);
        assert!((params.resting_value - 62.0).abs() < f64::EPSILON);
        assert!((params.dragon_boost - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_mode_serializes_by_name() {
        let json = serde_json::to_string(&Mode::SlowFall).unwrap();
        assert_eq!(json, "\"SlowFall\"");
    }
}
