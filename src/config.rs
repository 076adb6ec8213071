// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Stock Market Engine - Tunable Constants

//! Every probability, range and threshold used by the tick engine.
//!
//! Defaults reproduce the game's stock market. Sections deserialize with
//! `#[serde(default)]`, so a JSON override only needs the fields it changes.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from configuration parsing and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be a probability in [0, 1], got {value}")]
    InvalidProbability { field: &'static str, value: f64 },
    #[error("{field} must be finite and non-negative, got {value}")]
    Negative { field: &'static str, value: f64 },
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },
    #[error("soft floor {soft_floor} is below the hard minimum {min_stock_value}")]
    FloorInverted { soft_floor: f64, min_stock_value: f64 },
    #[error("history length must be at least 1")]
    EmptyHistory,
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// DriftConfig (stages 0-1)
// ---------------------------------------------------------------------------

/// Momentum decay and per-regime drift shapes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DriftConfig {
    /// Per-tick momentum retention (0.97).
    pub momentum_decay: f64,
    /// Upward drift added per unit of dragon boost (0.01).
    pub dragon_drift: f64,
    pub stable_damping: f64,
    /// Amplitude of the centered Stable noise term.
    pub stable_noise: f64,
    pub slow_fall_damping: f64,
    pub slow_fall_drift: f64,
    /// Offset subtracted from the draw so Slow Fall leans negative.
    pub slow_fall_bias: f64,
    /// Momentum push for Fast Rise / Fast Fall.
    pub fast_drift: f64,
    pub fast_bias: f64,
    /// Max direct value jump per tick while in Fast Rise.
    pub fast_rise_value_jump: f64,
    /// Max direct value drop per tick while in Fast Fall.
    pub fast_fall_value_drop: f64,
    pub chaotic_noise: f64,
    /// Fraction of the gap to the resting value closed each tick.
    pub resting_pull: f64,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            momentum_decay: 0.97,
            dragon_drift: 0.01,
            stable_damping: 0.95,
            stable_noise: 0.05,
            slow_fall_damping: 0.99,
            slow_fall_drift: 0.05,
            slow_fall_bias: 0.1,
            fast_drift: 0.15,
            fast_bias: 0.1,
            fast_rise_value_jump: 5.0,
            fast_fall_value_drop: 1.0,
            chaotic_noise: 0.3,
            resting_pull: 0.01,
        }
    }
}

// ---------------------------------------------------------------------------
// ShockConfig (stage 2)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShockConfig {
    /// Multiplier on the cubed draws in the value hit.
    pub value_cube_scale: f64,
    /// Multiplier on the draw in the momentum kick.
    pub delta_kick_scale: f64,
}

impl Default for ShockConfig {
    fn default() -> Self {
        Self { value_cube_scale: 7.0, delta_kick_scale: 4.0 }
    }
}

// ---------------------------------------------------------------------------
// FluctuationConfig (stage 3)
// ---------------------------------------------------------------------------

/// Regime-independent noise. Ranges are full widths of a centered uniform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FluctuationConfig {
    pub value_noise: f64,
    pub delta_noise: f64,
    pub small_jump_probability: f64,
    pub small_jump_range: f64,
    pub large_jump_probability: f64,
    pub large_jump_range: f64,
    pub large_jump_dragon_range: f64,
    pub delta_jump_probability: f64,
    pub delta_jump_range: f64,
    pub delta_jump_dragon_range: f64,
}

impl Default for FluctuationConfig {
    fn default() -> Self {
        Self {
            value_noise: 3.0,
            delta_noise: 0.1,
            small_jump_probability: 0.15,
            small_jump_range: 3.0,
            large_jump_probability: 0.03,
            large_jump_range: 10.0,
            large_jump_dragon_range: 10.0,
            delta_jump_probability: 0.1,
            delta_jump_range: 0.3,
            delta_jump_dragon_range: 0.2,
        }
    }
}

// ---------------------------------------------------------------------------
// FastModeConfig (stage 4)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FastModeConfig {
    pub chaotic_value_jump_probability: f64,
    pub chaotic_value_jump_range: f64,
    /// Chance that Chaotic momentum is replaced outright.
    pub chaotic_delta_reset_probability: f64,
    pub chaotic_delta_reset_range: f64,
    pub chaotic_delta_reset_dragon_range: f64,
    pub nudge_probability: f64,
    pub nudge_delta_range: f64,
    pub nudge_value_range: f64,
    /// Draw offset for the Fast Rise value nudge; 0.7 gives U(-7, 3).
    pub rise_nudge_offset: f64,
    /// Draw offset for the Fast Fall value nudge; 0.3 gives U(-3, 7).
    pub fall_nudge_offset: f64,
    /// Chance per tick that Fast Rise flips into Fast Fall.
    pub flip_probability: f64,
}

impl Default for FastModeConfig {
    fn default() -> Self {
        Self {
            chaotic_value_jump_probability: 0.5,
            chaotic_value_jump_range: 10.0,
            chaotic_delta_reset_probability: 0.2,
            chaotic_delta_reset_range: 2.0,
            chaotic_delta_reset_dragon_range: 6.0,
            nudge_probability: 0.3,
            nudge_delta_range: 0.1,
            nudge_value_range: 10.0,
            rise_nudge_offset: 0.7,
            fall_nudge_offset: 0.3,
            flip_probability: 0.03,
        }
    }
}

// ---------------------------------------------------------------------------
// DampeningConfig (stages 5-7)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DampeningConfig {
    pub ceiling_base: f64,
    pub ceiling_per_bank_level: f64,
    pub ceiling_damping: f64,
    /// Below this value the price is pulled halfway back toward it.
    pub soft_floor: f64,
    pub soft_floor_pull: f64,
    pub floor_delta_damping: f64,
    /// Hard floor; no tick ever leaves a value below this.
    pub min_stock_value: f64,
}

impl Default for DampeningConfig {
    fn default() -> Self {
        Self {
            ceiling_base: 100.0,
            ceiling_per_bank_level: 3.0,
            ceiling_damping: 0.9,
            soft_floor: 5.0,
            soft_floor_pull: 0.5,
            floor_delta_damping: 0.95,
            min_stock_value: 1.0,
        }
    }
}

// ---------------------------------------------------------------------------
// RegimeConfig (stage 8)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RegimeConfig {
    pub min_duration: u32,
    /// Width of the duration draw before dragon-boost reduction.
    pub duration_span: f64,
    pub dragon_duration_reduction: f64,
    /// Second gate on the dragon-boost roll toward Chaotic.
    pub dragon_chaos_probability: f64,
    /// Chance that an expiring Fast Rise / Fast Fall turns Chaotic.
    pub fast_to_chaos_probability: f64,
}

impl Default for RegimeConfig {
    fn default() -> Self {
        Self {
            min_duration: 10,
            duration_span: 690.0,
            dragon_duration_reduction: 200.0,
            dragon_chaos_probability: 0.5,
            fast_to_chaos_probability: 0.7,
        }
    }
}

// ---------------------------------------------------------------------------
// MarketConfig
// ---------------------------------------------------------------------------

pub const DEFAULT_HISTORY_LEN: usize = 65;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MarketConfig {
    pub drift: DriftConfig,
    pub shock: ShockConfig,
    pub fluctuation: FluctuationConfig,
    pub fast_mode: FastModeConfig,
    pub dampening: DampeningConfig,
    pub regime: RegimeConfig,
    /// Number of post-tick values retained per good for charting.
    pub history_len: usize,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            drift: DriftConfig::default(),
            shock: ShockConfig::default(),
            fluctuation: FluctuationConfig::default(),
            fast_mode: FastModeConfig::default(),
            dampening: DampeningConfig::default(),
            regime: RegimeConfig::default(),
            history_len: DEFAULT_HISTORY_LEN,
        }
    }
}

impl MarketConfig {
    /// Parse a (possibly partial) JSON override and validate the result.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.drift;
        let f = &self.fluctuation;
        let m = &self.fast_mode;
        let damp = &self.dampening;
        let r = &self.regime;

        for (field, value) in [
            ("fluctuation.small_jump_probability", f.small_jump_probability),
            ("fluctuation.large_jump_probability", f.large_jump_probability),
            ("fluctuation.delta_jump_probability", f.delta_jump_probability),
            ("fast_mode.chaotic_value_jump_probability", m.chaotic_value_jump_probability),
            ("fast_mode.chaotic_delta_reset_probability", m.chaotic_delta_reset_probability),
            ("fast_mode.nudge_probability", m.nudge_probability),
            ("fast_mode.flip_probability", m.flip_probability),
            ("regime.dragon_chaos_probability", r.dragon_chaos_probability),
            ("regime.fast_to_chaos_probability", r.fast_to_chaos_probability),
            ("drift.resting_pull", d.resting_pull),
            ("dampening.soft_floor_pull", damp.soft_floor_pull),
        ] {
            check_probability(field, value)?;
        }

        for (field, value) in [
            ("drift.momentum_decay", d.momentum_decay),
            ("drift.dragon_drift", d.dragon_drift),
            ("drift.stable_damping", d.stable_damping),
            ("drift.stable_noise", d.stable_noise),
            ("drift.slow_fall_damping", d.slow_fall_damping),
            ("drift.slow_fall_drift", d.slow_fall_drift),
            ("drift.slow_fall_bias", d.slow_fall_bias),
            ("drift.fast_drift", d.fast_drift),
            ("drift.fast_bias", d.fast_bias),
            ("drift.fast_rise_value_jump", d.fast_rise_value_jump),
            ("drift.fast_fall_value_drop", d.fast_fall_value_drop),
            ("drift.chaotic_noise", d.chaotic_noise),
            ("shock.value_cube_scale", self.shock.value_cube_scale),
            ("shock.delta_kick_scale", self.shock.delta_kick_scale),
            ("fluctuation.value_noise", f.value_noise),
            ("fluctuation.delta_noise", f.delta_noise),
            ("fluctuation.small_jump_range", f.small_jump_range),
            ("fluctuation.large_jump_range", f.large_jump_range),
            ("fluctuation.large_jump_dragon_range", f.large_jump_dragon_range),
            ("fluctuation.delta_jump_range", f.delta_jump_range),
            ("fluctuation.delta_jump_dragon_range", f.delta_jump_dragon_range),
            ("fast_mode.chaotic_value_jump_range", m.chaotic_value_jump_range),
            ("fast_mode.chaotic_delta_reset_range", m.chaotic_delta_reset_range),
            ("fast_mode.chaotic_delta_reset_dragon_range", m.chaotic_delta_reset_dragon_range),
            ("fast_mode.nudge_delta_range", m.nudge_delta_range),
            ("fast_mode.nudge_value_range", m.nudge_value_range),
            ("fast_mode.rise_nudge_offset", m.rise_nudge_offset),
            ("fast_mode.fall_nudge_offset", m.fall_nudge_offset),
            ("dampening.ceiling_base", damp.ceiling_base),
            ("dampening.ceiling_per_bank_level", damp.ceiling_per_bank_level),
            ("dampening.ceiling_damping", damp.ceiling_damping),
            ("dampening.soft_floor", damp.soft_floor),
            ("dampening.floor_delta_damping", damp.floor_delta_damping),
            ("regime.dragon_duration_reduction", r.dragon_duration_reduction),
        ] {
            check_non_negative(field, value)?;
        }

        if !damp.min_stock_value.is_finite() || damp.min_stock_value <= 0.0 {
            return Err(ConfigError::NonPositive {
                field: "dampening.min_stock_value",
                value: damp.min_stock_value,
            });
        }
        if damp.soft_floor < damp.min_stock_value {
            return Err(ConfigError::FloorInverted {
                soft_floor: damp.soft_floor,
                min_stock_value: damp.min_stock_value,
            });
        }
        if r.min_duration == 0 {
            return Err(ConfigError::NonPositive {
                field: "regime.min_duration",
                value: 0.0,
            });
        }
        if !r.duration_span.is_finite() || r.duration_span <= 0.0 {
            return Err(ConfigError::NonPositive {
                field: "regime.duration_span",
                value: r.duration_span,
            });
        }
        if self.history_len == 0 {
            return Err(ConfigError::EmptyHistory);
        }
        Ok(())
    }
}

fn check_probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidProbability { field, value })
    }
}

fn check_non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(MarketConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_out_of_range_probability() {
        let mut config = MarketConfig::default();
        config.fast_mode.flip_probability = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidProbability { field: "fast_mode.flip_probability", value })
                if value == 1.5
        ));
    }

    #[test]
    fn test_rejects_negative_threshold() {
        let mut config = MarketConfig::default();
        config.dampening.ceiling_base = -1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Negative { field: "dampening.ceiling_base", .. })
        ));
    }

    #[test]
    fn test_rejects_zero_duration() {
        let mut config = MarketConfig::default();
        config.regime.min_duration = 0;
        assert!(matches!(config.validate(), Err(ConfigError::NonPositive { .. })));

        let mut config = MarketConfig::default();
        config.regime.duration_span = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::NonPositive { .. })));
    }

    #[test]
    fn test_rejects_inverted_floor() {
        let mut config = MarketConfig::default();
        config.dampening.min_stock_value = 8.0;
        assert!(matches!(config.validate(), Err(ConfigError::FloorInverted { .. })));
    }

    #[test]
    fn test_rejects_zero_history() {
        let config = MarketConfig { history_len: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::EmptyHistory)));
    }

    #[test]
    fn test_partial_json_override() {
        let config = MarketConfig::from_json(
            r#"{ "regime": { "min_duration": 25 }, "history_len": 120 }"#,
        )
        .unwrap();
        assert_eq!(config.regime.min_duration, 25);
        assert!((config.regime.duration_span - 690.0).abs() < f64::EPSILON);
        assert_eq!(config.history_len, 120);
        assert_eq!(config.drift, DriftConfig::default());
    }

    #[test]
    fn test_json_override_is_validated() {
        let err = MarketConfig::from_json(r#"{ "dampening": { "min_stock_value": 0.0 } }"#);
        assert!(matches!(err, Err(ConfigError::NonPositive { .. })));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            MarketConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_error_keeps_source() {
        use std::error::Error;

        let err = MarketConfig::from_json(r#"{ "history_len": "long" }"#).unwrap_err();
        let source = err.source().expect("parse error should carry its serde_json cause");
        assert!(source.downcast_ref::<serde_json::Error>().is_some());
        match err {
            ConfigError::Parse(inner) => assert!(inner.is_data()),
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
