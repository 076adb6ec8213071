// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Stock Market Engine - Tick Pipeline
//
// One tick is nine ordered stages over a working copy of the price state.
// Every draw is taken from the injected source in a fixed order, so a given
// stream always yields the same result. Guards evaluate left to right and a
// draw is only consumed once its guard is reached.

use tracing::{debug, trace};

use crate::config::MarketConfig;
use crate::regime;
use crate::rng::UniformSource;
use crate::types::*;
use crate::valuation;

/// Result of one tick, with the events the market reports on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    pub state: PriceState,
    pub shocked: bool,
    pub regime_rolled: bool,
}

/// Advance a price state by one tick.
pub fn step(
    state: PriceState,
    params: &TickParams,
    config: &MarketConfig,
    rng: &mut impl UniformSource,
) -> PriceState {
    step_with_events(state, params, config, rng).state
}

pub fn step_with_events(
    state: PriceState,
    params: &TickParams,
    config: &MarketConfig,
    rng: &mut impl UniformSource,
) -> TickOutcome {
    let mut s = state;
    let boost = params.dragon_boost;

    decay_momentum(&mut s, boost, config);
    apply_mode_drift(&mut s, params.resting_value, config, rng);
    let shocked = apply_shock(&mut s, params.global_delta, params.shock_probability, config, rng);
    apply_fluctuation(&mut s, boost, config, rng);
    apply_fast_mode_volatility(&mut s, boost, config, rng);
    dampen_ceiling(&mut s, params.bank_level, config);
    integrate(&mut s);
    dampen_floor(&mut s, config);

    let outcome = regime::advance(s.mode, s.remaining_mode_duration, boost, &config.regime, rng);
    s.mode = outcome.mode;
    s.remaining_mode_duration = outcome.remaining_mode_duration;

    TickOutcome { state: s, shocked, regime_rolled: outcome.rolled }
}

/// Tick a good against the shared environment and an optional market shock.
pub fn tick_good(
    good: &Good,
    env: &GameEnvironment,
    shock: Option<MarketShock>,
    config: &MarketConfig,
    rng: &mut impl UniformSource,
) -> Good {
    tick_good_with_events(good, env, shock, config, rng).0
}

pub fn tick_good_with_events(
    good: &Good,
    env: &GameEnvironment,
    shock: Option<MarketShock>,
    config: &MarketConfig,
    rng: &mut impl UniformSource,
) -> (Good, TickOutcome) {
    let params = TickParams::for_good(good, env, shock);
    let outcome = step_with_events(good.price_state(), &params, config, rng);

    if outcome.shocked {
        debug!(
            id = good.id,
            global_delta = params.global_delta,
            value = outcome.state.value,
            delta = outcome.state.delta,
            "Market shock hit good"
        );
    }
    if outcome.regime_rolled {
        debug!(
            id = good.id,
            from = good.mode.label(),
            to = outcome.state.mode.label(),
            duration = outcome.state.remaining_mode_duration,
            "Regime re-rolled"
        );
    }
    trace!(id = good.id, value = outcome.state.value, delta = outcome.state.delta, "Ticked");

    (good.with_state(outcome.state), outcome)
}

// ─── Stage 0: momentum decay ────────────────────────────────────────────────

pub(crate) fn decay_momentum(s: &mut PriceState, dragon_boost: f64, config: &MarketConfig) {
    let d = &config.drift;
    s.delta = s.delta * d.momentum_decay + d.dragon_drift * dragon_boost;
}

// ─── Stage 1: regime drift and resting pull ─────────────────────────────────

pub(crate) fn apply_mode_drift(
    s: &mut PriceState,
    resting_value: f64,
    config: &MarketConfig,
    rng: &mut impl UniformSource,
) {
    let d = &config.drift;
    match s.mode {
        Mode::Stable => {
            s.delta = s.delta * d.stable_damping + d.stable_noise * (rng.next_f64() - 0.5);
        }
        Mode::SlowFall => {
            s.delta = s.delta * d.slow_fall_damping - d.slow_fall_drift * (rng.next_f64() - d.slow_fall_bias);
        }
        Mode::FastRise => {
            s.delta += d.fast_drift * (rng.next_f64() - d.fast_bias);
            s.value += rng.next_f64() * d.fast_rise_value_jump;
        }
        Mode::FastFall => {
            s.delta -= d.fast_drift * (rng.next_f64() - d.fast_bias);
            s.value -= rng.next_f64() * d.fast_fall_value_drop;
        }
        Mode::Chaotic => {
            s.delta += d.chaotic_noise * (rng.next_f64() - 0.5);
        }
        // Slow Rise carries no drift of its own.
        Mode::SlowRise => {}
    }

    s.value += (resting_value - s.value) * d.resting_pull;
}

// ─── Stage 2: external shock ────────────────────────────────────────────────

/// Returns whether the shock landed. A zero `global_delta` consumes no draw.
pub(crate) fn apply_shock(
    s: &mut PriceState,
    global_delta: f64,
    probability: f64,
    config: &MarketConfig,
    rng: &mut impl UniformSource,
) -> bool {
    if global_delta == 0.0 {
        return false;
    }
    // A NaN probability never fires.
    let lands = rng.next_f64() < probability;
    if !lands {
        return false;
    }
    let k = &config.shock;
    s.value -= (1.0 + s.delta * rng.next_f64().powi(3) * k.value_cube_scale) * global_delta;
    s.value -= global_delta * (1.0 + rng.next_f64().powi(3) * k.value_cube_scale);
    s.delta += global_delta * (1.0 + rng.next_f64() * k.delta_kick_scale);
    s.remaining_mode_duration = 0;
    true
}

// ─── Stage 3: ambient fluctuation ───────────────────────────────────────────

pub(crate) fn apply_fluctuation(
    s: &mut PriceState,
    dragon_boost: f64,
    config: &MarketConfig,
    rng: &mut impl UniformSource,
) {
    let f = &config.fluctuation;
    s.value += (rng.next_f64() - 0.5).powi(2) * f.value_noise;
    s.delta += f.delta_noise * (rng.next_f64() - 0.5);

    if rng.next_f64() < f.small_jump_probability {
        s.value += (rng.next_f64() - 0.5) * f.small_jump_range;
    }
    if rng.next_f64() < f.large_jump_probability {
        s.value += (rng.next_f64() - 0.5) * (f.large_jump_range + f.large_jump_dragon_range * dragon_boost);
    }
    if rng.next_f64() < f.delta_jump_probability {
        s.delta += (rng.next_f64() - 0.5) * (f.delta_jump_range + f.delta_jump_dragon_range * dragon_boost);
    }
}

// ─── Stage 4: fast-regime volatility ────────────────────────────────────────

/// Fast Rise may flip to Fast Fall here; the Fast Fall nudge then applies on
/// the same tick.
pub(crate) fn apply_fast_mode_volatility(
    s: &mut PriceState,
    dragon_boost: f64,
    config: &MarketConfig,
    rng: &mut impl UniformSource,
) {
    let m = &config.fast_mode;

    if s.mode == Mode::Chaotic {
        if rng.next_f64() < m.chaotic_value_jump_probability {
            s.value += (rng.next_f64() - 0.5) * m.chaotic_value_jump_range;
        }
        if rng.next_f64() < m.chaotic_delta_reset_probability {
            s.delta = (rng.next_f64() - 0.5)
                * (m.chaotic_delta_reset_range + m.chaotic_delta_reset_dragon_range * dragon_boost);
        }
    }
    if s.mode == Mode::FastRise && rng.next_f64() < m.nudge_probability {
        s.delta += (rng.next_f64() - 0.5) * m.nudge_delta_range;
        s.value += (rng.next_f64() - m.rise_nudge_offset) * m.nudge_value_range;
    }
    if s.mode == Mode::FastRise && rng.next_f64() < m.flip_probability {
        s.mode = Mode::FastFall;
    }
    if s.mode == Mode::FastFall && rng.next_f64() < m.nudge_probability {
        s.delta += (rng.next_f64() - 0.5) * m.nudge_delta_range;
        s.value += (rng.next_f64() - m.fall_nudge_offset) * m.nudge_value_range;
    }
}

// ─── Stages 5-7: ceiling, integration, floor ────────────────────────────────

pub(crate) fn dampen_ceiling(s: &mut PriceState, bank_level: u32, config: &MarketConfig) {
    let ceiling = valuation::value_ceiling(bank_level, &config.dampening);
    if s.value > ceiling && s.delta > 0.0 {
        s.delta *= config.dampening.ceiling_damping;
    }
}

pub(crate) fn integrate(s: &mut PriceState) {
    s.value += s.delta;
}

pub(crate) fn dampen_floor(s: &mut PriceState, config: &MarketConfig) {
    let damp = &config.dampening;
    if s.value < damp.soft_floor {
        s.value += (damp.soft_floor - s.value) * damp.soft_floor_pull;
    }
    if s.value < damp.soft_floor && s.delta < 0.0 {
        s.delta *= damp.floor_delta_damping;
    }
    s.value = s.value.max(damp.min_stock_value);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
