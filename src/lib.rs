// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Stock Market Engine

pub mod types;
pub mod config;
pub mod rng;
pub mod valuation;
pub mod regime;
pub mod tick;
pub mod history;
pub mod catalog;
pub mod market;

pub use types::*;
pub use config::{ConfigError, MarketConfig};
pub use rng::{SequenceSource, UniformSource};
pub use valuation::resting_value;
pub use tick::{step, tick_good};
pub use market::{MarketError, StockMarket};

use wasm_bindgen::prelude::*;

fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

// ─── WASM Interface ──────────────────────────────────────────────────────────

#[wasm_bindgen]
impl StockMarket {
    /// Market with the standard listings, default config, and bank level 1.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64) -> Self {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        let mut market = Self::from_parts(MarketConfig::default(), GameEnvironment::default(), seed);
        for listing in catalog::default_listings() {
            market.list_good_at_rest(listing);
        }
        market
    }

    /// Build from a JSON config override. Fails on invalid config or bank level.
    pub fn from_json_config(
        config_json: &str,
        seed: u64,
        bank_level: u32,
        num_brokers: u32,
        dragon_boost: f64,
    ) -> Result<StockMarket, JsValue> {
        let config = MarketConfig::from_json(config_json).map_err(to_js_error)?;
        let env = GameEnvironment::new(bank_level, num_brokers, dragon_boost).map_err(to_js_error)?;
        StockMarket::with_default_listings(config, env, seed).map_err(to_js_error)
    }

    pub fn tick(&mut self) -> JsValue {
        let report = self.tick_core();
        serde_wasm_bindgen::to_value(&report).unwrap_or(JsValue::NULL)
    }

    /// Run N ticks without returning results
    pub fn run_batch(&mut self, ticks: u32) {
        self.run_ticks(ticks);
    }

    pub fn add_good(&mut self, name: &str, symbol: &str, company: &str) -> u32 {
        self.list_good_at_rest(Listing::new(name, symbol, company, ""))
    }

    pub fn get_goods(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.snapshots()).unwrap_or(JsValue::NULL)
    }

    pub fn get_good(&self, id: u32) -> JsValue {
        match self.snapshot(id) {
            Ok(s) => serde_wasm_bindgen::to_value(&s).unwrap_or(JsValue::NULL),
            Err(_) => JsValue::NULL,
        }
    }

    pub fn get_history(&self, id: u32) -> JsValue {
        match self.history(id) {
            Ok(h) => serde_wasm_bindgen::to_value(&h.to_vec()).unwrap_or(JsValue::NULL),
            Err(_) => JsValue::NULL,
        }
    }

    pub fn value(&self, id: u32) -> Option<f64> {
        self.value_of(id).ok()
    }

    /// Mode as its numeric code (0 = Stable ... 5 = Chaotic).
    pub fn mode_code(&self, id: u32) -> Option<u8> {
        self.mode_of(id).ok().map(|m| m.code())
    }

    pub fn set_bank_level(&mut self, bank_level: u32) -> Result<(), JsValue> {
        let env = GameEnvironment { bank_level, ..self.env };
        self.update_environment(env).map_err(to_js_error)
    }

    pub fn set_num_brokers(&mut self, num_brokers: u32) {
        self.env.num_brokers = num_brokers;
    }

    pub fn set_dragon_boost(&mut self, dragon_boost: f64) -> Result<(), JsValue> {
        let env = GameEnvironment { dragon_boost, ..self.env };
        self.update_environment(env).map_err(to_js_error)
    }

    pub fn trigger_shock(&mut self, global_delta: f64, probability: f64) -> Result<(), JsValue> {
        self.schedule_shock(MarketShock::new(global_delta, probability)).map_err(to_js_error)
    }

    pub fn get_tick(&self) -> u64 {
        self.current_tick
    }

    /// Reset to the starting prices and reseed the generator
    pub fn reset(&mut self) {
        self.restart();
    }
}
