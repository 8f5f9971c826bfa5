// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Governance Break-Test Suite ("The Arena")

pub mod types;
pub mod mechanism;
pub mod agents;
pub mod population;
pub mod proposal;
pub mod voting;
pub mod slashing;
pub mod simulation;
pub mod stats;
pub mod generator;
pub mod pipeline;
pub mod config;
pub mod adapter;

pub use types::*;
pub use mechanism::{ConfigError, MechanismConfig, SlashingMethod, StakeMethod, VotingMethod};
pub use agents::Agent;
pub use generator::{MechanismGenerator, RealWorldClass};
pub use simulation::{MechanismEvaluation, SimulationEngine};
pub use pipeline::{Pipeline, PipelineError, PipelineOutcome, PipelineSummary};
pub use config::{BreakTestSettings, SettingsError};
pub use stats::Stats;

use wasm_bindgen::prelude::*;

use simulation::{DEFAULT_INSTANCES, DEFAULT_ROUNDS};

// ─── WASM Interface ──────────────────────────────────────────────────────────

/// Single-mechanism evaluation for the browser.
#[wasm_bindgen]
pub struct BreakTestArena {
    seed: u64,
    engine: SimulationEngine,
    generator: MechanismGenerator,
}

#[wasm_bindgen]
impl BreakTestArena {
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u32) -> Self {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        let seed = u64::from(seed);
        Self {
            seed,
            engine: SimulationEngine::new(seed),
            generator: MechanismGenerator::new(seed),
        }
    }

    /// Restart the engine from the original seed with new run sizes.
    pub fn configure(&mut self, instances: u32, rounds: u32) {
        self.engine = SimulationEngine::with_settings(self.seed, instances as usize, rounds as usize);
    }

    /// Evaluate a mechanism given as a plain object with the seven config fields.
    pub fn run_mechanism(&mut self, config: JsValue) -> Result<JsValue, JsValue> {
        let mechanism: MechanismConfig = serde_wasm_bindgen::from_value(config)?;
        mechanism
            .validate()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(self.evaluate(&mechanism))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn run_fields(
        &mut self,
        voting_method: &str,
        stake_method: &str,
        slashing_method: &str,
        consensus_threshold: f64,
        slashing_rate: f64,
        sybil_resistance: f64,
        max_voting_power: f64,
    ) -> Result<JsValue, JsValue> {
        let mechanism = MechanismConfig::parse(
            voting_method,
            stake_method,
            slashing_method,
            adapter::to_decimal(consensus_threshold),
            adapter::to_decimal(slashing_rate),
            adapter::to_decimal(sybil_resistance),
            adapter::to_decimal(max_voting_power),
        )
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(self.evaluate(&mechanism))
    }

    pub fn catalog(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&generator::real_world_catalog()).unwrap_or(JsValue::NULL)
    }

    pub fn random_mechanisms(&mut self, count: u32) -> JsValue {
        let mechanisms = self.generator.unique_mechanisms(count as usize);
        serde_wasm_bindgen::to_value(&mechanisms).unwrap_or(JsValue::NULL)
    }

    pub fn total_possible(&self) -> u32 {
        generator::total_possible() as u32
    }

    pub fn default_instances(&self) -> u32 {
        DEFAULT_INSTANCES as u32
    }

    pub fn default_rounds(&self) -> u32 {
        DEFAULT_ROUNDS as u32
    }
}

impl BreakTestArena {
    fn evaluate(&mut self, mechanism: &MechanismConfig) -> JsValue {
        let evaluation = self.engine.run_full_mechanism_test(mechanism);
        serde_wasm_bindgen::to_value(&evaluation).unwrap_or(JsValue::NULL)
    }
}
