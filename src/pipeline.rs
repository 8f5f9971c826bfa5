// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Governance Break-Test Suite ("The Arena") - Evaluation Pipeline
//
// Fans a batch of mechanisms out over a worker pool. Every mechanism gets its
// own engine seeded with `base_seed + index`, so results depend only on the
// base seed and input order, never on the worker count.

use std::collections::HashMap;
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::generator::RealWorldClass;
use crate::mechanism::{ConfigError, MechanismConfig};
use crate::simulation::{MechanismEvaluation, SimulationEngine, DEFAULT_INSTANCES, DEFAULT_ROUNDS};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("mechanism #{index} is invalid: {source}")]
    InvalidMechanism {
        index: usize,
        #[source]
        source: ConfigError,
    },
    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

// ─── Pipeline ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pipeline {
    pub workers: usize,
    pub base_seed: u64,
    pub instances: usize,
    pub rounds: usize,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            base_seed: 0,
            instances: DEFAULT_INSTANCES,
            rounds: DEFAULT_ROUNDS,
        }
    }
}

/// Available parallelism, or 1 when it cannot be queried.
pub fn default_workers() -> usize {
    std::thread::available_parallelism().map_or(1, |n| n.get())
}

impl Pipeline {
    pub fn new(workers: usize, base_seed: u64) -> Self {
        Self {
            workers,
            base_seed,
            ..Self::default()
        }
    }

    pub fn with_rounds(mut self, instances: usize, rounds: usize) -> Self {
        self.instances = instances;
        self.rounds = rounds;
        self
    }

    /// Evaluate one mechanism on a dedicated engine.
    pub fn evaluate(&self, index: usize, mechanism: &MechanismConfig) -> MechanismEvaluation {
        let seed = self.base_seed.wrapping_add(index as u64);
        SimulationEngine::with_settings(seed, self.instances, self.rounds)
            .run_full_mechanism_test(mechanism)
    }

    /// Validate the whole batch, then evaluate it in parallel. Evaluations come
    /// back in input order.
    pub fn run(&self, mechanisms: &[MechanismConfig]) -> Result<PipelineOutcome, PipelineError> {
        for (index, m) in mechanisms.iter().enumerate() {
            m.validate()
                .map_err(|source| PipelineError::InvalidMechanism { index, source })?;
        }

        let workers = self.workers.max(1);
        info!(
            mechanisms = mechanisms.len(),
            workers,
            base_seed = self.base_seed,
            instances = self.instances,
            rounds = self.rounds,
            "starting evaluation"
        );

        let start = Instant::now();
        let evaluations: Vec<MechanismEvaluation> = if workers == 1 || mechanisms.len() <= 1 {
            mechanisms
                .iter()
                .enumerate()
                .map(|(i, m)| self.evaluate(i, m))
                .collect()
        } else {
            let pool = rayon::ThreadPoolBuilder::new().num_threads(workers).build()?;
            pool.install(|| {
                mechanisms
                    .par_iter()
                    .enumerate()
                    .map(|(i, m)| self.evaluate(i, m))
                    .collect()
            })
        };
        let elapsed_ms = start.elapsed().as_millis() as u64;

        let summary = PipelineSummary::from_evaluations(&evaluations, elapsed_ms);
        info!(
            mechanisms = summary.total_mechanisms,
            votes = summary.total_votes,
            average = summary.average_success_rate,
            elapsed_ms,
            "evaluation complete"
        );
        Ok(PipelineOutcome { evaluations, summary })
    }
}

// ─── Outcome ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutcome {
    pub evaluations: Vec<MechanismEvaluation>,
    pub summary: PipelineSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineSummary {
    pub total_mechanisms: usize,
    pub total_votes: u64,
    pub total_correct: u64,
    pub average_success_rate: f64,
    pub best_score: f64,
    pub worst_score: f64,
    pub elapsed_ms: u64,
}

impl PipelineSummary {
    pub fn from_evaluations(evaluations: &[MechanismEvaluation], elapsed_ms: u64) -> Self {
        if evaluations.is_empty() {
            return Self { elapsed_ms, ..Self::default() };
        }
        let total_votes: u64 = evaluations.iter().map(|e| e.total_votes()).sum();
        let total_correct: u64 = evaluations.iter().map(|e| e.correct_outcomes()).sum();
        let scores = evaluations.iter().map(|e| e.overall_score());
        Self {
            total_mechanisms: evaluations.len(),
            total_votes,
            total_correct,
            average_success_rate: crate::types::success_rate(total_correct, total_votes),
            best_score: scores.clone().fold(f64::NEG_INFINITY, f64::max),
            worst_score: scores.fold(f64::INFINITY, f64::min),
            elapsed_ms,
        }
    }
}

// ─── Ranking ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedMechanism {
    /// 1-based.
    pub rank: usize,
    pub evaluation: MechanismEvaluation,
}

/// Highest overall score first. Ties keep input order.
pub fn rank(evaluations: Vec<MechanismEvaluation>) -> Vec<RankedMechanism> {
    let mut scored: Vec<(f64, MechanismEvaluation)> =
        evaluations.into_iter().map(|e| (e.overall_score(), e)).collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored
        .into_iter()
        .enumerate()
        .map(|(i, (_, evaluation))| RankedMechanism { rank: i + 1, evaluation })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealWorldRanking {
    /// 1-based position among catalog mechanisms.
    pub real_world_rank: usize,
    pub class: RealWorldClass,
    /// Position in the top-N list, if the mechanism made it.
    pub top_rank: Option<usize>,
    pub evaluation: MechanismEvaluation,
}

/// Catalog mechanisms in ranked order, each tagged with its top-N position.
pub fn real_world_ranking(ranked: &[RankedMechanism], top_n: usize) -> Vec<RealWorldRanking> {
    let top: HashMap<MechanismConfig, usize> = ranked
        .iter()
        .take(top_n)
        .map(|r| (r.evaluation.mechanism, r.rank))
        .collect();

    ranked
        .iter()
        .filter_map(|r| {
            let class = RealWorldClass::classify(&r.evaluation.mechanism)?;
            Some((class, r))
        })
        .enumerate()
        .map(|(i, (class, r))| RealWorldRanking {
            real_world_rank: i + 1,
            class,
            top_rank: top.get(&r.evaluation.mechanism).copied(),
            evaluation: r.evaluation.clone(),
        })
        .collect()
}

// ===========================================================================
// Tests
// ===========================================================================
