// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Governance Break-Test Suite ("The Arena") - Simulation Engine
//
// Per (mechanism, attack): `instances` fresh populations, each voting on
// `rounds` sequential proposals. Slashing persists across the rounds of one
// instance and is discarded with the population afterwards.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::agents::Agent;
use crate::mechanism::MechanismConfig;
use crate::population::PopulationBuilder;
use crate::proposal::ProposalSource;
use crate::types::{success_rate, AttackResult, AttackType, Proposal, VoteResult};
use crate::voting::VotingSystem;

pub const DEFAULT_INSTANCES: usize = 30;
pub const DEFAULT_ROUNDS: usize = 20;

// ─── Mechanism Evaluation ───────────────────────────────────────────────────

/// All four attack results for one mechanism.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MechanismEvaluation {
    pub mechanism: MechanismConfig,
    pub results: BTreeMap<AttackType, AttackResult>,
}

impl MechanismEvaluation {
    pub fn total_votes(&self) -> u64 {
        self.results.values().map(|r| r.total_votes).sum()
    }

    pub fn correct_outcomes(&self) -> u64 {
        self.results.values().map(|r| r.correct_outcomes).sum()
    }

    /// Total correct over total votes across every attack.
    pub fn overall_score(&self) -> f64 {
        success_rate(self.correct_outcomes(), self.total_votes())
    }

    /// Success rate under one attack, 0 if it was not run.
    pub fn score_for(&self, attack: AttackType) -> f64 {
        self.results.get(&attack).map_or(0.0, |r| r.success_rate)
    }
}

// ─── Simulation Engine ──────────────────────────────────────────────────────

/// Owns the generator that every population, proposal and vote draws from.
pub struct SimulationEngine {
    rng: ChaCha8Rng,
    proposals: ProposalSource,
    populations: PopulationBuilder,
    instances: usize,
    rounds: usize,
}

impl SimulationEngine {
    pub fn new(seed: u64) -> Self {
        Self::with_settings(seed, DEFAULT_INSTANCES, DEFAULT_ROUNDS)
    }

    pub fn with_settings(seed: u64, instances: usize, rounds: usize) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            proposals: ProposalSource::new(),
            populations: PopulationBuilder::new(),
            instances,
            rounds,
        }
    }

    pub fn generate_proposal(&mut self) -> Proposal {
        self.proposals.next_proposal(&mut self.rng)
    }

    pub fn build_population(&mut self, attack: AttackType) -> Vec<Agent> {
        self.populations.build(attack, &mut self.rng)
    }

    /// Run one instance: `rounds` proposals against the same roster.
    pub fn run_attack_instance(
        &mut self,
        mechanism: &MechanismConfig,
        agents: &mut [Agent],
        rounds: usize,
    ) -> Vec<VoteResult> {
        let system = VotingSystem::new(*mechanism);
        let mut results = Vec::with_capacity(rounds);
        for _ in 0..rounds {
            let proposal = self.generate_proposal();
            results.push(system.conduct_vote(agents, &proposal, &mut self.rng));
        }
        results
    }

    pub fn run_attack_scenario(
        &mut self,
        mechanism: &MechanismConfig,
        attack: AttackType,
        instances: usize,
        rounds: usize,
    ) -> AttackResult {
        let mut total_votes = 0u64;
        let mut total_correct = 0u64;
        let mut instance_rates = Vec::with_capacity(instances);

        for instance in 0..instances {
            let mut agents = self.build_population(attack);
            let results = self.run_attack_instance(mechanism, &mut agents, rounds);

            let correct = results.iter().filter(|r| r.correct_outcome).count() as u64;
            total_votes += results.len() as u64;
            total_correct += correct;
            instance_rates.push(success_rate(correct, results.len() as u64));

            debug!(
                %attack,
                instance,
                correct,
                rounds = results.len(),
                slashed = results.iter().map(|r| r.agents_slashed.len()).sum::<usize>(),
                "instance complete"
            );
        }

        AttackResult::new(attack, *mechanism, total_votes, total_correct, &instance_rates)
    }

    /// Every attack type, in fixed order, with the engine's instance/round counts.
    pub fn run_full_mechanism_test(&mut self, mechanism: &MechanismConfig) -> MechanismEvaluation {
        let mut results = BTreeMap::new();
        for attack in AttackType::ALL {
            let result = self.run_attack_scenario(mechanism, attack, self.instances, self.rounds);
            debug!(
                %mechanism,
                %attack,
                success_rate = result.success_rate,
                correct = result.correct_outcomes,
                total = result.total_votes,
                "attack complete"
            );
            results.insert(attack, result);
        }
        let evaluation = MechanismEvaluation { mechanism: *mechanism, results };
        info!(%mechanism, overall = evaluation.overall_score(), "mechanism evaluated");
        evaluation
    }

    pub fn run_batch_test(&mut self, mechanisms: &[MechanismConfig]) -> Vec<MechanismEvaluation> {
        info!(count = mechanisms.len(), "starting batch test");
        mechanisms
            .iter()
            .map(|m| self.run_full_mechanism_test(m))
            .collect()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
