// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Governance Break-Test Suite ("The Arena") - Voting Mechanism
//
// Power pipeline per round:
//   stake method -> voting method -> sybil discount -> global cap
// The cap is relative to the round's total power and is recomputed every
// round, since slashing moves stakes between rounds.

use std::collections::BTreeMap;

use rand::Rng;

use crate::agents::Agent;
use crate::mechanism::{MechanismConfig, StakeMethod, VotingMethod};
use crate::slashing::SlashingEngine;
use crate::types::{AgentId, AgentType, Proposal, VoteResult};

/// Applies one mechanism's rules to a roster.
#[derive(Debug, Clone, Copy)]
pub struct VotingSystem {
    mechanism: MechanismConfig,
    slashing: SlashingEngine,
}

impl VotingSystem {
    pub fn new(mechanism: MechanismConfig) -> Self {
        Self {
            mechanism,
            slashing: SlashingEngine::from_mechanism(&mechanism),
        }
    }

    /// Stake-method power before the voting-method transform.
    pub fn base_power(&self, agent: &Agent) -> f64 {
        let effective = agent.effective_stake();
        match self.mechanism.stake_method {
            StakeMethod::EqualWeight => 1.0,
            StakeMethod::TokenBased | StakeMethod::ReputationBased => effective,
            StakeMethod::Hybrid => (effective + 1.0) / 2.0,
        }
    }

    /// Power before sybil discount and cap.
    pub fn voting_power(&self, agent: &Agent) -> f64 {
        match self.mechanism.voting_method {
            VotingMethod::SimpleMajority => 1.0,
            VotingMethod::Weighted => self.base_power(agent),
            VotingMethod::Quadratic => self.base_power(agent).sqrt(),
        }
    }

    /// Discard a sybil's vote with probability equal to the resistance strength.
    /// Non-sybils pass through without consuming randomness.
    pub fn apply_sybil_resistance<R: Rng + ?Sized>(
        &self,
        agent: &Agent,
        power: f64,
        rng: &mut R,
    ) -> f64 {
        if agent.agent_type() == AgentType::Sybil
            && rng.gen::<f64>() < self.mechanism.sybil_strength()
        {
            return 0.0;
        }
        power
    }

    /// Clamp every power to `total * max_voting_power`. Never raises a power.
    pub fn apply_power_cap(&self, powers: &mut [f64]) {
        let total: f64 = powers.iter().sum();
        if total <= 0.0 {
            return;
        }
        let max_allowed = total * self.mechanism.max_power_share();
        for power in powers.iter_mut() {
            if *power > max_allowed {
                *power = max_allowed;
            }
        }
    }

    /// Final per-agent powers for one round, aligned with `agents`.
    pub fn round_powers<R: Rng + ?Sized>(&self, agents: &[Agent], rng: &mut R) -> Vec<f64> {
        let mut powers: Vec<f64> = agents
            .iter()
            .map(|agent| self.apply_sybil_resistance(agent, self.voting_power(agent), rng))
            .collect();
        self.apply_power_cap(&mut powers);
        powers
    }

    /// Ask every agent for its vote on `proposal`.
    pub fn collect_votes<R: Rng + ?Sized>(
        &self,
        agents: &[Agent],
        proposal: &Proposal,
        rng: &mut R,
    ) -> BTreeMap<AgentId, bool> {
        agents
            .iter()
            .map(|agent| (agent.agent_id, agent.vote(proposal.quality, rng)))
            .collect()
    }

    /// Full round: collect votes, weigh, decide, slash on a wrong outcome.
    pub fn conduct_vote<R: Rng + ?Sized>(
        &self,
        agents: &mut [Agent],
        proposal: &Proposal,
        rng: &mut R,
    ) -> VoteResult {
        let votes = self.collect_votes(agents, proposal, rng);
        self.resolve(agents, proposal, votes, rng)
    }

    /// Weigh already-cast votes and settle the round.
    ///
    /// Agents missing from `votes` carry no power. A round with zero total
    /// power fails.
    pub fn resolve<R: Rng + ?Sized>(
        &self,
        agents: &mut [Agent],
        proposal: &Proposal,
        votes: BTreeMap<AgentId, bool>,
        rng: &mut R,
    ) -> VoteResult {
        let powers = self.round_powers(agents, rng);

        let mut yes_power = 0.0;
        let mut no_power = 0.0;
        let mut voting_powers = BTreeMap::new();
        for (agent, &power) in agents.iter().zip(&powers) {
            let Some(&vote) = votes.get(&agent.agent_id) else {
                continue;
            };
            if vote {
                yes_power += power;
            } else {
                no_power += power;
            }
            voting_powers.insert(agent.agent_id, power);
        }
        let total_power = yes_power + no_power;

        let passed = if total_power > 0.0 {
            yes_power / total_power >= self.mechanism.threshold()
        } else {
            false
        };
        let correct_outcome = passed == proposal.is_objectively_good();

        let agents_slashed = if correct_outcome {
            Vec::new()
        } else {
            self.slashing.apply(agents, &votes, proposal, passed)
        };

        VoteResult {
            proposal: *proposal,
            passed,
            total_voting_power: total_power,
            yes_voting_power: yes_power,
            no_voting_power: no_power,
            votes_cast: votes,
            voting_powers,
            agents_slashed,
            correct_outcome,
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
