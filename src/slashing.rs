// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Governance Break-Test Suite ("The Arena") - Slashing Engine
//
// Runs only after an incorrect outcome. Agents whose vote backed the wrong
// outcome lose `effective_stake * rate * multiplier`, clamped at their stake.
// Penalties persist for the rest of the instance.

use std::collections::BTreeMap;

use crate::agents::Agent;
use crate::mechanism::{MechanismConfig, SlashingMethod};
use crate::types::{AgentId, Proposal};

/// Extra multiplier per equivalent prior hit under progressive slashing.
const PROGRESSIVE_STEP: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlashingEngine {
    pub method: SlashingMethod,
    pub rate: f64,
}

impl SlashingEngine {
    pub fn new(method: SlashingMethod, rate: f64) -> Self {
        Self { method, rate }
    }

    pub fn from_mechanism(mechanism: &MechanismConfig) -> Self {
        Self::new(mechanism.slashing_method, mechanism.rate())
    }

    pub fn is_enabled(&self) -> bool {
        self.method != SlashingMethod::None && self.rate > 0.0
    }

    /// Growth factor applied to the base penalty, from the agent's prior damage.
    pub fn penalty_multiplier(&self, agent: &Agent) -> f64 {
        let original = agent.original_stake();
        match self.method {
            SlashingMethod::None | SlashingMethod::Linear => 1.0,
            SlashingMethod::Exponential => {
                if original > 0.0 {
                    1.0 + agent.amount_slashed / original
                } else {
                    1.0
                }
            }
            SlashingMethod::Progressive => {
                let times_slashed = if self.rate > 0.0 && original > 0.0 {
                    agent.amount_slashed / (self.rate * original)
                } else {
                    0.0
                };
                1.0 + PROGRESSIVE_STEP * times_slashed
            }
        }
    }

    /// Penalty the agent would take right now.
    pub fn slash_amount(&self, agent: &Agent) -> f64 {
        agent.effective_stake() * self.rate * self.penalty_multiplier(agent)
    }

    /// Penalize every agent that backed the wrong outcome. Returns their ids in
    /// roster order. No-op when the outcome was correct or slashing is off.
    pub fn apply(
        &self,
        agents: &mut [Agent],
        votes: &BTreeMap<AgentId, bool>,
        proposal: &Proposal,
        passed: bool,
    ) -> Vec<AgentId> {
        let good = proposal.is_objectively_good();
        if !self.is_enabled() || passed == good {
            return Vec::new();
        }

        let mut slashed = Vec::new();
        for agent in agents.iter_mut() {
            let Some(&vote) = votes.get(&agent.agent_id) else {
                continue;
            };
            if backed_wrong_outcome(vote, passed, good) {
                let amount = self.slash_amount(agent);
                agent.apply_slashing(amount);
                slashed.push(agent.agent_id);
            }
        }
        slashed
    }
}

/// YES on a bad proposal that passed, or NO on a good proposal that failed.
pub fn backed_wrong_outcome(vote: bool, passed: bool, objectively_good: bool) -> bool {
    (passed && !objectively_good && vote) || (!passed && objectively_good && !vote)
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AgentType;

    fn agent(id: AgentId, stake: f64) -> Agent {
        Agent::new(id, AgentType::Colluding, stake).unwrap()
    }

    #[test]
    fn only_supporters_of_the_wrong_outcome_match() {
        // bad proposal passed: YES voters are at fault
        assert!(backed_wrong_outcome(true, true, false));
        assert!(!backed_wrong_outcome(false, true, false));
        // good proposal failed: NO voters are at fault
        assert!(backed_wrong_outcome(false, false, true));
        assert!(!backed_wrong_outcome(true, false, true));
        // correct outcomes never match
        assert!(!backed_wrong_outcome(true, true, true));
        assert!(!backed_wrong_outcome(false, false, false));
    }

    #[test]
    fn linear_takes_rate_of_effective_stake() {
        let engine = SlashingEngine::new(SlashingMethod::Linear, 0.1);
        let mut a = agent(1, 10.0);
        assert!((engine.slash_amount(&a) - 1.0).abs() < 1e-12);
        a.apply_slashing(engine.slash_amount(&a));
        assert!((engine.slash_amount(&a) - 0.9).abs() < 1e-12);
    }

    #[test]
    fn exponential_multiplier_grows_with_damage() {
        let engine = SlashingEngine::new(SlashingMethod::Exponential, 0.2);
        let mut a = agent(1, 10.0);
        let first = engine.penalty_multiplier(&a);
        assert_eq!(first, 1.0);
        a.apply_slashing(engine.slash_amount(&a));
        let second = engine.penalty_multiplier(&a);
        assert!(second > first);
        assert!((second - 1.2).abs() < 1e-12);
    }

    #[test]
    fn progressive_counts_equivalent_prior_hits() {
        let engine = SlashingEngine::new(SlashingMethod::Progressive, 0.1);
        let mut a = agent(1, 10.0);
        a.apply_slashing(2.0); // two hits' worth at 10% of 10
        assert!((engine.penalty_multiplier(&a) - 2.0).abs() < 1e-12);
        // base 8.0 * 0.1 = 0.8, doubled
        assert!((engine.slash_amount(&a) - 1.6).abs() < 1e-12);
    }

    #[test]
    fn progressive_with_zero_rate_is_flat() {
        let engine = SlashingEngine::new(SlashingMethod::Progressive, 0.0);
        let mut a = agent(1, 10.0);
        a.apply_slashing(5.0);
        assert_eq!(engine.penalty_multiplier(&a), 1.0);
        assert!(!engine.is_enabled());
    }

    #[test]
    fn apply_slashes_yes_voters_on_passed_bad_proposal() {
        let engine = SlashingEngine::new(SlashingMethod::Linear, 0.3);
        let mut agents = vec![agent(1, 10.0), agent(2, 10.0), agent(3, 10.0)];
        let votes = BTreeMap::from([(1, true), (2, false), (3, true)]);
        let slashed = engine.apply(&mut agents, &votes, &Proposal::new(1, 0.2), true);
        assert_eq!(slashed, vec![1, 3]);
        assert!((agents[0].amount_slashed - 3.0).abs() < 1e-12);
        assert_eq!(agents[1].amount_slashed, 0.0);
    }

    #[test]
    fn apply_is_noop_for_correct_outcome_or_disabled() {
        let mut agents = vec![agent(1, 10.0)];
        let votes = BTreeMap::from([(1, true)]);
        let linear = SlashingEngine::new(SlashingMethod::Linear, 0.3);
        assert!(linear.apply(&mut agents, &votes, &Proposal::new(1, 0.8), true).is_empty());

        let none = SlashingEngine::new(SlashingMethod::None, 0.3);
        assert!(none.apply(&mut agents, &votes, &Proposal::new(2, 0.2), true).is_empty());
        assert_eq!(agents[0].amount_slashed, 0.0);
    }

    #[test]
    fn repeated_slashing_never_exceeds_stake() {
        let engine = SlashingEngine::new(SlashingMethod::Exponential, 0.3);
        let mut a = agent(1, 5.0);
        for _ in 0..200 {
            a.apply_slashing(engine.slash_amount(&a));
            assert!(a.amount_slashed <= a.stake);
            assert!(a.effective_stake() >= 0.0);
        }
    }
}
