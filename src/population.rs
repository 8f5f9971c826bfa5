// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Governance Break-Test Suite ("The Arena") - Attack Population Builder
//
// Every instance gets a freshly constructed roster: new ids, new stakes, new
// honesty thresholds. Nothing is reused between instances.

use rand::Rng;

use crate::agents::{Agent, HONESTY_THRESHOLD_RANGE};
use crate::types::{AgentId, AgentType, AttackType};

/// Every scenario fields this many agents.
pub const POPULATION_SIZE: usize = 50;

/// Stake range for honest, colluding and biased agents.
pub const STANDARD_STAKE_RANGE: (f64, f64) = (5.0, 10.0);
pub const WHALE_STAKE_RANGE: (f64, f64) = (50.0, 200.0);
pub const SYBIL_STAKE: f64 = 1.0;

/// Adversaries come first in the roster, honest agents fill the rest.
pub fn composition(attack: AttackType) -> &'static [(AgentType, usize)] {
    match attack {
        AttackType::Collusion => &[(AgentType::Colluding, 8), (AgentType::Honest, 42)],
        AttackType::Whale => &[(AgentType::Whale, 4), (AgentType::Honest, 46)],
        AttackType::Sybil => &[(AgentType::Sybil, 10), (AgentType::Honest, 40)],
        AttackType::Bias => &[
            (AgentType::EmotionalBias, 5),
            (AgentType::SystematicBias, 5),
            (AgentType::Honest, 40),
        ],
    }
}

// ─── Agent Factory ──────────────────────────────────────────────────────────

/// Hands out run-unique ids and samples per-type stakes.
#[derive(Debug, Clone, Default)]
pub struct AgentFactory {
    last_id: AgentId,
}

impl AgentFactory {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> AgentId {
        self.last_id += 1;
        self.last_id
    }

    pub fn create<R: Rng + ?Sized>(&mut self, agent_type: AgentType, rng: &mut R) -> Agent {
        let id = self.next_id();
        match agent_type {
            AgentType::Honest => {
                let stake = sample(rng, STANDARD_STAKE_RANGE);
                let threshold = sample(rng, HONESTY_THRESHOLD_RANGE);
                Agent::honest(id, stake, threshold)
            }
            AgentType::Whale => Agent::scripted(id, agent_type, sample(rng, WHALE_STAKE_RANGE)),
            AgentType::Sybil => Agent::scripted(id, agent_type, SYBIL_STAKE),
            AgentType::Colluding | AgentType::EmotionalBias | AgentType::SystematicBias => {
                Agent::scripted(id, agent_type, sample(rng, STANDARD_STAKE_RANGE))
            }
        }
    }

    /// Ids issued so far.
    pub fn issued(&self) -> AgentId {
        self.last_id
    }
}

fn sample<R: Rng + ?Sized>(rng: &mut R, (lo, hi): (f64, f64)) -> f64 {
    rng.gen_range(lo..=hi)
}

// ─── Population Builder ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct PopulationBuilder {
    factory: AgentFactory,
}

impl PopulationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a fresh roster for one instance of `attack`.
    pub fn build<R: Rng + ?Sized>(&mut self, attack: AttackType, rng: &mut R) -> Vec<Agent> {
        let mut agents = Vec::with_capacity(POPULATION_SIZE);
        for &(agent_type, count) in composition(attack) {
            for _ in 0..count {
                agents.push(self.factory.create(agent_type, rng));
            }
        }
        agents
    }

    /// Restart id numbering from 1.
    pub fn reset(&mut self) {
        self.factory = AgentFactory::new();
    }

    pub fn factory(&self) -> &AgentFactory {
        &self.factory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::{BTreeMap, HashSet};

    fn counts(agents: &[Agent]) -> BTreeMap<AgentType, usize> {
        let mut m = BTreeMap::new();
        for a in agents {
            *m.entry(a.agent_type()).or_insert(0) += 1;
        }
        m
    }

    #[test]
    fn every_scenario_has_fifty_agents() {
        for attack in AttackType::ALL {
            let total: usize = composition(attack).iter().map(|(_, n)| n).sum();
            assert_eq!(total, POPULATION_SIZE, "{attack}");
        }
    }

    #[test]
    fn bias_roster_composition() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let agents = PopulationBuilder::new().build(AttackType::Bias, &mut rng);
        let c = counts(&agents);
        assert_eq!(c[&AgentType::EmotionalBias], 5);
        assert_eq!(c[&AgentType::SystematicBias], 5);
        assert_eq!(c[&AgentType::Honest], 40);
        assert_eq!(agents.len(), 50);
    }

    #[test]
    fn stakes_fall_in_type_ranges() {
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        let mut builder = PopulationBuilder::new();
        for attack in AttackType::ALL {
            for a in builder.build(attack, &mut rng) {
                match a.agent_type() {
                    AgentType::Whale => assert!((50.0..=200.0).contains(&a.stake)),
                    AgentType::Sybil => assert_eq!(a.stake, 1.0),
                    _ => assert!((5.0..=10.0).contains(&a.stake)),
                }
                assert_eq!(a.amount_slashed, 0.0);
                match a.agent_type() {
                    AgentType::Honest => {
                        let x = a.honesty_threshold().unwrap();
                        assert!((0.4..=0.8).contains(&x));
                    }
                    _ => assert!(a.honesty_threshold().is_none()),
                }
            }
        }
    }

    #[test]
    fn ids_stay_unique_across_rosters() {
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        let mut builder = PopulationBuilder::new();
        let mut seen = HashSet::new();
        for _ in 0..3 {
            for attack in AttackType::ALL {
                for a in builder.build(attack, &mut rng) {
                    assert!(seen.insert(a.agent_id));
                }
            }
        }
        assert_eq!(builder.factory().issued() as usize, seen.len());

        builder.reset();
        assert_eq!(builder.build(AttackType::Whale, &mut rng)[0].agent_id, 1);
    }
}
