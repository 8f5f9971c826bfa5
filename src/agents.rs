// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Governance Break-Test Suite ("The Arena") - Agent Behavior Model
//
// Each agent type maps to a pure stochastic policy `quality -> vote`. Policies
// depend only on the current proposal quality (and, for honest agents, a
// threshold fixed at creation); randomness comes from the caller's generator.

use rand::Rng;
use serde::Serialize;

use crate::mechanism::ConfigError;
use crate::types::{AgentId, AgentType, GOOD_PROPOSAL_QUALITY};

/// Honest thresholds are drawn from this range at creation.
pub const HONESTY_THRESHOLD_RANGE: (f64, f64) = (0.4, 0.8);

/// Below this quality honest agents switch to the low-confidence curve.
const HONEST_AMBIGUITY_FLOOR: f64 = 0.4;

/// Quality band in which manipulators always vote against the truth.
const MANIPULATION_BAND: (f64, f64) = (0.4, 0.6);

/// Fuzzy edges around the manipulation band: (0.35, 0.4] and [0.6, 0.65).
const DECAY_LOW: (f64, f64) = (0.35, 0.4);
const DECAY_HIGH: (f64, f64) = (0.6, 0.65);

// ─── Agent ──────────────────────────────────────────────────────────────────

/// One voter. Honest agents are built only through [`Agent::honest`], so every
/// honest agent carries the threshold it drew at creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Agent {
    pub agent_id: AgentId,
    agent_type: AgentType,
    /// Initial stake, fixed at creation.
    pub stake: f64,
    /// Cumulative penalty, never above `stake`.
    pub amount_slashed: f64,
    honesty_threshold: Option<f64>,
}

impl Agent {
    /// Build a scripted (non-honest) agent. Honest agents need a threshold and
    /// are rejected here.
    pub fn new(agent_id: AgentId, agent_type: AgentType, stake: f64) -> Result<Self, ConfigError> {
        if agent_type == AgentType::Honest {
            return Err(ConfigError::MissingHonestyThreshold(agent_id));
        }
        Ok(Self::scripted(agent_id, agent_type, stake))
    }

    pub fn honest(agent_id: AgentId, stake: f64, threshold: f64) -> Self {
        Self {
            agent_id,
            agent_type: AgentType::Honest,
            stake,
            amount_slashed: 0.0,
            honesty_threshold: Some(threshold),
        }
    }

    /// Caller guarantees `agent_type` is not honest.
    pub(crate) fn scripted(agent_id: AgentId, agent_type: AgentType, stake: f64) -> Self {
        debug_assert_ne!(agent_type, AgentType::Honest);
        Self {
            agent_id,
            agent_type,
            stake,
            amount_slashed: 0.0,
            honesty_threshold: None,
        }
    }

    pub fn agent_type(&self) -> AgentType {
        self.agent_type
    }

    /// Set exactly for honest agents.
    pub fn honesty_threshold(&self) -> Option<f64> {
        self.honesty_threshold
    }

    /// Stake as it was before any slashing.
    pub fn original_stake(&self) -> f64 {
        self.stake
    }

    pub fn effective_stake(&self) -> f64 {
        (self.stake - self.amount_slashed).max(0.0)
    }

    /// Add a penalty, clamped so the cumulative total never exceeds `stake`.
    /// Returns the amount actually taken.
    pub fn apply_slashing(&mut self, amount: f64) -> f64 {
        let before = self.amount_slashed;
        self.amount_slashed = (self.amount_slashed + amount.max(0.0)).min(self.stake);
        self.amount_slashed - before
    }

    /// Cast a vote on a proposal of the given quality. `true` is YES.
    pub fn vote<R: Rng + ?Sized>(&self, quality: f64, rng: &mut R) -> bool {
        match (self.agent_type, self.honesty_threshold) {
            (AgentType::Honest, Some(x)) => honest_vote(quality, x, rng),
            (AgentType::Honest, None) => unreachable!("honest agents are built with a threshold"),
            (AgentType::Colluding | AgentType::Whale, _) => manipulator_vote(quality, rng),
            (AgentType::Sybil, _) => sybil_vote(quality),
            (AgentType::EmotionalBias, _) => emotional_vote(quality, rng),
            (AgentType::SystematicBias, _) => systematic_vote(quality),
        }
    }
}

// ─── Policies ───────────────────────────────────────────────────────────────

fn correct_vote(quality: f64) -> bool {
    quality >= GOOD_PROPOSAL_QUALITY
}

/// Probability an honest agent with threshold `x` votes YES.
///
/// Certain at or above the threshold, proportional to `quality / x` inside the
/// ambiguity band, and a small clamped curve at or below 0.4.
///
/// The threshold check runs first, so `quality == x` is always YES, including
/// the corner `quality == x == 0.4` where the low curve would otherwise apply.
pub fn honest_yes_probability(quality: f64, x: f64) -> f64 {
    if quality >= x {
        1.0
    } else if quality > HONEST_AMBIGUITY_FLOOR {
        quality / x
    } else {
        ((quality - 0.2) / (x + 0.5)).max(0.0)
    }
}

pub fn honest_vote<R: Rng + ?Sized>(quality: f64, x: f64, rng: &mut R) -> bool {
    let p = honest_yes_probability(quality, x);
    if p >= 1.0 {
        return true;
    }
    if p <= 0.0 {
        return false;
    }
    rng.gen::<f64>() < p
}

/// Colluding and whale agents: flip the truth inside the manipulation band,
/// flip it half the time on the band's edges, vote correctly elsewhere.
pub fn manipulator_vote<R: Rng + ?Sized>(quality: f64, rng: &mut R) -> bool {
    let correct = correct_vote(quality);
    if in_open(quality, MANIPULATION_BAND) {
        !correct
    } else if (quality > DECAY_LOW.0 && quality <= DECAY_LOW.1)
        || (quality >= DECAY_HIGH.0 && quality < DECAY_HIGH.1)
    {
        if rng.gen::<f64>() < 0.5 {
            !correct
        } else {
            correct
        }
    } else {
        correct
    }
}

/// Fully scripted: the manipulation band without the fuzzy edges.
pub fn sybil_vote(quality: f64) -> bool {
    let correct = correct_vote(quality);
    if in_open(quality, MANIPULATION_BAND) {
        !correct
    } else {
        correct
    }
}

/// Coin flip between the right and wrong answer.
pub fn emotional_vote<R: Rng + ?Sized>(quality: f64, rng: &mut R) -> bool {
    let correct = correct_vote(quality);
    if rng.gen::<f64>() < 0.5 {
        !correct
    } else {
        correct
    }
}

/// Always wrong.
pub fn systematic_vote(quality: f64) -> bool {
    !correct_vote(quality)
}

fn in_open(v: f64, (lo, hi): (f64, f64)) -> bool {
    v > lo && v < hi
}

// ===========================================================================
// Tests
// ===========================================================================
