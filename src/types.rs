// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Governance Break-Test Suite ("The Arena") - Type Definitions

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::mechanism::{ConfigError, MechanismConfig};
use crate::stats::Stats;

pub type AgentId = u32;

/// Quality at or above which a proposal is objectively good.
pub const GOOD_PROPOSAL_QUALITY: f64 = 0.5;

// ─── Agent Type ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgentType {
    #[serde(rename = "honest")]
    Honest,
    #[serde(rename = "collusion")]
    Colluding,
    #[serde(rename = "whale")]
    Whale,
    #[serde(rename = "sybil")]
    Sybil,
    #[serde(rename = "emotional_bias")]
    EmotionalBias,
    #[serde(rename = "systematic_bias")]
    SystematicBias,
}

impl AgentType {
    pub const ALL: [AgentType; 6] = [
        Self::Honest,
        Self::Colluding,
        Self::Whale,
        Self::Sybil,
        Self::EmotionalBias,
        Self::SystematicBias,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Honest => "honest",
            Self::Colluding => "collusion",
            Self::Whale => "whale",
            Self::Sybil => "sybil",
            Self::EmotionalBias => "emotional_bias",
            Self::SystematicBias => "systematic_bias",
        }
    }
}

impl FromStr for AgentType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownAgentType(s.to_string()))
    }
}

impl fmt::Display for AgentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Attack Type ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackType {
    Collusion,
    Whale,
    Sybil,
    Bias,
}

impl AttackType {
    /// Evaluation order for a full mechanism test.
    pub const ALL: [AttackType; 4] = [Self::Collusion, Self::Whale, Self::Sybil, Self::Bias];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Collusion => "collusion",
            Self::Whale => "whale",
            Self::Sybil => "sybil",
            Self::Bias => "bias",
        }
    }
}

impl FromStr for AttackType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownAttackType(s.to_string()))
    }
}

impl fmt::Display for AttackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Proposal ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub proposal_id: u64,
    /// 0.0 to 1.0
    pub quality: f64,
}

impl Proposal {
    pub fn new(proposal_id: u64, quality: f64) -> Self {
        Self { proposal_id, quality }
    }

    pub fn is_objectively_good(&self) -> bool {
        self.quality >= GOOD_PROPOSAL_QUALITY
    }
}

// ─── Vote Result (one per round) ────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteResult {
    pub proposal: Proposal,
    pub passed: bool,
    pub total_voting_power: f64,
    pub yes_voting_power: f64,
    pub no_voting_power: f64,
    pub votes_cast: BTreeMap<AgentId, bool>,
    /// Final per-agent power after sybil discount and cap.
    pub voting_powers: BTreeMap<AgentId, f64>,
    pub agents_slashed: Vec<AgentId>,
    pub correct_outcome: bool,
}

impl VoteResult {
    pub fn yes_fraction(&self) -> f64 {
        if self.total_voting_power > 0.0 {
            self.yes_voting_power / self.total_voting_power
        } else {
            0.0
        }
    }
}

// ─── Attack Result (one per mechanism × attack) ─────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackResult {
    pub attack_type: AttackType,
    pub mechanism: MechanismConfig,
    pub total_votes: u64,
    pub correct_outcomes: u64,
    /// correct_outcomes / total_votes, 0 when nothing was voted on.
    pub success_rate: f64,
    /// Spread of the success rate across independent instances.
    pub instance_success: Stats,
}

impl AttackResult {
    pub fn new(
        attack_type: AttackType,
        mechanism: MechanismConfig,
        total_votes: u64,
        correct_outcomes: u64,
        instance_rates: &[f64],
    ) -> Self {
        Self {
            attack_type,
            mechanism,
            total_votes,
            correct_outcomes,
            success_rate: success_rate(correct_outcomes, total_votes),
            instance_success: Stats::from_samples(instance_rates),
        }
    }
}

pub fn success_rate(correct: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        correct as f64 / total as f64
    }
}
