// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Governance Break-Test Suite ("The Arena") - Mechanism Configuration
//
// A mechanism is a plain value of seven fields. Numeric fields are Decimal so
// two configurations drawn from the same grid compare and hash structurally,
// which is what deduplication and ranking joins key on.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::adapter::from_decimal;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Configuration contract violations. Always fatal: nothing retries these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown voting method: {0:?}")]
    UnknownVotingMethod(String),
    #[error("unknown stake method: {0:?}")]
    UnknownStakeMethod(String),
    #[error("unknown slashing method: {0:?}")]
    UnknownSlashingMethod(String),
    #[error("unknown agent type: {0:?}")]
    UnknownAgentType(String),
    #[error("unknown attack type: {0:?}")]
    UnknownAttackType(String),
    #[error("honest agent {0} was built without an honesty threshold")]
    MissingHonestyThreshold(crate::types::AgentId),
    #[error("{field} = {value} is outside {range}")]
    OutOfRange {
        field: &'static str,
        value: Decimal,
        range: &'static str,
    },
}

// ---------------------------------------------------------------------------
// Method enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VotingMethod {
    /// One agent, one vote.
    SimpleMajority,
    Weighted,
    Quadratic,
}

impl VotingMethod {
    pub const ALL: [VotingMethod; 3] = [Self::SimpleMajority, Self::Weighted, Self::Quadratic];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SimpleMajority => "simple_majority",
            Self::Weighted => "weighted",
            Self::Quadratic => "quadratic",
        }
    }
}

impl FromStr for VotingMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownVotingMethod(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StakeMethod {
    TokenBased,
    /// Same base power as token-based in this model.
    ReputationBased,
    /// Average of effective stake and equal weight.
    Hybrid,
    EqualWeight,
}

impl StakeMethod {
    pub const ALL: [StakeMethod; 4] = [
        Self::TokenBased,
        Self::ReputationBased,
        Self::Hybrid,
        Self::EqualWeight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TokenBased => "token_based",
            Self::ReputationBased => "reputation_based",
            Self::Hybrid => "hybrid",
            Self::EqualWeight => "equal_weight",
        }
    }
}

impl FromStr for StakeMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownStakeMethod(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlashingMethod {
    None,
    Linear,
    /// Multiplier grows with the fraction of stake already lost.
    Exponential,
    /// Multiplier grows by 50% per equivalent prior hit.
    Progressive,
}

impl SlashingMethod {
    pub const ALL: [SlashingMethod; 4] = [
        Self::None,
        Self::Linear,
        Self::Exponential,
        Self::Progressive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Linear => "linear",
            Self::Exponential => "exponential",
            Self::Progressive => "progressive",
        }
    }
}

impl FromStr for SlashingMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownSlashingMethod(s.to_string()))
    }
}

macro_rules! impl_display_as_str {
    ($($t:ty),*) => {
        $(impl fmt::Display for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

impl_display_as_str!(VotingMethod, StakeMethod, SlashingMethod);

// ---------------------------------------------------------------------------
// MechanismConfig
// ---------------------------------------------------------------------------

/// Immutable mechanism description. Equal field values mean the same mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MechanismConfig {
    pub voting_method: VotingMethod,
    pub stake_method: StakeMethod,
    pub slashing_method: SlashingMethod,
    /// Minimum yes-power fraction to pass, in [0.5, 1.0].
    pub consensus_threshold: Decimal,
    /// Fraction of effective stake taken per slash, in [0, 0.3].
    pub slashing_rate: Decimal,
    /// Probability a sybil's vote is discarded, in [0, 1].
    pub sybil_resistance: Decimal,
    /// Max share of a round's total power any single agent may hold, in (0, 1].
    pub max_voting_power: Decimal,
}

impl MechanismConfig {
    /// Build and validate a configuration.
    pub fn new(
        voting_method: VotingMethod,
        stake_method: StakeMethod,
        slashing_method: SlashingMethod,
        consensus_threshold: Decimal,
        slashing_rate: Decimal,
        sybil_resistance: Decimal,
        max_voting_power: Decimal,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            voting_method,
            stake_method,
            slashing_method,
            consensus_threshold,
            slashing_rate,
            sybil_resistance,
            max_voting_power,
        };
        config.validate()?;
        Ok(config)
    }

    /// Build from the string method names used in reports and settings files.
    pub fn parse(
        voting_method: &str,
        stake_method: &str,
        slashing_method: &str,
        consensus_threshold: Decimal,
        slashing_rate: Decimal,
        sybil_resistance: Decimal,
        max_voting_power: Decimal,
    ) -> Result<Self, ConfigError> {
        Self::new(
            voting_method.parse()?,
            stake_method.parse()?,
            slashing_method.parse()?,
            consensus_threshold,
            slashing_rate,
            sybil_resistance,
            max_voting_power,
        )
    }

    /// Check every numeric field against its documented range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range(
            "consensus_threshold",
            self.consensus_threshold,
            dec!(0.5),
            dec!(1),
            "[0.5, 1.0]",
        )?;
        check_range("slashing_rate", self.slashing_rate, dec!(0), dec!(0.3), "[0, 0.3]")?;
        check_range("sybil_resistance", self.sybil_resistance, dec!(0), dec!(1), "[0, 1]")?;
        if self.max_voting_power <= Decimal::ZERO || self.max_voting_power > dec!(1) {
            return Err(ConfigError::OutOfRange {
                field: "max_voting_power",
                value: self.max_voting_power,
                range: "(0, 1]",
            });
        }
        Ok(())
    }

    pub fn threshold(&self) -> f64 {
        from_decimal(self.consensus_threshold)
    }

    pub fn rate(&self) -> f64 {
        from_decimal(self.slashing_rate)
    }

    pub fn sybil_strength(&self) -> f64 {
        from_decimal(self.sybil_resistance)
    }

    pub fn max_power_share(&self) -> f64 {
        from_decimal(self.max_voting_power)
    }
}

fn check_range(
    field: &'static str,
    value: Decimal,
    min: Decimal,
    max: Decimal,
    range: &'static str,
) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(ConfigError::OutOfRange { field, value, range });
    }
    Ok(())
}

impl fmt::Display for MechanismConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{} threshold={} rate={} sybil={} max_power={}",
            self.voting_method,
            self.stake_method,
            self.slashing_method,
            self.consensus_threshold.normalize(),
            self.slashing_rate.normalize(),
            self.sybil_resistance.normalize(),
            self.max_voting_power.normalize(),
        )
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slashing::SlashingEngine;
    use std::collections::HashSet;

    fn ocean() -> MechanismConfig {
        MechanismConfig::new(
            VotingMethod::Weighted,
            StakeMethod::TokenBased,
            SlashingMethod::None,
            dec!(0.50),
            dec!(0.0),
            dec!(0.95),
            dec!(1.0),
        )
        .unwrap()
    }

    #[test]
    fn method_names_parse() {
        assert_eq!("quadratic".parse::<VotingMethod>(), Ok(VotingMethod::Quadratic));
        assert_eq!("hybrid".parse::<StakeMethod>(), Ok(StakeMethod::Hybrid));
        assert_eq!("progressive".parse::<SlashingMethod>(), Ok(SlashingMethod::Progressive));
    }

    #[test]
    fn unknown_methods_are_rejected() {
        assert_eq!(
            "proof_of_work".parse::<StakeMethod>(),
            Err(ConfigError::UnknownStakeMethod("proof_of_work".into()))
        );
        assert!(matches!(
            "ranked_choice".parse::<VotingMethod>(),
            Err(ConfigError::UnknownVotingMethod(_))
        ));
        assert!(matches!(
            "burn".parse::<SlashingMethod>(),
            Err(ConfigError::UnknownSlashingMethod(_))
        ));
    }

    #[test]
    fn structural_equality_ignores_decimal_scale() {
        let a = ocean();
        let mut b = ocean();
        b.consensus_threshold = dec!(0.5);
        b.max_voting_power = dec!(1);
        assert_eq!(a, b);

        let set: HashSet<MechanismConfig> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn ranges_are_enforced() {
        let mut m = ocean();
        m.consensus_threshold = dec!(0.49);
        assert!(matches!(
            m.validate(),
            Err(ConfigError::OutOfRange { field: "consensus_threshold", .. })
        ));

        let mut m = ocean();
        m.slashing_rate = dec!(0.31);
        assert!(m.validate().is_err());

        let mut m = ocean();
        m.max_voting_power = dec!(0);
        assert!(matches!(
            m.validate(),
            Err(ConfigError::OutOfRange { field: "max_voting_power", .. })
        ));
    }

    #[test]
    fn slashing_needs_method_and_rate() {
        let enabled = |m: &MechanismConfig| SlashingEngine::from_mechanism(m).is_enabled();
        let mut m = ocean();
        assert!(!enabled(&m));
        m.slashing_method = SlashingMethod::Linear;
        assert!(!enabled(&m));
        m.slashing_rate = dec!(0.1);
        assert!(enabled(&m));
    }

    #[test]
    fn json_uses_snake_case_names() {
        let json = serde_json::to_value(ocean()).unwrap();
        assert_eq!(json["voting_method"], "weighted");
        assert_eq!(json["stake_method"], "token_based");
        assert_eq!(json["slashing_method"], "none");

        let back: MechanismConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, ocean());
    }

    #[test]
    fn display_is_compact() {
        assert_eq!(
            ocean().to_string(),
            "weighted/token_based/none threshold=0.5 rate=0 sybil=0.95 max_power=1"
        );
    }
}
