// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Governance Break-Test Suite ("The Arena") - Mechanism Generator
//
// Produces the mechanisms a sweep evaluates: random unique samples, the full
// enumerated grid, and a catalog of configurations modelled on deployed
// networks that serve as reference points in the rankings.

use std::collections::HashSet;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::mechanism::{MechanismConfig, SlashingMethod, StakeMethod, VotingMethod};

// ---------------------------------------------------------------------------
// Parameter grid
// ---------------------------------------------------------------------------

pub const CONSENSUS_THRESHOLDS: [Decimal; 13] = [
    dec!(0.50), dec!(0.51), dec!(0.55), dec!(0.60), dec!(0.65), dec!(0.70), dec!(0.75),
    dec!(0.80), dec!(0.85), dec!(0.90), dec!(0.95), dec!(0.98), dec!(1.0),
];

pub const SLASHING_RATES: [Decimal; 7] = [
    dec!(0.0), dec!(0.05), dec!(0.10), dec!(0.15), dec!(0.20), dec!(0.25), dec!(0.30),
];

pub const SYBIL_RESISTANCE_VALUES: [Decimal; 9] = [
    dec!(0.0), dec!(0.125), dec!(0.25), dec!(0.375), dec!(0.5),
    dec!(0.625), dec!(0.75), dec!(0.875), dec!(1.0),
];

pub const MAX_VOTING_POWER_VALUES: [Decimal; 10] = [
    dec!(0.1), dec!(0.2), dec!(0.3), dec!(0.4), dec!(0.5),
    dec!(0.6), dec!(0.7), dec!(0.8), dec!(0.9), dec!(1.0),
];

/// Random sampling gives up after this many draws per requested mechanism.
const ATTEMPTS_PER_MECHANISM: usize = 10;

/// Size of the full grid.
pub fn total_possible() -> usize {
    VotingMethod::ALL.len()
        * StakeMethod::ALL.len()
        * SlashingMethod::ALL.len()
        * CONSENSUS_THRESHOLDS.len()
        * SLASHING_RATES.len()
        * SYBIL_RESISTANCE_VALUES.len()
        * MAX_VOTING_POWER_VALUES.len()
}

// ---------------------------------------------------------------------------
// Real-world classes
// ---------------------------------------------------------------------------

/// Reference families modelled on deployed networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RealWorldClass {
    /// weighted + token_based + 0.51; any slashing.
    Bittensor,
    /// simple_majority + token_based + linear + 0.50; any rate.
    Gensyn,
    /// weighted + token_based + none + 0.50 + rate 0.
    Ocean,
    /// quadratic + hybrid + 0.65; any slashing.
    SingularityNet,
}

/// Every catalog family fixes sybil resistance at 0.95 and max power at 1.0.
const CATALOG_SYBIL_RESISTANCE: Decimal = dec!(0.95);
const CATALOG_MAX_POWER: Decimal = dec!(1.0);

impl RealWorldClass {
    pub const ALL: [RealWorldClass; 4] =
        [Self::Bittensor, Self::Gensyn, Self::Ocean, Self::SingularityNet];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bittensor => "bittensor",
            Self::Gensyn => "gensyn",
            Self::Ocean => "ocean",
            Self::SingularityNet => "singularity_net",
        }
    }

    /// Does `m` carry this family's fixed fields?
    pub fn matches(&self, m: &MechanismConfig) -> bool {
        if m.sybil_resistance != CATALOG_SYBIL_RESISTANCE || m.max_voting_power != CATALOG_MAX_POWER {
            return false;
        }
        match self {
            Self::Bittensor => {
                m.voting_method == VotingMethod::Weighted
                    && m.stake_method == StakeMethod::TokenBased
                    && m.consensus_threshold == dec!(0.51)
            }
            Self::Gensyn => {
                m.voting_method == VotingMethod::SimpleMajority
                    && m.stake_method == StakeMethod::TokenBased
                    && m.slashing_method == SlashingMethod::Linear
                    && m.consensus_threshold == dec!(0.50)
            }
            Self::Ocean => {
                m.voting_method == VotingMethod::Weighted
                    && m.stake_method == StakeMethod::TokenBased
                    && m.slashing_method == SlashingMethod::None
                    && m.consensus_threshold == dec!(0.50)
                    && m.slashing_rate.is_zero()
            }
            Self::SingularityNet => {
                m.voting_method == VotingMethod::Quadratic
                    && m.stake_method == StakeMethod::Hybrid
                    && m.consensus_threshold == dec!(0.65)
            }
        }
    }

    /// First family `m` belongs to, if any.
    pub fn classify(m: &MechanismConfig) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.matches(m))
    }

    /// Every catalog member of this family.
    pub fn members(&self) -> Vec<MechanismConfig> {
        let catalog = |voting: VotingMethod,
                       stake: StakeMethod,
                       slashing: SlashingMethod,
                       threshold: Decimal,
                       rate: Decimal| MechanismConfig {
            voting_method: voting,
            stake_method: stake,
            slashing_method: slashing,
            consensus_threshold: threshold,
            slashing_rate: rate,
            sybil_resistance: CATALOG_SYBIL_RESISTANCE,
            max_voting_power: CATALOG_MAX_POWER,
        };
        let every_slashing = |voting: VotingMethod, stake: StakeMethod, threshold: Decimal| {
            let mut out = Vec::with_capacity(SlashingMethod::ALL.len() * SLASHING_RATES.len());
            for slashing in SlashingMethod::ALL {
                for rate in SLASHING_RATES {
                    out.push(catalog(voting, stake, slashing, threshold, rate));
                }
            }
            out
        };
        match self {
            Self::Bittensor => every_slashing(VotingMethod::Weighted, StakeMethod::TokenBased, dec!(0.51)),
            Self::Gensyn => SLASHING_RATES
                .into_iter()
                .map(|rate| {
                    catalog(
                        VotingMethod::SimpleMajority,
                        StakeMethod::TokenBased,
                        SlashingMethod::Linear,
                        dec!(0.50),
                        rate,
                    )
                })
                .collect(),
            Self::Ocean => vec![catalog(
                VotingMethod::Weighted,
                StakeMethod::TokenBased,
                SlashingMethod::None,
                dec!(0.50),
                dec!(0.0),
            )],
            Self::SingularityNet => every_slashing(VotingMethod::Quadratic, StakeMethod::Hybrid, dec!(0.65)),
        }
    }
}

/// All reference configurations, family by family.
pub fn real_world_catalog() -> Vec<MechanismConfig> {
    RealWorldClass::ALL.iter().flat_map(|c| c.members()).collect()
}

pub fn is_real_world(m: &MechanismConfig) -> bool {
    RealWorldClass::classify(m).is_some()
}

// ---------------------------------------------------------------------------
// MechanismGenerator
// ---------------------------------------------------------------------------

/// Samples mechanisms from the grid, never handing out the same value twice.
pub struct MechanismGenerator {
    rng: ChaCha8Rng,
    generated: HashSet<MechanismConfig>,
}

impl MechanismGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            generated: HashSet::new(),
        }
    }

    /// One independent uniform choice per field.
    pub fn random_mechanism(&mut self) -> MechanismConfig {
        let rng = &mut self.rng;
        MechanismConfig {
            voting_method: *pick(&VotingMethod::ALL, rng),
            stake_method: *pick(&StakeMethod::ALL, rng),
            slashing_method: *pick(&SlashingMethod::ALL, rng),
            consensus_threshold: *pick(&CONSENSUS_THRESHOLDS, rng),
            slashing_rate: *pick(&SLASHING_RATES, rng),
            sybil_resistance: *pick(&SYBIL_RESISTANCE_VALUES, rng),
            max_voting_power: *pick(&MAX_VOTING_POWER_VALUES, rng),
        }
    }

    /// Up to `n` mechanisms not handed out before. Returns fewer if sampling
    /// keeps hitting duplicates.
    pub fn unique_mechanisms(&mut self, n: usize) -> Vec<MechanismConfig> {
        let max_attempts = n.saturating_mul(ATTEMPTS_PER_MECHANISM);
        let mut mechanisms = Vec::with_capacity(n);
        let mut attempts = 0;
        while mechanisms.len() < n && attempts < max_attempts {
            let m = self.random_mechanism();
            if self.generated.insert(m) {
                mechanisms.push(m);
            }
            attempts += 1;
        }
        if mechanisms.len() < n {
            warn!(
                requested = n,
                generated = mechanisms.len(),
                attempts,
                "could not sample enough unique mechanisms"
            );
        }
        mechanisms
    }

    /// Every grid point, in field order.
    pub fn all_mechanisms(&self) -> Vec<MechanismConfig> {
        let mut out = Vec::with_capacity(total_possible());
        for voting_method in VotingMethod::ALL {
            for stake_method in StakeMethod::ALL {
                for slashing_method in SlashingMethod::ALL {
                    for consensus_threshold in CONSENSUS_THRESHOLDS {
                        for slashing_rate in SLASHING_RATES {
                            for sybil_resistance in SYBIL_RESISTANCE_VALUES {
                                for max_voting_power in MAX_VOTING_POWER_VALUES {
                                    out.push(MechanismConfig {
                                        voting_method,
                                        stake_method,
                                        slashing_method,
                                        consensus_threshold,
                                        slashing_rate,
                                        sybil_resistance,
                                        max_voting_power,
                                    });
                                }
                            }
                        }
                    }
                }
            }
        }
        info!(count = out.len(), "enumerated full mechanism grid");
        out
    }

    /// The whole grid when `n` covers it, a unique random sample otherwise.
    pub fn systematic_sample(&mut self, n: usize) -> Vec<MechanismConfig> {
        if n >= total_possible() {
            self.all_mechanisms()
        } else {
            self.unique_mechanisms(n)
        }
    }

    /// The reference catalog first, then unique random mechanisms up to `n`.
    pub fn mixed_with_real_world(&mut self, n: usize) -> Vec<MechanismConfig> {
        let mut mechanisms = real_world_catalog();
        self.generated.extend(mechanisms.iter().copied());
        let remaining = n.saturating_sub(mechanisms.len());
        if remaining > 0 {
            let random = self.unique_mechanisms(remaining);
            info!(catalog = mechanisms.len(), random = random.len(), "mixed mechanism set");
            mechanisms.extend(random);
        }
        mechanisms.truncate(n);
        mechanisms
    }

    /// Mechanisms for a sweep of `count`, or of the full grid when `None`.
    /// The catalog always leads.
    pub fn sweep(&mut self, count: Option<usize>) -> Vec<MechanismConfig> {
        match count {
            Some(n) => self.mixed_with_real_world(n),
            None => {
                // catalog points sit off the grid (sybil resistance 0.95)
                let mut mechanisms = real_world_catalog();
                mechanisms.extend(self.all_mechanisms());
                mechanisms
            }
        }
    }
}

fn pick<'a, T>(values: &'a [T], rng: &mut ChaCha8Rng) -> &'a T {
    &values[rng.gen_range(0..values.len())]
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_size() {
        assert_eq!(total_possible(), 393_120);
    }

    #[test]
    fn random_mechanisms_are_valid() {
        let mut generator = MechanismGenerator::new(1);
        for _ in 0..500 {
            assert!(generator.random_mechanism().validate().is_ok());
        }
    }

    #[test]
    fn unique_sampling_has_no_duplicates() {
        let mut generator = MechanismGenerator::new(2);
        let first = generator.unique_mechanisms(300);
        let second = generator.unique_mechanisms(300);
        let all: HashSet<_> = first.iter().chain(&second).collect();
        assert_eq!(first.len(), 300);
        assert_eq!(all.len(), 600);
    }

    #[test]
    fn same_seed_same_sample() {
        let a = MechanismGenerator::new(3).unique_mechanisms(50);
        let b = MechanismGenerator::new(3).unique_mechanisms(50);
        assert_eq!(a, b);
    }

    #[test]
    fn catalog_family_sizes() {
        assert_eq!(RealWorldClass::Bittensor.members().len(), 28);
        assert_eq!(RealWorldClass::Gensyn.members().len(), 7);
        assert_eq!(RealWorldClass::Ocean.members().len(), 1);
        assert_eq!(RealWorldClass::SingularityNet.members().len(), 28);
        let catalog = real_world_catalog();
        assert_eq!(catalog.len(), 64);
        assert!(catalog.iter().all(|m| m.validate().is_ok()));
        assert!(catalog.iter().all(is_real_world));
    }

    #[test]
    fn classification_uses_fixed_fields() {
        let ocean = RealWorldClass::Ocean.members()[0];
        assert_eq!(RealWorldClass::classify(&ocean), Some(RealWorldClass::Ocean));

        let mut off_catalog = ocean;
        off_catalog.sybil_resistance = dec!(0.875);
        assert_eq!(RealWorldClass::classify(&off_catalog), None);

        let gensyn = RealWorldClass::Gensyn.members()[3];
        assert_eq!(RealWorldClass::classify(&gensyn), Some(RealWorldClass::Gensyn));
    }

    #[test]
    fn mixed_set_leads_with_catalog_and_stays_unique() {
        let mut generator = MechanismGenerator::new(4);
        let mixed = generator.mixed_with_real_world(200);
        assert_eq!(mixed.len(), 200);
        assert_eq!(&mixed[..64], real_world_catalog().as_slice());
        let distinct: HashSet<_> = mixed.iter().collect();
        assert_eq!(distinct.len(), 200);
    }

    #[test]
    fn mixed_set_truncates_below_catalog_size() {
        let mut generator = MechanismGenerator::new(5);
        assert_eq!(generator.mixed_with_real_world(10).len(), 10);
    }

    #[test]
    fn catalog_is_off_grid() {
        let grid: HashSet<_> = MechanismGenerator::new(7).all_mechanisms().into_iter().collect();
        assert_eq!(grid.len(), total_possible());
        assert!(real_world_catalog().iter().all(|m| !grid.contains(m)));
    }

    #[test]
    fn systematic_sample_below_total_is_random_unique() {
        let mut generator = MechanismGenerator::new(6);
        let sample = generator.systematic_sample(25);
        assert_eq!(sample.len(), 25);
    }
}
