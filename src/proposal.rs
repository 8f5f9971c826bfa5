// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Governance Break-Test Suite ("The Arena") - Proposal Source

use rand::Rng;

use crate::types::Proposal;

/// Share of proposals drawn from the contested band around 0.5.
const BOUNDARY_SHARE: f64 = 0.3;
const BOUNDARY_BAND: (f64, f64) = (0.4, 0.6);

/// Synthetic proposal stream with a monotonic id counter.
#[derive(Debug, Clone, Default)]
pub struct ProposalSource {
    counter: u64,
}

impl ProposalSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next proposal. 30% land near the decision boundary, the rest are
    /// uniform over [0, 1).
    pub fn next_proposal<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Proposal {
        self.counter += 1;
        let quality = if rng.gen::<f64>() < BOUNDARY_SHARE {
            rng.gen_range(BOUNDARY_BAND.0..BOUNDARY_BAND.1)
        } else {
            rng.gen::<f64>()
        };
        Proposal::new(self.counter, quality)
    }

    pub fn issued(&self) -> u64 {
        self.counter
    }
}
