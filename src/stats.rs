// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Governance Break-Test Suite ("The Arena") - Sample Statistics

use serde::{Deserialize, Serialize};

/// Mean, spread and 95% confidence interval of a set of Monte Carlo samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub mean: f64,
    pub std_dev: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub min: f64,
    pub max: f64,
    pub n: usize,
}

impl Default for Stats {
    fn default() -> Self {
        Self { mean: 0.0, std_dev: 0.0, ci_lower: 0.0, ci_upper: 0.0, min: 0.0, max: 0.0, n: 0 }
    }
}

impl Stats {
    pub fn from_samples(samples: &[f64]) -> Self {
        let n = samples.len();
        if n == 0 {
            return Self::default();
        }
        let mean = samples.iter().sum::<f64>() / n as f64;
        let variance = if n > 1 {
            samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };
        let std_dev = variance.sqrt();
        let stderr = std_dev / (n as f64).sqrt();
        let z = 1.96; // 95% CI
        Self {
            mean,
            std_dev,
            ci_lower: mean - z * stderr,
            ci_upper: mean + z * stderr,
            min: samples.iter().cloned().fold(f64::INFINITY, f64::min),
            max: samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            n,
        }
    }

    /// Half-width of the confidence interval.
    pub fn margin(&self) -> f64 {
        (self.ci_upper - self.ci_lower) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_samples_are_all_zero() {
        assert_eq!(Stats::from_samples(&[]), Stats::default());
    }

    #[test]
    fn single_sample_has_no_spread() {
        let s = Stats::from_samples(&[0.75]);
        assert_eq!(s.mean, 0.75);
        assert_eq!(s.std_dev, 0.0);
        assert_eq!(s.margin(), 0.0);
        assert_eq!((s.min, s.max, s.n), (0.75, 0.75, 1));
    }

    #[test]
    fn sample_std_dev_and_interval() {
        let s = Stats::from_samples(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((s.mean - 5.0).abs() < 1e-12);
        // Bessel-corrected: sum of squares 32 over 7
        assert!((s.std_dev - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
        assert!(s.ci_lower < s.mean && s.mean < s.ci_upper);
        assert_eq!((s.min, s.max), (2.0, 9.0));
    }
}
