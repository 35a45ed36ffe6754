//! Scoring weights and data-quality adjustment.

use serde::{Deserialize, Serialize};

/// Sub-score weights. Must sum to 1 within `WEIGHT_SUM_TOLERANCE` at request
/// boundaries and are re-normalized internally after any adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub population: f64,
    pub gap: f64,
    pub anchor: f64,
    pub performance: f64,
    pub saturation: f64,
}

/// Tolerance for the "sum to 1" request-boundary check.
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

/// Tolerance for the internal re-normalization invariant check.
pub const WEIGHT_SUM_EPSILON: f64 = 1e-6;

impl Default for Weights {
    fn default() -> Self {
        Self {
            population: 0.25,
            gap: 0.35,
            anchor: 0.20,
            performance: 0.20,
            saturation: 0.15,
        }
    }
}

impl Weights {
    pub fn sum(&self) -> f64 {
        self.population + self.gap + self.anchor + self.performance + self.saturation
    }

    pub fn sums_to_one(&self, tolerance: f64) -> bool {
        (self.sum() - 1.0).abs() <= tolerance
    }

    /// Re-normalize so the four non-saturation weights plus saturation sum
    /// to 1. `saturation` participates in the formula's penalty term, not
    /// the additive sub-score blend, but it is still part of the weight
    /// vector that must sum to 1 per the data model invariant.
    pub fn normalized(&self) -> Self {
        let total = self.sum();
        if total <= 0.0 {
            return *self;
        }
        Self {
            population: self.population / total,
            gap: self.gap / total,
            anchor: self.anchor / total,
            performance: self.performance / total,
            saturation: self.saturation / total,
        }
    }

    pub fn scaled(&self, m: WeightMultipliers) -> Self {
        Self {
            population: self.population * m.population,
            gap: self.gap * m.gap,
            anchor: self.anchor * m.anchor,
            performance: self.performance * m.performance,
            saturation: self.saturation * m.saturation,
        }
    }
}

/// Per-weight multiplier, used by `ScenarioService` scenario profiles and
/// `StabilityService` jitter sampling.
#[derive(Debug, Clone, Copy)]
pub struct WeightMultipliers {
    pub population: f64,
    pub gap: f64,
    pub anchor: f64,
    pub performance: f64,
    pub saturation: f64,
}

impl WeightMultipliers {
    pub const IDENTITY: Self = Self {
        population: 1.0,
        gap: 1.0,
        anchor: 1.0,
        performance: 1.0,
        saturation: 1.0,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_sum_to_one() {
        assert!(Weights::default().sums_to_one(WEIGHT_SUM_EPSILON * 10.0));
    }

    #[test]
    fn normalize_rescales_to_one() {
        let w = Weights {
            population: 1.0,
            gap: 1.0,
            anchor: 1.0,
            performance: 1.0,
            saturation: 1.0,
        };
        let n = w.normalized();
        assert!((n.sum() - 1.0).abs() < WEIGHT_SUM_EPSILON);
        assert!((n.population - 0.2).abs() < 1e-12);
    }

    #[test]
    fn identity_multiplier_is_a_noop() {
        let w = Weights::default();
        let scaled = w.scaled(WeightMultipliers::IDENTITY);
        assert_eq!(w, scaled);
    }
}
