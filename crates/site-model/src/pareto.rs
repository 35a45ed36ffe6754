//! Pareto-frontier point.

use crate::candidate::Candidate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParetoPoint {
    pub k: usize,
    pub roi: f64,
    pub risk: f64,
    pub coverage: f64,
    pub portfolio: Vec<Candidate>,
    pub is_knee: bool,
    pub is_dominated: bool,
}

impl ParetoPoint {
    /// `self` is dominated by `other` iff `other` is at least as good on
    /// every objective and strictly better on at least one
    /// (roi desc, coverage desc, risk asc).
    pub fn dominated_by(&self, other: &ParetoPoint) -> bool {
        let ge_roi = other.roi >= self.roi;
        let ge_coverage = other.coverage >= self.coverage;
        let le_risk = other.risk <= self.risk;
        let strictly_better = other.roi > self.roi || other.coverage > self.coverage || other.risk < self.risk;
        ge_roi && ge_coverage && le_risk && strictly_better
    }
}
