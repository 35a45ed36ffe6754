//! Data-quality bundle.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct EstimationFlags {
    pub population: bool,
    pub anchors: bool,
    pub travel_time: bool,
}

impl EstimationFlags {
    pub fn count(&self) -> u32 {
        self.population as u32 + self.anchors as u32 + self.travel_time as u32
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DataQuality {
    /// In \[0,1\].
    pub completeness: f64,
    /// In \[0,1\].
    pub confidence: f64,
    pub estimated: EstimationFlags,
}

impl Default for DataQuality {
    fn default() -> Self {
        Self {
            completeness: 1.0,
            confidence: 1.0,
            estimated: EstimationFlags::default(),
        }
    }
}

impl DataQuality {
    /// Derives completeness/confidence from which features fell back to an
    /// estimate. Each estimated flag costs 0.2 completeness and 0.15
    /// confidence, floored at 0; a candidate with no estimated features
    /// keeps the default (1.0, 1.0).
    pub fn estimated_from(estimated: EstimationFlags) -> Self {
        let count = estimated.count() as f64;
        Self {
            completeness: (1.0 - 0.2 * count).max(0.0),
            confidence: (1.0 - 0.15 * count).max(0.0),
            estimated,
        }
    }
}

/// Default minimum completeness accepted by `ConstraintService`.
pub const DEFAULT_MIN_COMPLETENESS: f64 = 0.5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_estimated_flags_keeps_full_quality() {
        let q = DataQuality::estimated_from(EstimationFlags::default());
        assert_eq!(q.completeness, 1.0);
        assert_eq!(q.confidence, 1.0);
    }

    #[test]
    fn each_estimated_flag_reduces_quality() {
        let q = DataQuality::estimated_from(EstimationFlags { population: true, anchors: true, travel_time: true });
        assert!((q.completeness - 0.4).abs() < 1e-9);
        assert!((q.confidence - 0.55).abs() < 1e-9);
    }
}
