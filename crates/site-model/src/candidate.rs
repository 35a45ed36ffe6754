//! The core `Candidate` record, threaded through every stage.

use crate::features::{Features, SubScores};
use crate::geo::LatLng;
use crate::quality::DataQuality;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CandidateStatus {
    Pending,
    Selected,
    Rejected,
    Hold,
}

/// Structured rejection/violation reasons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ViolationReason {
    SpacingViolation { distance_km: f64, min_required_km: f64 },
    RegionalShareExceeded { region_id: String, count: usize, cap: usize },
    LowCompleteness { completeness: f64, min_required: f64 },
    SaturationPenalty { penalty: f64 },
    Capacity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstraintViolation {
    pub reason: ViolationReason,
    pub remediation: String,
}

/// A candidate site, a hex-cell center with an administrative-region id, a
/// feature bundle, a score bundle, a data-quality bundle, and lifecycle
/// status. `id` is stable across recomputations within a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub location: LatLng,
    pub hex_index: String,
    pub region_id: String,
    pub features: Features,
    pub scores: SubScores,
    pub quality: DataQuality,
    pub status: CandidateStatus,
    pub violations: Vec<ConstraintViolation>,
}

impl Candidate {
    pub fn new(id: impl Into<String>, location: LatLng, hex_index: impl Into<String>, region_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            location,
            hex_index: hex_index.into(),
            region_id: region_id.into(),
            features: Features::empty(),
            scores: SubScores::default(),
            quality: DataQuality::default(),
            status: CandidateStatus::Pending,
            violations: Vec::new(),
        }
    }
}
