//! Per-candidate feature bundle and sub-score bundle.

use crate::anchors::AnchorStats;
use serde::{Deserialize, Serialize};

/// Raw features computed by `FeatureService` for one candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Features {
    /// People in the catchment (basic: 2km disk, refined: 5km or isochrone).
    pub population: u64,
    /// Great-circle km to the nearest existing brand location, or `+inf`.
    pub nearest_brand_km: f64,
    /// Competitors per km² in a 2km disk (basic) or 5km (refined).
    pub competitor_density: f64,
    pub anchors: AnchorStats,
    /// In \[0,1\].
    pub performance_proxy: f64,
}

impl Features {
    pub fn empty() -> Self {
        Self {
            population: 0,
            nearest_brand_km: f64::INFINITY,
            competitor_density: 0.0,
            anchors: AnchorStats::empty(),
            performance_proxy: 0.0,
        }
    }
}

/// Sub-scores, each in \[0,1\].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SubScores {
    pub population: f64,
    pub gap: f64,
    pub anchor: f64,
    pub performance: f64,
    pub saturation_penalty: f64,
    pub final_score: f64,
}
