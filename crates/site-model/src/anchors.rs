//! Anchor (point-of-interest) types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnchorType {
    MallTenant,
    StationShops,
    Grocer,
    Retail,
}

impl AnchorType {
    pub const ALL: [AnchorType; 4] = [
        AnchorType::MallTenant,
        AnchorType::StationShops,
        AnchorType::Grocer,
        AnchorType::Retail,
    ];

    /// Single-linkage cluster merge radius, in meters.
    pub fn merge_radius_m(&self) -> f64 {
        match self {
            AnchorType::MallTenant => 120.0,
            AnchorType::StationShops => 100.0,
            AnchorType::Grocer => 60.0,
            AnchorType::Retail => 60.0,
        }
    }

    /// Refined-tier diminishing-score type multiplier.
    pub fn refined_multiplier(&self) -> f64 {
        match self {
            AnchorType::MallTenant => 1.2,
            AnchorType::StationShops => 1.3,
            AnchorType::Grocer => 1.0,
            AnchorType::Retail => 0.8,
        }
    }
}

/// A point-of-interest anchor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnchorPoint {
    pub id: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(rename = "type")]
    pub anchor_type: AnchorType,
}

/// Per-candidate anchor bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnchorStats {
    /// Unclustered count within radius.
    pub raw: usize,
    /// Count of cluster representatives after type-scoped merging.
    pub deduplicated: usize,
    /// Diminishing-returns score across all representatives.
    pub diminishing_score: f64,
    /// Representative count per anchor type.
    pub breakdown_by_type: HashMap<AnchorType, usize>,
}

impl AnchorStats {
    pub fn empty() -> Self {
        Self {
            raw: 0,
            deduplicated: 0,
            diminishing_score: 0.0,
            breakdown_by_type: HashMap::new(),
        }
    }
}
