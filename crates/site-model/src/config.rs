//! Request/response envelope types.

use crate::anchors::AnchorType;
use crate::candidate::Candidate;
use crate::country::CountryConfig;
use crate::inputs::{CompetitorLocation, ExistingStore, PopulationCell};
use crate::weights::Weights;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioMode {
    Defend,
    Balanced,
    Blitz,
}

impl Default for ScenarioMode {
    fn default() -> Self {
        ScenarioMode::Balanced
    }
}

/// Prior-run weights and constraint knobs a new run may not drift too far
/// from. `None` (the default) disables drift checking entirely; only the
/// absolute bounds apply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyBaseline {
    pub weights: Weights,
    pub min_spacing_m: f64,
    pub target_k: usize,
    pub max_region_share: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub target_k: usize,
    pub min_spacing_m: f64,
    pub grid_resolution: u8,
    pub weights: Weights,
    pub enable_ai: bool,
    pub mode: Option<ScenarioMode>,
    #[serde(default = "default_min_completeness")]
    pub min_completeness: f64,
    #[serde(default)]
    pub baseline: Option<PolicyBaseline>,
}

fn default_min_completeness() -> f64 {
    crate::quality::DEFAULT_MIN_COMPLETENESS
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            target_k: 10,
            min_spacing_m: 500.0,
            grid_resolution: 8,
            weights: Weights::default(),
            enable_ai: false,
            mode: None,
            min_completeness: default_min_completeness(),
            baseline: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub country: CountryConfig,
    pub existing_stores: Vec<ExistingStore>,
    pub competitors: Vec<CompetitorLocation>,
    pub population_cells: Vec<PopulationCell>,
    pub anchors: Vec<crate::anchors::AnchorPoint>,
    pub config: GenerationConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub selected_count: usize,
    pub rejected_count: usize,
    pub region_distribution: HashMap<String, usize>,
    pub acceptance_rate: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreDistribution {
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnchorDedupReport {
    pub total_raw: usize,
    pub total_deduplicated: usize,
    pub by_type: HashMap<AnchorType, usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    pub weights_used: Weights,
    pub anchor_dedup_report: AnchorDedupReport,
    /// Human-readable record of any guardrail clamp applied to the
    /// request's weights or constraints before this run.
    #[serde(default)]
    pub guardrail_violations: Vec<String>,
    pub rejection_breakdown: HashMap<String, usize>,
    pub scoring_distribution: ScoreDistribution,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reproducibility {
    pub seed: String,
    pub data_versions: HashMap<String, String>,
    pub scenario_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    pub sites: Vec<Candidate>,
    pub portfolio: PortfolioSummary,
    pub diagnostics: Diagnostics,
    pub reproducibility: Reproducibility,
    pub degraded: bool,
}
