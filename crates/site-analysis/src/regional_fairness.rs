//! RegionalFairnessService: measures whether selected sites track each
//! region's population share, and can top up under-represented regions.

use serde::{Deserialize, Serialize};
use site_model::{Candidate, CandidateStatus, CountryConfig};
use std::collections::HashMap;

/// Deviation band: a region is `balanced` when its `fairnessRatio` sits
/// within `1 +/- DEFAULT_THETA`.
pub const DEFAULT_THETA: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FairnessStatus {
    Under,
    Balanced,
    Over,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionFairness {
    pub region_id: String,
    pub population_share: f64,
    pub site_share: f64,
    pub fairness_ratio: f64,
    pub status: FairnessStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FairnessReport {
    pub regions: Vec<RegionFairness>,
    pub overall_fairness: f64,
}

fn status_for(ratio: f64, theta: f64) -> FairnessStatus {
    if ratio < 1.0 - theta {
        FairnessStatus::Under
    } else if ratio > 1.0 + theta {
        FairnessStatus::Over
    } else {
        FairnessStatus::Balanced
    }
}

/// Computes per-region population share vs. selected-site share, and an
/// overall fairness score in `[0, 1]` (1 = perfectly proportional).
pub fn regional_fairness(selected: &[Candidate], country: &CountryConfig, theta: f64) -> FairnessReport {
    let total_population = country.total_population().max(1) as f64;
    let total_sites = selected.len().max(1) as f64;

    let mut site_counts: HashMap<&str, usize> = HashMap::new();
    for candidate in selected {
        *site_counts.entry(candidate.region_id.as_str()).or_insert(0) += 1;
    }

    let mut regions = Vec::with_capacity(country.regions.len());
    for region in &country.regions {
        let population_share = region.population as f64 / total_population;
        let site_share = *site_counts.get(region.id.as_str()).unwrap_or(&0) as f64 / total_sites;
        let fairness_ratio = if population_share > 0.0 { site_share / population_share } else { 0.0 };
        regions.push(RegionFairness {
            region_id: region.id.clone(),
            population_share,
            site_share,
            fairness_ratio,
            status: status_for(fairness_ratio, theta),
        });
    }

    let deviation_sum: f64 = regions.iter().map(|r| (r.site_share - r.population_share).abs()).sum();
    let region_count = regions.len().max(1) as f64;
    let overall_fairness = (1.0 - deviation_sum / (0.5 * region_count)).clamp(0.0, 1.0);

    FairnessReport { regions, overall_fairness }
}

/// Re-ranks a candidate pool to favor under-represented regions first: for
/// each region flagged `Under`, the best-scoring unselected candidate in
/// that region is promoted ahead of the rest, until `target_k` is reached
/// by the best remaining score order.
pub fn fairness_adjusted_recommendations(
    candidates: &[Candidate],
    country: &CountryConfig,
    target_k: usize,
    theta: f64,
) -> Vec<Candidate> {
    if candidates.is_empty() || target_k == 0 {
        return Vec::new();
    }

    let selected_now: Vec<Candidate> = candidates.iter().filter(|c| c.status == CandidateStatus::Selected).cloned().collect();
    let report = regional_fairness(&selected_now, country, theta);
    let under_regions: Vec<&str> = report
        .regions
        .iter()
        .filter(|r| r.status == FairnessStatus::Under)
        .map(|r| r.region_id.as_str())
        .collect();

    let mut ranked: Vec<&Candidate> = candidates.iter().collect();
    ranked.sort_by(|a, b| b.scores.final_score.partial_cmp(&a.scores.final_score).unwrap_or(std::cmp::Ordering::Equal));

    let mut chosen: Vec<Candidate> = Vec::with_capacity(target_k);
    let mut chosen_ids = std::collections::HashSet::new();

    for region_id in &under_regions {
        if chosen.len() >= target_k {
            break;
        }
        if let Some(best) = ranked.iter().find(|c| c.region_id == *region_id && !chosen_ids.contains(c.id.as_str())) {
            chosen_ids.insert(best.id.as_str());
            chosen.push((*best).clone());
        }
    }

    for candidate in &ranked {
        if chosen.len() >= target_k {
            break;
        }
        if !chosen_ids.contains(candidate.id.as_str()) {
            chosen_ids.insert(candidate.id.as_str());
            chosen.push((*candidate).clone());
        }
    }

    chosen
}
