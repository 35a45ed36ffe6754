//! CounterfactualService: "what would it take" threshold derivation for a
//! single candidate, via a local linear inversion of the scoring formula.

use serde::{Deserialize, Serialize};
use site_model::Candidate;
use site_scoring::population_score;

/// Population percentage increase above which the required feature change
/// is judged unlikely to be achievable organically.
const HIGH_POPULATION_INCREASE_FRACTION: f64 = 0.30;
const MEDIUM_POPULATION_INCREASE_FRACTION: f64 = 0.10;
const HIGH_DISTANCE_INCREASE_KM: f64 = 5.0;
const MEDIUM_DISTANCE_INCREASE_KM: f64 = 2.0;
const HIGH_ADDITIONAL_ANCHORS: u32 = 5;
const MEDIUM_ADDITIONAL_ANCHORS: u32 = 2;
const HIGH_DENSITY_REDUCTION_FRACTION: f64 = 0.5;
const MEDIUM_DENSITY_REDUCTION_FRACTION: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetRank {
    NextRank,
    Top10,
    Top5,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Increase,
    Decrease,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Likelihood {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Threshold {
    pub feature: String,
    pub display_name: String,
    pub unit: String,
    pub current_value: f64,
    pub required_value: f64,
    pub direction: Direction,
    pub impact: String,
    pub likelihood: Likelihood,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CounterfactualReport {
    pub candidate_id: String,
    pub current_rank: usize,
    pub target_rank: usize,
    pub thresholds: Vec<Threshold>,
    pub easiest_path: Option<Threshold>,
    /// Up to 2 thresholds surfaced for product UI.
    pub primary_thresholds: Vec<Threshold>,
}

fn resolve_target_rank(current_rank: usize, target: TargetRank, population: usize) -> usize {
    match target {
        TargetRank::NextRank => current_rank.saturating_sub(1),
        TargetRank::Top10 => 9.min(population.saturating_sub(1)),
        TargetRank::Top5 => 4.min(population.saturating_sub(1)),
    }
}

/// Derives the set of feature thresholds that would move `candidate` from
/// its current rank to `target` within `ranked` (descending by
/// `final_score`, as produced by `rank_candidates`).
pub fn counterfactual_thresholds(
    ranked: &[Candidate],
    candidate_id: &str,
    target: TargetRank,
    weights: &site_model::Weights,
) -> Option<CounterfactualReport> {
    let current_rank = ranked.iter().position(|c| c.id == candidate_id)?;
    let candidate = &ranked[current_rank];

    let target_rank = resolve_target_rank(current_rank, target, ranked.len());
    let target_score = ranked.get(target_rank).map(|c| c.scores.final_score).unwrap_or(candidate.scores.final_score);

    let current_score = candidate.scores.final_score;
    let score_gap = (target_score - current_score).max(0.0);

    let mut thresholds = Vec::new();
    if score_gap > 0.0 {
        thresholds.push(population_threshold(candidate, score_gap, weights.population));
        thresholds.push(brand_distance_threshold(candidate, score_gap, weights.gap));
        thresholds.push(anchor_threshold(candidate, score_gap, weights.anchor));
        thresholds.push(competitor_density_threshold(candidate, score_gap, weights.saturation));
    }

    thresholds.sort_by_key(|t| likelihood_rank(t.likelihood));

    let easiest_path = thresholds
        .iter()
        .find(|t| t.likelihood != Likelihood::Low)
        .or_else(|| thresholds.first())
        .cloned();

    let primary_thresholds = thresholds.iter().take(2).cloned().collect();

    Some(CounterfactualReport {
        candidate_id: candidate_id.to_string(),
        current_rank,
        target_rank,
        thresholds,
        easiest_path,
        primary_thresholds,
    })
}

fn likelihood_rank(l: Likelihood) -> u8 {
    match l {
        Likelihood::High => 0,
        Likelihood::Medium => 1,
        Likelihood::Low => 2,
    }
}

fn population_threshold(candidate: &Candidate, score_gap: f64, w_population: f64) -> Threshold {
    let current_pop = candidate.features.population;
    let current_pop_score = population_score(current_pop).max(1e-9);
    let required_pop_score = current_pop_score + score_gap / w_population.max(1e-9);
    let required_pop = (current_pop as f64 * (required_pop_score / current_pop_score)).max(current_pop as f64);

    let increase_fraction = if current_pop > 0 { (required_pop - current_pop as f64) / current_pop as f64 } else { f64::INFINITY };
    let likelihood = if increase_fraction <= MEDIUM_POPULATION_INCREASE_FRACTION {
        Likelihood::High
    } else if increase_fraction <= HIGH_POPULATION_INCREASE_FRACTION {
        Likelihood::Medium
    } else {
        Likelihood::Low
    };

    Threshold {
        feature: "population".to_string(),
        display_name: "Catchment population".to_string(),
        unit: "people".to_string(),
        current_value: current_pop as f64,
        required_value: required_pop,
        direction: Direction::Increase,
        impact: format!("catchment population would need to reach approximately {required_pop:.0}"),
        likelihood,
    }
}

fn brand_distance_threshold(candidate: &Candidate, score_gap: f64, w_gap: f64) -> Threshold {
    let current_km = if candidate.features.nearest_brand_km.is_finite() { candidate.features.nearest_brand_km } else { 20.0 };
    let required_km = current_km + (score_gap / w_gap.max(1e-9)) / 0.05;
    let increase_km = required_km - current_km;

    let likelihood = if increase_km <= MEDIUM_DISTANCE_INCREASE_KM {
        Likelihood::High
    } else if increase_km <= HIGH_DISTANCE_INCREASE_KM {
        Likelihood::Medium
    } else {
        Likelihood::Low
    };

    Threshold {
        feature: "nearest_brand_km".to_string(),
        display_name: "Distance to nearest existing store".to_string(),
        unit: "km".to_string(),
        current_value: current_km,
        required_value: required_km,
        direction: Direction::Increase,
        impact: format!("would need to be roughly {required_km:.1} km from the nearest existing store"),
        likelihood,
    }
}

fn anchor_threshold(candidate: &Candidate, score_gap: f64, w_anchor: f64) -> Threshold {
    let current = candidate.features.anchors.diminishing_score;
    let additional = (score_gap / w_anchor.max(1e-9) / 0.1).ceil().max(0.0);

    let likelihood = if additional <= MEDIUM_ADDITIONAL_ANCHORS as f64 {
        Likelihood::High
    } else if additional <= HIGH_ADDITIONAL_ANCHORS as f64 {
        Likelihood::Medium
    } else {
        Likelihood::Low
    };

    Threshold {
        feature: "anchors".to_string(),
        display_name: "Nearby anchor tenants".to_string(),
        unit: "anchors".to_string(),
        current_value: current,
        required_value: current + additional,
        direction: Direction::Increase,
        impact: format!("approximately {additional:.0} additional anchor tenant(s) nearby"),
        likelihood,
    }
}

fn competitor_density_threshold(candidate: &Candidate, score_gap: f64, w_saturation: f64) -> Threshold {
    let current_density = candidate.features.competitor_density;
    let reduction = (0.2 * score_gap / w_saturation.max(1e-9)).min(current_density).max(0.0);
    let required_density = (current_density - reduction).max(0.0);

    let reduction_fraction = if current_density > 0.0 { reduction / current_density } else { 0.0 };
    let likelihood = if reduction_fraction <= MEDIUM_DENSITY_REDUCTION_FRACTION {
        Likelihood::High
    } else if reduction_fraction <= HIGH_DENSITY_REDUCTION_FRACTION {
        Likelihood::Medium
    } else {
        Likelihood::Low
    };

    Threshold {
        feature: "competitor_density".to_string(),
        display_name: "Competitor density".to_string(),
        unit: "competitors/km^2".to_string(),
        current_value: current_density,
        required_value: required_density,
        direction: Direction::Decrease,
        impact: format!("competitor density would need to fall to roughly {required_density:.3} per km^2"),
        likelihood,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use site_model::{Features, LatLng, SubScores, Weights};

    fn candidate(id: &str, population: u64, final_score: f64) -> Candidate {
        let mut c = Candidate::new(id, LatLng::new(0.0, 0.0), "res8:0:0", "r1");
        c.features = Features { population, nearest_brand_km: 3.0, competitor_density: 0.05, ..Features::empty() };
        c.scores = SubScores { final_score, population: population_score(population), gap: 0.5, anchor: 0.3, performance: 0.4, saturation_penalty: 0.1 };
        c
    }

    #[test]
    fn no_gap_when_already_at_target_rank() {
        let ranked = vec![candidate("a", 90_000, 0.9), candidate("b", 10_000, 0.3)];
        let weights = Weights::default();
        let report = counterfactual_thresholds(&ranked, "a", TargetRank::NextRank, &weights).unwrap();
        assert!(report.thresholds.is_empty());
    }

    #[test]
    fn lower_ranked_candidate_gets_thresholds() {
        let ranked = vec![candidate("a", 90_000, 0.9), candidate("b", 10_000, 0.3)];
        let weights = Weights::default();
        let report = counterfactual_thresholds(&ranked, "b", TargetRank::NextRank, &weights).unwrap();
        assert_eq!(report.current_rank, 1);
        assert_eq!(report.target_rank, 0);
        assert_eq!(report.thresholds.len(), 4);
        assert!(report.easiest_path.is_some());
    }

    #[test]
    fn unknown_candidate_returns_none() {
        let ranked = vec![candidate("a", 90_000, 0.9)];
        let weights = Weights::default();
        assert!(counterfactual_thresholds(&ranked, "missing", TargetRank::Top5, &weights).is_none());
    }
}
