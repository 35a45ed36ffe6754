//! StabilityService: weight-jitter resampling to measure how much the
//! portfolio and rankings move under small perturbations.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use site_model::{Candidate, CountryConfig, ExistingStore, Weights, WeightMultipliers};
use site_pipeline::portfolio::build_portfolio;
use site_scoring::score_candidates;
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub const DEFAULT_ITERATIONS: usize = 50;
const JITTER_RANGE: f64 = 0.1;
const HIGH_CONFIDENCE_RATE: f64 = 0.8;
const MEDIUM_CONFIDENCE_RATE: f64 = 0.5;
const LOW_CONFIDENCE_REVIEW_FRACTION: f64 = 0.3;

#[derive(Debug, Clone, Copy)]
pub struct StabilityConfig {
    pub iterations: usize,
    pub target_k: usize,
    pub min_spacing_m: f64,
    pub min_completeness: f64,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self { iterations: DEFAULT_ITERATIONS, target_k: 10, min_spacing_m: 500.0, min_completeness: 0.5 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StabilityConfidence {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteStability {
    pub candidate_id: String,
    pub selection_rate: f64,
    pub avg_rank_change: f64,
    pub max_rank_change: i64,
    pub confidence: StabilityConfidence,
    /// Top-2 sub-scores by `subscore * weight` contribution to `final_score`.
    pub sensitivity: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StabilityReport {
    pub sites: Vec<SiteStability>,
    pub overall_stability: f64,
    pub stable_count: usize,
    pub recommendations: Vec<String>,
}

fn seed_rng(seed: &str) -> ChaCha8Rng {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    ChaCha8Rng::seed_from_u64(hasher.finish())
}

fn jittered_weights(base: &Weights, rng: &mut ChaCha8Rng) -> Weights {
    let sample = |rng: &mut ChaCha8Rng| 1.0 + rng.gen_range(-JITTER_RANGE..=JITTER_RANGE);
    let multipliers = WeightMultipliers {
        population: sample(rng).max(0.0),
        gap: sample(rng).max(0.0),
        anchor: sample(rng).max(0.0),
        performance: sample(rng).max(0.0),
        saturation: sample(rng).max(0.0),
    };
    base.scaled(multipliers).normalized()
}

fn sensitivity_labels(candidate: &Candidate, weights: &Weights) -> Vec<String> {
    let mut contributions = vec![
        ("population", candidate.scores.population * weights.population),
        ("gap", candidate.scores.gap * weights.gap),
        ("anchor", candidate.scores.anchor * weights.anchor),
        ("performance", candidate.scores.performance * weights.performance),
    ];
    contributions.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    contributions.into_iter().take(2).map(|(name, _)| name.to_string()).collect()
}

/// Runs `config.iterations` jittered rescoring passes and reports, per
/// candidate, how often it was selected and how much its rank moved.
pub fn run_stability_analysis(
    candidates: &[Candidate],
    base_weights: &Weights,
    config: StabilityConfig,
    seed: &str,
    stores: &[ExistingStore],
    country: &CountryConfig,
) -> StabilityReport {
    let mut rng = seed_rng(seed);

    let mut baseline = candidates.to_vec();
    score_candidates(&mut baseline, base_weights);
    let baseline_rank: HashMap<&str, usize> = baseline.iter().enumerate().map(|(i, c)| (c.id.as_str(), i)).collect();

    let mut selection_counts: HashMap<String, usize> = HashMap::new();
    let mut rank_changes: HashMap<String, Vec<i64>> = HashMap::new();

    for _ in 0..config.iterations.max(1) {
        let weights = jittered_weights(base_weights, &mut rng);
        let mut rescored = candidates.to_vec();
        score_candidates(&mut rescored, &weights);

        let portfolio = build_portfolio(&rescored, config.target_k, config.min_spacing_m, config.min_completeness, stores, country);

        for (rank, candidate) in rescored.iter().enumerate() {
            if let Some(&base_rank) = baseline_rank.get(candidate.id.as_str()) {
                let delta = rank as i64 - base_rank as i64;
                rank_changes.entry(candidate.id.clone()).or_default().push(delta);
            }
        }
        for candidate in &portfolio {
            if candidate.status == site_model::CandidateStatus::Selected {
                *selection_counts.entry(candidate.id.clone()).or_insert(0) += 1;
            }
        }
    }

    let iterations = config.iterations.max(1) as f64;
    let mut sites = Vec::with_capacity(baseline.len());
    for candidate in &baseline {
        let selection_rate = *selection_counts.get(&candidate.id).unwrap_or(&0) as f64 / iterations;
        let deltas = rank_changes.get(&candidate.id).cloned().unwrap_or_default();
        let avg_rank_change = if deltas.is_empty() { 0.0 } else { deltas.iter().map(|d| d.unsigned_abs()).sum::<u64>() as f64 / deltas.len() as f64 };
        let max_rank_change = deltas.iter().map(|d| d.abs()).max().unwrap_or(0);

        let confidence = if selection_rate >= HIGH_CONFIDENCE_RATE {
            StabilityConfidence::High
        } else if selection_rate >= MEDIUM_CONFIDENCE_RATE {
            StabilityConfidence::Medium
        } else {
            StabilityConfidence::Low
        };

        sites.push(SiteStability {
            candidate_id: candidate.id.clone(),
            selection_rate,
            avg_rank_change,
            max_rank_change,
            confidence,
            sensitivity: sensitivity_labels(candidate, base_weights),
        });
    }

    let overall_stability = if sites.is_empty() { 0.0 } else { sites.iter().map(|s| s.selection_rate).sum::<f64>() / sites.len() as f64 };
    let stable_count = sites.iter().filter(|s| s.confidence == StabilityConfidence::High).count();

    let mut recommendations = Vec::new();
    let low_confidence_count = sites.iter().filter(|s| s.confidence == StabilityConfidence::Low).count();
    if !sites.is_empty() && low_confidence_count as f64 / sites.len() as f64 > LOW_CONFIDENCE_REVIEW_FRACTION {
        recommendations.push("review data quality".to_string());
    }

    StabilityReport { sites, overall_stability, stable_count, recommendations }
}

#[cfg(test)]
mod tests {
    use super::*;
    use site_model::{LatLng, Polygon};

    fn plain_country() -> CountryConfig {
        CountryConfig { country_code: "XX".into(), boundary: Polygon::default(), regions: vec![], major_metropolitan_areas: vec![], max_region_share: 0.4 }
    }

    fn candidate(id: &str, population: u64) -> Candidate {
        let mut c = Candidate::new(id, LatLng::new(0.0, 0.0), "res8:0:0", "r1");
        c.features.population = population;
        c.quality.completeness = 1.0;
        c
    }

    #[test]
    fn deterministic_for_the_same_seed() {
        let candidates = vec![candidate("a", 80_000), candidate("b", 40_000), candidate("c", 10_000)];
        let weights = Weights::default();
        let config = StabilityConfig { iterations: 10, target_k: 2, min_spacing_m: 500.0, min_completeness: 0.0 };
        let country = plain_country();

        let first = run_stability_analysis(&candidates, &weights, config, "seed1", &[], &country);
        let second = run_stability_analysis(&candidates, &weights, config, "seed1", &[], &country);

        for (a, b) in first.sites.iter().zip(second.sites.iter()) {
            assert_eq!(a.candidate_id, b.candidate_id);
            assert!((a.selection_rate - b.selection_rate).abs() < 1e-12);
        }
    }

    #[test]
    fn different_seeds_can_diverge() {
        let candidates = vec![candidate("a", 80_000), candidate("b", 79_000), candidate("c", 78_000), candidate("d", 77_000)];
        let weights = Weights::default();
        let config = StabilityConfig { iterations: 20, target_k: 2, min_spacing_m: 500.0, min_completeness: 0.0 };
        let country = plain_country();

        let a = run_stability_analysis(&candidates, &weights, config, "seed-a", &[], &country);
        assert_eq!(a.sites.len(), candidates.len());
        assert!(a.overall_stability >= 0.0 && a.overall_stability <= 1.0);
    }
}
