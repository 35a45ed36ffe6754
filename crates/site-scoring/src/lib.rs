//! ScoringService: feature-to-subscore mapping, data-quality weight
//! adjustment, per-run normalization, ranking, and distribution statistics.

pub mod normalization;
pub mod ranking;
pub mod sub_scores;
pub mod weight_adjustment;

pub use normalization::normalize_sub_scores;
pub use ranking::{rank_candidates, score_distribution};
pub use sub_scores::{
    anchor_score, compute_sub_scores, final_score, gap_score, performance_score, population_score,
    saturation_penalty,
};
pub use weight_adjustment::adjust_for_data_quality;

use site_model::{Candidate, Weights};

/// Scores every candidate in place: per-candidate sub-scores from features,
/// data-quality weight adjustment, final-score formula, then a batch-wide
/// normalization pass and a descending rank. This is the full ScoringService
/// contract applied to one shortlist or refinement-window batch; callers
/// that score across windows must run it once per complete batch, not once
/// per window, so the normalization range spans the whole set.
pub fn score_candidates(candidates: &mut [Candidate], base_weights: &Weights) {
    for candidate in candidates.iter_mut() {
        candidate.scores = compute_sub_scores(&candidate.features);
        let adjusted_weights = adjust_for_data_quality(base_weights, candidate.quality.estimated);
        candidate.scores.final_score = final_score(&candidate.scores, &adjusted_weights);
    }

    let mut scores: Vec<site_model::SubScores> = candidates.iter().map(|c| c.scores).collect();
    normalize_sub_scores(&mut scores);
    for (candidate, scores) in candidates.iter_mut().zip(scores) {
        candidate.scores = scores;
    }

    rank_candidates(candidates);
}

#[cfg(test)]
mod tests {
    use super::*;
    use site_model::{Candidate, Features, LatLng};

    #[test]
    fn score_candidates_ranks_and_normalizes() {
        let mut candidates = vec![
            {
                let mut c = Candidate::new("low", LatLng::new(0.0, 0.0), "res8:0:0", "r1");
                c.features = Features { population: 1_000, nearest_brand_km: 0.5, competitor_density: 0.2, ..Features::empty() };
                c
            },
            {
                let mut c = Candidate::new("high", LatLng::new(0.0, 0.0), "res8:0:1", "r1");
                c.features = Features { population: 100_000, nearest_brand_km: 10.0, competitor_density: 0.0, ..Features::empty() };
                c
            },
        ];
        score_candidates(&mut candidates, &Weights::default());
        assert_eq!(candidates[0].id, "high");
        assert!((candidates[0].scores.final_score - 1.0).abs() < 1e-9);
        assert!((candidates[1].scores.final_score - 0.0).abs() < 1e-9);
    }
}
