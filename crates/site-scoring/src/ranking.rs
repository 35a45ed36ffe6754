//! Descending rank-by-final-score with lexicographic id tie-break, and
//! distribution statistics over a batch of final scores.

use site_model::{Candidate, ScoreDistribution};

/// Sorts candidates descending by `scores.final_score`; ties broken by `id`
/// ascending, so repeated runs over the same input are bit-for-bit stable.
pub fn rank_candidates(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| {
        b.scores
            .final_score
            .partial_cmp(&a.scores.final_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Mean, median, population standard deviation, min, and max of `final`
/// across a batch. Returns all-zero on an empty batch.
pub fn score_distribution(final_scores: &[f64]) -> ScoreDistribution {
    if final_scores.is_empty() {
        return ScoreDistribution::default();
    }
    let n = final_scores.len() as f64;
    let mean = final_scores.iter().sum::<f64>() / n;
    let variance = final_scores.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    let mut sorted = final_scores.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let median = if sorted.len() % 2 == 0 {
        let mid = sorted.len() / 2;
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[sorted.len() / 2]
    };

    ScoreDistribution {
        mean,
        median,
        std_dev,
        min: sorted[0],
        max: sorted[sorted.len() - 1],
    }
}
