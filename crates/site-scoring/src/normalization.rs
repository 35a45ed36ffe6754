//! Per-run linear normalization of sub-scores and final score.

use site_model::SubScores;

/// Rescales one field to \[0,1\] across the whole slice in place. If the
/// range is zero (all candidates tied, or a single candidate), every value
/// becomes 0.5 rather than dividing by zero.
fn normalize_field(values: &mut [f64]) {
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if range <= 1e-12 {
        for v in values.iter_mut() {
            *v = 0.5;
        }
        return;
    }
    for v in values.iter_mut() {
        *v = (*v - min) / range;
    }
}

/// Normalizes `population`, `gap`, `anchor`, `performance`, `saturation_penalty`,
/// and `final_score` independently, each linearly rescaled to \[0,1\] across
/// the whole batch. Operates in place.
pub fn normalize_sub_scores(scores: &mut [SubScores]) {
    if scores.is_empty() {
        return;
    }
    let mut population: Vec<f64> = scores.iter().map(|s| s.population).collect();
    let mut gap: Vec<f64> = scores.iter().map(|s| s.gap).collect();
    let mut anchor: Vec<f64> = scores.iter().map(|s| s.anchor).collect();
    let mut performance: Vec<f64> = scores.iter().map(|s| s.performance).collect();
    let mut saturation: Vec<f64> = scores.iter().map(|s| s.saturation_penalty).collect();
    let mut final_scores: Vec<f64> = scores.iter().map(|s| s.final_score).collect();

    normalize_field(&mut population);
    normalize_field(&mut gap);
    normalize_field(&mut anchor);
    normalize_field(&mut performance);
    normalize_field(&mut saturation);
    normalize_field(&mut final_scores);

    for (i, s) in scores.iter_mut().enumerate() {
        s.population = population[i];
        s.gap = gap[i];
        s.anchor = anchor[i];
        s.performance = performance[i];
        s.saturation_penalty = saturation[i];
        s.final_score = final_scores[i];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub(final_score: f64) -> SubScores {
        SubScores { population: final_score, gap: final_score, anchor: final_score, performance: final_score, saturation_penalty: final_score, final_score }
    }

    #[test]
    fn rescales_to_full_zero_one_range() {
        let mut scores = vec![sub(0.2), sub(0.5), sub(0.8)];
        normalize_sub_scores(&mut scores);
        assert!((scores[0].final_score - 0.0).abs() < 1e-9);
        assert!((scores[2].final_score - 1.0).abs() < 1e-9);
        assert!((scores[1].final_score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn zero_range_becomes_one_half() {
        let mut scores = vec![sub(0.4), sub(0.4)];
        normalize_sub_scores(&mut scores);
        assert_eq!(scores[0].final_score, 0.5);
        assert_eq!(scores[1].final_score, 0.5);
    }

    #[test]
    fn empty_slice_is_a_noop() {
        let mut scores: Vec<SubScores> = vec![];
        normalize_sub_scores(&mut scores);
        assert!(scores.is_empty());
    }
}
