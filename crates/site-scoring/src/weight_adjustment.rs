//! Data-quality weight adjustment.

use site_model::{EstimationFlags, Weights};

/// If `estimated.population`, halve `wP`; if `estimated.anchors`, halve `wA`;
/// if `estimated.travelTime`, cut `wPerf` by 20%. The removed mass is moved
/// to `wG` (the most reliable factor), then the whole vector is re-normalized
/// to sum to 1.
pub fn adjust_for_data_quality(weights: &Weights, estimated: EstimationFlags) -> Weights {
    let mut adjusted = *weights;
    let mut removed = 0.0;

    if estimated.population {
        let cut = adjusted.population * 0.5;
        adjusted.population -= cut;
        removed += cut;
    }
    if estimated.anchors {
        let cut = adjusted.anchor * 0.5;
        adjusted.anchor -= cut;
        removed += cut;
    }
    if estimated.travel_time {
        let cut = adjusted.performance * 0.2;
        adjusted.performance -= cut;
        removed += cut;
    }

    adjusted.gap += removed;
    adjusted.normalized()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_estimation_leaves_weights_unchanged_after_normalize() {
        let w = Weights::default();
        let adjusted = adjust_for_data_quality(&w, EstimationFlags::default());
        assert!((adjusted.sum() - 1.0).abs() < 1e-9);
        assert!((adjusted.population - w.population).abs() < 1e-9);
    }

    #[test]
    fn population_estimated_halves_wp_and_moves_mass_to_gap() {
        let w = Weights::default();
        let flags = EstimationFlags { population: true, anchors: false, travel_time: false };
        let adjusted = adjust_for_data_quality(&w, flags);
        assert!((adjusted.sum() - 1.0).abs() < 1e-9);
        // population's share of the (still-unnormalized) mass was halved,
        // so after renormalization it must be strictly less than before.
        assert!(adjusted.population < w.population);
        assert!(adjusted.gap > w.gap);
    }

    #[test]
    fn all_three_flags_compound() {
        let w = Weights::default();
        let flags = EstimationFlags { population: true, anchors: true, travel_time: true };
        let adjusted = adjust_for_data_quality(&w, flags);
        assert!((adjusted.sum() - 1.0).abs() < 1e-9);
        assert!(adjusted.population < w.population);
        assert!(adjusted.anchor < w.anchor);
        assert!(adjusted.performance < w.performance);
        assert!(adjusted.gap > w.gap);
    }
}
