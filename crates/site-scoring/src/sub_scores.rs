//! Feature-to-subscore mapping.

use site_model::{Features, SubScores, Weights};

/// `min(pop / 100_000, 1)`, 0 if `pop <= 0`.
pub fn population_score(population: u64) -> f64 {
    if population == 0 {
        return 0.0;
    }
    (population as f64 / 100_000.0).min(1.0)
}

/// Average of `min(nearestBrandKm/20, 1)` (1 if `+inf`) and
/// `max(0, 1 - 10*competitorDensity)`.
pub fn gap_score(nearest_brand_km: f64, competitor_density: f64) -> f64 {
    let distance_term = if nearest_brand_km.is_infinite() {
        1.0
    } else {
        (nearest_brand_km / 20.0).min(1.0)
    };
    let density_term = (1.0 - 10.0 * competitor_density).max(0.0);
    (distance_term + density_term) / 2.0
}

/// `min(diminishingScore/15, 1)`, 0 if score is 0.
pub fn anchor_score(diminishing_score: f64) -> f64 {
    if diminishing_score <= 0.0 {
        return 0.0;
    }
    (diminishing_score / 15.0).min(1.0)
}

/// `performanceProxy` clamped to \[0,1\].
pub fn performance_score(performance_proxy: f64) -> f64 {
    performance_proxy.clamp(0.0, 1.0)
}

/// `min(5*competitorDensity, 0.5) + (nearestBrandKm<1 ? 0.3 : 0)`, capped at 1.
pub fn saturation_penalty(competitor_density: f64, nearest_brand_km: f64) -> f64 {
    let density_term = (5.0 * competitor_density).min(0.5);
    let proximity_term = if nearest_brand_km < 1.0 { 0.3 } else { 0.0 };
    (density_term + proximity_term).min(1.0)
}

/// Computes all five sub-scores from raw features. `final_score` is left at
/// its zero default: callers must run the weight adjustment and final-score
/// formula separately, since that step needs the candidate's `DataQuality`
/// and the run's `Weights`, neither of which this function sees.
pub fn compute_sub_scores(features: &Features) -> SubScores {
    SubScores {
        population: population_score(features.population),
        gap: gap_score(features.nearest_brand_km, features.competitor_density),
        anchor: anchor_score(features.anchors.diminishing_score),
        performance: performance_score(features.performance_proxy),
        saturation_penalty: saturation_penalty(features.competitor_density, features.nearest_brand_km),
        final_score: 0.0,
    }
}

/// `(wP*pop + wG*gap + wA*anchor + wPerf*perf) * (1 - satPenalty*wSat)`,
/// clamped to \[0,1\]. `weights` must already be the data-quality-adjusted,
/// re-normalized set.
pub fn final_score(sub: &SubScores, weights: &Weights) -> f64 {
    let blend = weights.population * sub.population
        + weights.gap * sub.gap
        + weights.anchor * sub.anchor
        + weights.performance * sub.performance;
    let penalized = blend * (1.0 - sub.saturation_penalty * weights.saturation);
    penalized.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn population_score_zero_below_zero_population() {
        assert_eq!(population_score(0), 0.0);
    }

    #[test]
    fn population_score_caps_at_one() {
        assert_eq!(population_score(200_000), 1.0);
        assert!((population_score(50_000) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn gap_score_infinite_distance_is_full_distance_term() {
        let g = gap_score(f64::INFINITY, 0.0);
        assert!((g - 1.0).abs() < 1e-12);
    }

    #[test]
    fn anchor_score_zero_score_is_zero() {
        assert_eq!(anchor_score(0.0), 0.0);
    }

    #[test]
    fn saturation_penalty_adds_proximity_term_under_1km() {
        let p = saturation_penalty(0.0, 0.5);
        assert!((p - 0.3).abs() < 1e-12);
    }

    #[test]
    fn saturation_penalty_caps_at_one() {
        let p = saturation_penalty(1.0, 0.5);
        assert_eq!(p, 1.0);
    }

    #[test]
    fn final_score_matches_scoring_contract_scenario() {
        // Worked example: population=50_000, nearestBrandKm=5,
        // competitorDensity=0.1, anchors.diminishingScore=5.2, performanceProxy=0.7,
        // weights default (0.25/0.35/0.20/0.20/0.15). Expected sub-scores: pop=0.5,
        // gap=0.125, anchor=5.2/15=0.3467, performance=0.7, satPenalty=0.5.
        // final = (0.25*0.5 + 0.35*0.125 + 0.20*0.3467 + 0.20*0.7) * (1 - 0.5*0.15) ~= 0.3301.
        let sub = SubScores {
            population: population_score(50_000),
            gap: gap_score(5.0, 0.1),
            anchor: anchor_score(5.2),
            performance: performance_score(0.7),
            saturation_penalty: saturation_penalty(0.1, 5.0),
            final_score: 0.0,
        };
        assert!((sub.population - 0.5).abs() < 1e-9);
        assert!((sub.gap - 0.125).abs() < 1e-9);
        assert!((sub.anchor - 5.2 / 15.0).abs() < 1e-9);
        assert!((sub.saturation_penalty - 0.5).abs() < 1e-9);

        let weights = Weights::default();
        let got = final_score(&sub, &weights);
        assert!((got - 0.3301).abs() < 1e-3, "got {got}");
    }
}
