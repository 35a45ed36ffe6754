//! Structured constraint violations with remediation hints.

use crate::{data_quality, regional_share, spacing};
use site_model::{Candidate, ConstraintViolation, CountryConfig, ExistingStore, ViolationReason};

/// Checks spacing, regional share, and data-quality for one candidate
/// against a selection in progress, returning every violation found (a
/// candidate can violate more than one rule at once).
pub fn constraint_violations(
    candidate: &Candidate,
    min_spacing_m: f64,
    min_completeness: f64,
    stores: &[ExistingStore],
    selected: &[Candidate],
    country: &CountryConfig,
) -> Vec<ConstraintViolation> {
    let mut violations = Vec::new();

    let nearest_km = spacing::nearest_occupied_distance_km(&candidate.id, candidate.location, stores, selected);
    let min_required_km = min_spacing_m / 1000.0;
    if nearest_km < min_required_km {
        violations.push(ConstraintViolation {
            reason: ViolationReason::SpacingViolation { distance_km: nearest_km, min_required_km },
            remediation: format!(
                "move the candidate at least {min_required_km:.3} km from the nearest existing store or selected site"
            ),
        });
    }

    if !regional_share::absolute_share_ok(selected, &candidate.region_id, country.max_region_share) {
        let region_count = selected.iter().filter(|c| c.region_id == candidate.region_id).count();
        let cap = regional_share::absolute_cap(selected.len() + 1, country.max_region_share);
        violations.push(ConstraintViolation {
            reason: ViolationReason::RegionalShareExceeded { region_id: candidate.region_id.clone(), count: region_count, cap },
            remediation: format!("region {} is already at its {:.0}% share cap", candidate.region_id, country.max_region_share * 100.0),
        });
    }

    if !data_quality::satisfies_completeness(candidate, min_completeness) {
        violations.push(ConstraintViolation {
            reason: ViolationReason::LowCompleteness { completeness: candidate.quality.completeness, min_required: min_completeness },
            remediation: "gather more source data for this candidate's catchment before selecting it".to_string(),
        });
    }

    if candidate.scores.saturation_penalty > 0.5 {
        violations.push(ConstraintViolation {
            reason: ViolationReason::SaturationPenalty { penalty: candidate.scores.saturation_penalty },
            remediation: "this catchment is already saturated with competitors or the same brand".to_string(),
        });
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use site_model::{LatLng, Polygon, SubScores};

    fn plain_country() -> CountryConfig {
        CountryConfig {
            country_code: "XX".into(),
            boundary: Polygon::default(),
            regions: vec![],
            major_metropolitan_areas: vec![],
            max_region_share: 0.4,
        }
    }

    #[test]
    fn flags_spacing_violation_when_too_close_to_store() {
        let candidate = Candidate::new("c1", LatLng::new(0.0, 0.0), "res8:0:0", "r1");
        let stores = vec![ExistingStore { id: "s1".into(), name: "s1".into(), lat: 0.0001, lng: 0.0001, turnover: None }];
        let violations = constraint_violations(&candidate, 1000.0, 0.5, &stores, &[], &plain_country());
        assert!(violations.iter().any(|v| matches!(v.reason, ViolationReason::SpacingViolation { .. })));
    }

    #[test]
    fn flags_saturation_penalty_above_half() {
        let mut candidate = Candidate::new("c1", LatLng::new(0.0, 0.0), "res8:0:0", "r1");
        candidate.scores = SubScores { saturation_penalty: 0.9, ..Default::default() };
        let violations = constraint_violations(&candidate, 0.0, 0.0, &[], &[], &plain_country());
        assert!(violations.iter().any(|v| matches!(v.reason, ViolationReason::SaturationPenalty { .. })));
    }

    #[test]
    fn clean_candidate_has_no_violations() {
        let candidate = Candidate::new("c1", LatLng::new(0.0, 0.0), "res8:0:0", "r1");
        let violations = constraint_violations(&candidate, 0.0, 0.0, &[], &[], &plain_country());
        assert!(violations.is_empty());
    }
}
