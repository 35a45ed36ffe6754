//! Metropolitan coverage: every named metro area must have at least one
//! selected candidate nearby.

use site_model::{Candidate, CountryConfig};

/// For each name in `country.major_metropolitan_areas`, true only if at
/// least one selected candidate lies in a region whose name contains the
/// metro name (case-insensitive). Point-in-polygon membership is already
/// baked into `candidate.region_id` by the time candidates reach this
/// check, so a name match against the candidate's region is sufficient;
/// callers doing first-pass placement should use
/// `point_in_region::region_for_point` to assign `region_id` in the first
/// place.
pub fn uncovered_metropolitan_areas(selected: &[Candidate], country: &CountryConfig) -> Vec<String> {
    country
        .major_metropolitan_areas
        .iter()
        .filter(|metro| !is_covered(metro, selected, country))
        .cloned()
        .collect()
}

fn is_covered(metro: &str, selected: &[Candidate], country: &CountryConfig) -> bool {
    let metro_lower = metro.to_lowercase();
    selected.iter().any(|c| {
        country
            .region(&c.region_id)
            .map(|r| r.name.to_lowercase().contains(&metro_lower))
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use site_model::{AdministrativeRegion, LatLng, Polygon};

    fn country() -> CountryConfig {
        CountryConfig {
            country_code: "XX".into(),
            boundary: Polygon::default(),
            regions: vec![
                AdministrativeRegion { id: "r1".into(), name: "Greater Metropolis".into(), boundary: Polygon::default(), population: 1_000_000 },
            ],
            major_metropolitan_areas: vec!["Metropolis".into()],
            max_region_share: 0.4,
        }
    }

    #[test]
    fn covered_when_selected_candidate_in_matching_region() {
        let selected = vec![Candidate::new("a", LatLng::new(0.0, 0.0), "res8:0:0", "r1")];
        let uncovered = uncovered_metropolitan_areas(&selected, &country());
        assert!(uncovered.is_empty());
    }

    #[test]
    fn uncovered_when_no_selected_candidate_matches() {
        let uncovered = uncovered_metropolitan_areas(&[], &country());
        assert_eq!(uncovered, vec!["Metropolis".to_string()]);
    }
}
