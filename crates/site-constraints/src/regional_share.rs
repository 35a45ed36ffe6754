//! Regional-share constraints, absolute and population-weighted.

use serde::{Deserialize, Serialize};
use site_model::{Candidate, CountryConfig};
use std::collections::HashMap;

/// `count <= floor(N * maxRegionShare)` where N is the current selected
/// count and `count` is the number of selected candidates in `region_id`.
pub fn absolute_cap(total_selected: usize, max_region_share: f64) -> usize {
    ((total_selected as f64) * max_region_share).floor() as usize
}

/// True if adding one more candidate to `region_id` (making the new total
/// `selected.len() + 1`) would stay within the absolute cap.
pub fn absolute_share_ok(selected: &[Candidate], region_id: &str, max_region_share: f64) -> bool {
    let region_count = selected.iter().filter(|c| c.region_id == region_id).count();
    let new_total = selected.len() + 1;
    let cap = absolute_cap(new_total, max_region_share);
    region_count + 1 <= cap.max(1)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionOverrepresentation {
    pub region_id: String,
    pub actual_share: f64,
    pub expected_share: f64,
}

/// A region is flagged overrepresented if `actualShare / expectedShare > 2.0`,
/// where `expectedShare = regionPopulation / totalPopulation` and
/// `actualShare = selectedInRegion / totalSelected`.
pub fn population_weighted_overrepresentation(
    selected: &[Candidate],
    country: &CountryConfig,
) -> Vec<RegionOverrepresentation> {
    if selected.is_empty() {
        return Vec::new();
    }
    let total_population = country.total_population().max(1);
    let total_selected = selected.len() as f64;

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for c in selected {
        *counts.entry(c.region_id.as_str()).or_insert(0) += 1;
    }

    let mut flagged = Vec::new();
    for region in &country.regions {
        let Some(&count) = counts.get(region.id.as_str()) else { continue };
        let expected_share = region.population as f64 / total_population as f64;
        if expected_share <= 0.0 {
            continue;
        }
        let actual_share = count as f64 / total_selected;
        if actual_share / expected_share > 2.0 {
            flagged.push(RegionOverrepresentation {
                region_id: region.id.clone(),
                actual_share,
                expected_share,
            });
        }
    }
    flagged
}
