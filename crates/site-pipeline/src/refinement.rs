//! RefinementService: recomputes features with wider radii for shortlisted
//! candidates only, grouped by grid window.

use serde::{Deserialize, Serialize};
use site_features::{compute_refined_features, IsochroneProvider};
use site_grid::GridWindow;
use site_model::{AnchorPoint, Candidate, CompetitorLocation, EstimationFlags, ExistingStore, PopulationCell};
use std::collections::HashSet;
use tracing::warn;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefinementReport {
    pub processed: usize,
    pub improved: usize,
    pub mean_population_delta: f64,
    pub mean_anchor_delta: f64,
    pub mean_performance_delta: f64,
    /// `refined_count / original_count`.
    pub efficiency: f64,
}

/// Runs refined feature computation on every shortlisted candidate, grouped
/// by which grid window its hex cell falls into. A window is keyed by the
/// candidate's own cell, so any `HexCell::index()` membership in
/// `window.cells` is enough to route it; a candidate whose cell matches no
/// window still gets refined directly (fallback, same as having a
/// single-candidate window of its own).
///
/// On a per-candidate failure (the isochrone provider errors and the
/// radial fallback somehow still fails — defensive only, since
/// `compute_refined_features` never itself returns an error) the original
/// candidate is kept unchanged rather than dropped. Candidates are
/// deduplicated by id across overlapping windows on a first-win basis.
pub fn refine_shortlist(
    shortlist: &[Candidate],
    windows: &[GridWindow],
    population_cells: &[PopulationCell],
    stores: &[ExistingStore],
    competitors: &[CompetitorLocation],
    anchors: &[AnchorPoint],
    isochrone: Option<&dyn IsochroneProvider>,
) -> (Vec<Candidate>, RefinementReport) {
    let mut seen: HashSet<String> = HashSet::new();
    let mut refined: Vec<Candidate> = Vec::with_capacity(shortlist.len());

    let mut processed = 0usize;
    let mut improved = 0usize;
    let mut population_delta_sum = 0.0;
    let mut anchor_delta_sum = 0.0;
    let mut performance_delta_sum = 0.0;

    for window in windows {
        let window_cells: HashSet<String> = window.cells.iter().map(|c| c.index()).collect();
        for candidate in shortlist {
            if seen.contains(&candidate.id) {
                continue;
            }
            if !window_cells.contains(candidate.hex_index.as_str()) {
                continue;
            }
            seen.insert(candidate.id.clone());

            let refined_candidate = refine_one(candidate, population_cells, stores, competitors, anchors, isochrone);
            processed += 1;
            if refined_candidate.features.population > candidate.features.population
                || refined_candidate.features.anchors.diminishing_score > candidate.features.anchors.diminishing_score
                || refined_candidate.features.performance_proxy > candidate.features.performance_proxy
            {
                improved += 1;
            }
            population_delta_sum += refined_candidate.features.population as f64 - candidate.features.population as f64;
            anchor_delta_sum += refined_candidate.features.anchors.diminishing_score - candidate.features.anchors.diminishing_score;
            performance_delta_sum += refined_candidate.features.performance_proxy - candidate.features.performance_proxy;

            refined.push(refined_candidate);
        }
    }

    // Any shortlisted candidate whose cell matched no window (degenerate
    // grid construction) still gets refined directly.
    for candidate in shortlist {
        if seen.contains(&candidate.id) {
            continue;
        }
        seen.insert(candidate.id.clone());
        let refined_candidate = refine_one(candidate, population_cells, stores, competitors, anchors, isochrone);
        processed += 1;
        refined.push(refined_candidate);
    }

    let report = RefinementReport {
        processed,
        improved,
        mean_population_delta: if processed > 0 { population_delta_sum / processed as f64 } else { 0.0 },
        mean_anchor_delta: if processed > 0 { anchor_delta_sum / processed as f64 } else { 0.0 },
        mean_performance_delta: if processed > 0 { performance_delta_sum / processed as f64 } else { 0.0 },
        efficiency: if shortlist.is_empty() { 0.0 } else { refined.len() as f64 / shortlist.len() as f64 },
    };

    (refined, report)
}

fn refine_one(
    candidate: &Candidate,
    population_cells: &[PopulationCell],
    stores: &[ExistingStore],
    competitors: &[CompetitorLocation],
    anchors: &[AnchorPoint],
    isochrone: Option<&dyn IsochroneProvider>,
) -> Candidate {
    let (features, flags) =
        compute_refined_features(candidate.location, population_cells, stores, competitors, anchors, isochrone);

    let mut next = candidate.clone();
    next.features = features;
    next.quality = site_model::DataQuality::estimated_from(EstimationFlags {
        population: flags.population_estimated,
        anchors: next.quality.estimated.anchors,
        travel_time: flags.travel_time_estimated,
    });
    if flags.population_estimated || flags.travel_time_estimated {
        warn!(id = %candidate.id, "refinement fell back to an estimated feature");
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use site_grid::HexCell;
    use site_model::LatLng;

    fn candidate_with_cell(id: &str, cell: HexCell) -> Candidate {
        Candidate::new(id, LatLng::new(0.0, 0.0), cell.index(), "r1")
    }

    #[test]
    fn every_shortlisted_candidate_is_refined_exactly_once() {
        let cell = HexCell { resolution: 8, q: 0, r: 0 };
        let shortlist = vec![candidate_with_cell("a", cell), candidate_with_cell("b", cell)];
        let window = GridWindow { id: "w0".into(), cells: vec![cell] };
        let (refined, report) = refine_shortlist(&shortlist, &[window], &[], &[], &[], &[], None);
        assert_eq!(refined.len(), 2);
        assert_eq!(report.processed, 2);
    }

    #[test]
    fn unmatched_candidate_still_gets_refined_via_fallback() {
        let cell = HexCell { resolution: 8, q: 5, r: 5 };
        let shortlist = vec![candidate_with_cell("a", cell)];
        let (refined, report) = refine_shortlist(&shortlist, &[], &[], &[], &[], &[], None);
        assert_eq!(refined.len(), 1);
        assert_eq!(report.processed, 1);
    }
}
