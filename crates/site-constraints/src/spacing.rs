//! Spacing constraint: every candidate must sit at least `minSpacingM` from
//! every existing store and every already-selected candidate.

use site_model::{haversine_km, Candidate, ExistingStore, LatLng};

/// Distance, in km, from `point` to the nearest of `stores` plus
/// `selected`. `selected` is scanned by reference and the candidate being
/// tested is skipped if it appears in it (matched by id), so re-checking an
/// already-selected candidate against its own selected set doesn't trip on
/// itself.
pub fn nearest_occupied_distance_km(
    candidate_id: &str,
    point: LatLng,
    stores: &[ExistingStore],
    selected: &[Candidate],
) -> f64 {
    let store_min = stores
        .iter()
        .map(|s| haversine_km(point, LatLng::new(s.lat, s.lng)))
        .fold(f64::INFINITY, f64::min);

    let selected_min = selected
        .iter()
        .filter(|c| c.id != candidate_id)
        .map(|c| haversine_km(point, c.location))
        .fold(f64::INFINITY, f64::min);

    store_min.min(selected_min)
}

/// True if placing `candidate` alongside `stores` and `selected` respects
/// `min_spacing_m`.
pub fn satisfies_spacing(
    candidate: &Candidate,
    min_spacing_m: f64,
    stores: &[ExistingStore],
    selected: &[Candidate],
) -> bool {
    let min_required_km = min_spacing_m / 1000.0;
    nearest_occupied_distance_km(&candidate.id, candidate.location, stores, selected) >= min_required_km
}

/// Incrementally validates spacing against a growing selection: used by
/// `PortfolioService`'s greedy build loop, which calls this once per
/// candidate considered rather than re-scanning the whole shortlist.
pub fn batch_satisfies_spacing(
    candidates: &[Candidate],
    min_spacing_m: f64,
    stores: &[ExistingStore],
) -> Vec<bool> {
    let mut selected: Vec<Candidate> = Vec::with_capacity(candidates.len());
    let mut results = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let ok = satisfies_spacing(candidate, min_spacing_m, stores, &selected);
        if ok {
            selected.push(candidate.clone());
        }
        results.push(ok);
    }
    results
}
