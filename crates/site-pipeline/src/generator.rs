//! LocationGenerator: orchestrates G -> F -> S -> H -> R -> S -> P into one
//! run, attaching reproducibility metadata.

use crate::portfolio::{build_portfolio, optimize_with_swaps, portfolio_metrics, portfolio_summary, validate_portfolio};
use crate::refinement::refine_shortlist;
use crate::shortlist::build_shortlist;
use crate::validation::validate_request;
use rand::distributions::Alphanumeric;
use rand::Rng;
use site_constraints::region_for_point;
use site_features::{compute_basic_features, IsochroneProvider};
use site_grid::{create_windows, generate_country_grid, HexCell, Projection, DEFAULT_BUFFER_KM, DEFAULT_WINDOW_SIZE_KM};
use site_guardrails::{enforce_absolute_weight_bounds, enforce_constraint_bounds, enforce_constraint_drift, enforce_weight_drift};
use site_model::{
    AnchorDedupReport, Candidate, CandidateStatus, Diagnostics, GenerationRequest, GenerationResult, Reproducibility,
    Result as SiteResult, ViolationReason, Weights,
};
use site_scoring::score_candidates;
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use tracing::{info, warn};

const SEED_LEN: usize = 10;

/// Generates a short random alphanumeric run seed.
pub fn generate_seed() -> String {
    rand::thread_rng().sample_iter(&Alphanumeric).take(SEED_LEN).map(char::from).collect()
}

/// Stable hash of `(country_code, target_k, weights, seed)`.
pub fn scenario_hash(country_code: &str, target_k: usize, weights: &Weights, seed: &str) -> String {
    let mut hasher = DefaultHasher::new();
    country_code.hash(&mut hasher);
    target_k.hash(&mut hasher);
    weights.population.to_bits().hash(&mut hasher);
    weights.gap.to_bits().hash(&mut hasher);
    weights.anchor.to_bits().hash(&mut hasher);
    weights.performance.to_bits().hash(&mut hasher);
    weights.saturation.to_bits().hash(&mut hasher);
    seed.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

/// Runs one full generation: validates the request, builds the national
/// grid, scores it, shortlists, refines, rescans, builds the portfolio,
/// and emits the result plus reproducibility metadata. An optional
/// isochrone provider feeds the refined population catchment; without one,
/// refinement falls back to the radial calculation.
pub fn generate(request: &GenerationRequest, isochrone: Option<&dyn IsochroneProvider>) -> SiteResult<GenerationResult> {
    validate_request(request)?;

    let seed = generate_seed();
    let config = &request.config;

    // PolicyGuardrailService clamps weights and constraint
    // knobs to their absolute bounds before anything else runs, then to
    // the configured baseline's drift bounds if one was supplied.
    // Violations are never fatal; clamped values flow through the rest of
    // the run and the clamp itself is recorded in diagnostics.
    let mut guardrail_notes = Vec::new();
    let (weights, weight_violations) = enforce_absolute_weight_bounds(&config.weights);
    guardrail_notes.extend(weight_violations.iter().map(describe_guardrail_violation));
    let (min_spacing_m, target_k, max_region_share, constraint_violations) =
        enforce_constraint_bounds(config.min_spacing_m, config.target_k, request.country.max_region_share);
    guardrail_notes.extend(constraint_violations.iter().map(describe_guardrail_violation));

    let (weights, weight_drift_violations) = enforce_weight_drift(&weights, config.baseline.as_ref().map(|b| &b.weights));
    guardrail_notes.extend(weight_drift_violations.iter().map(describe_guardrail_violation));
    let (min_spacing_m, target_k, max_region_share, constraint_drift_violations) = enforce_constraint_drift(
        min_spacing_m,
        target_k,
        max_region_share,
        config.baseline.as_ref().map(|b| (b.min_spacing_m, b.target_k, b.max_region_share)),
    );
    guardrail_notes.extend(constraint_drift_violations.iter().map(describe_guardrail_violation));

    let mut country = request.country.clone();
    country.max_region_share = max_region_share;

    let reference_lat = country
        .boundary
        .bounding_box()
        .map(|(lat_min, lat_max, _, _)| (lat_min + lat_max) / 2.0)
        .unwrap_or(0.0);

    let grid = generate_country_grid(&country.boundary, config.grid_resolution);
    info!(cells = grid.len(), "national grid generated");

    if grid.is_empty() {
        let mut result = empty_result(request, seed, &country.country_code, target_k, &weights);
        result.diagnostics.guardrail_violations = guardrail_notes;
        return Ok(result);
    }

    let projection = Projection::new(reference_lat, config.grid_resolution);

    let mut candidates: Vec<Candidate> = grid
        .iter()
        .map(|cell| build_basic_candidate(*cell, &projection, &country, request))
        .collect();

    score_candidates(&mut candidates, &weights);

    let shortlist = build_shortlist(&candidates, target_k);
    info!(size = shortlist.len(), "shortlist built");

    let shortlist_cells: Vec<HexCell> = shortlist.iter().filter_map(|c| HexCell::from_index(&c.hex_index)).collect();
    let windows = create_windows(&shortlist_cells, &projection, DEFAULT_WINDOW_SIZE_KM, DEFAULT_BUFFER_KM);

    let (mut refined, refinement_report) = refine_shortlist(
        &shortlist,
        &windows,
        &request.population_cells,
        &request.existing_stores,
        &request.competitors,
        &request.anchors,
        isochrone,
    );
    info!(processed = refinement_report.processed, improved = refinement_report.improved, "refinement complete");

    score_candidates(&mut refined, &weights);

    let mut portfolio = build_portfolio(
        &refined,
        target_k,
        min_spacing_m,
        config.min_completeness,
        &request.existing_stores,
        &country,
    );
    optimize_with_swaps(&mut portfolio, min_spacing_m, config.min_completeness, &request.existing_stores, &country);

    let validation = validate_portfolio(&portfolio, target_k, &country);
    if !validation.meets_minimum_acceptance {
        info!(target_k, "portfolio fell short of the 80% minimum acceptance threshold");
    }

    let summary = portfolio_summary(&portfolio);
    let _metrics = portfolio_metrics(&portfolio);

    let anchor_dedup_report = build_anchor_dedup_report(&portfolio);
    let rejection_breakdown = build_rejection_breakdown(&portfolio);
    let final_scores: Vec<f64> = portfolio.iter().map(|c| c.scores.final_score).collect();
    let scoring_distribution = site_scoring::score_distribution(&final_scores);

    // Travel-time fallback is the one in-core degradation trigger (§7
    // DegradationEvent: isochrone failure). Explanation-driven degradation
    // (cache unavailable, uniqueness below threshold, token exhaustion) is
    // layered on by the optional explanation pass at the composition root,
    // which may flip this flag again after this function returns.
    let degraded = portfolio.iter().any(|c| c.quality.estimated.travel_time);

    let hash = scenario_hash(&country.country_code, target_k, &weights, &seed);

    Ok(GenerationResult {
        sites: portfolio,
        portfolio: summary,
        diagnostics: Diagnostics {
            weights_used: weights,
            anchor_dedup_report,
            guardrail_violations: guardrail_notes,
            rejection_breakdown,
            scoring_distribution,
        },
        reproducibility: Reproducibility {
            seed,
            data_versions: HashMap::from([("country".to_string(), country.country_code.clone())]),
            scenario_hash: hash,
        },
        degraded,
    })
}

fn describe_guardrail_violation(v: &site_guardrails::GuardrailViolation) -> String {
    format!("{}: {} (clamped {:.4} -> {:.4})", v.field, v.reason, v.original, v.clamped)
}

fn build_basic_candidate(
    cell: HexCell,
    projection: &Projection,
    country: &site_model::CountryConfig,
    request: &GenerationRequest,
) -> Candidate {
    let center = projection.cell_center(cell);
    let region_id = region_for_point(&country.regions, center)
        .map(|r| r.id.clone())
        .unwrap_or_else(|| "unassigned".to_string());

    let mut candidate = Candidate::new(cell.index(), center, cell.index(), region_id);

    let (features, flags) = compute_basic_features(
        center,
        &request.population_cells,
        &request.existing_stores,
        &request.competitors,
        &request.anchors,
    );
    candidate.features = features;
    candidate.quality = site_model::DataQuality::estimated_from(site_model::EstimationFlags {
        population: flags.population_estimated,
        anchors: false,
        travel_time: false,
    });
    candidate
}

fn build_anchor_dedup_report(portfolio: &[Candidate]) -> AnchorDedupReport {
    let mut by_type: HashMap<site_model::AnchorType, usize> = HashMap::new();
    let mut total_raw = 0;
    let mut total_deduplicated = 0;
    for c in portfolio {
        total_raw += c.features.anchors.raw;
        total_deduplicated += c.features.anchors.deduplicated;
        for (t, count) in &c.features.anchors.breakdown_by_type {
            *by_type.entry(*t).or_insert(0) += count;
        }
    }
    AnchorDedupReport { total_raw, total_deduplicated, by_type }
}

fn build_rejection_breakdown(portfolio: &[Candidate]) -> HashMap<String, usize> {
    let mut breakdown = HashMap::new();
    for c in portfolio {
        if c.status != CandidateStatus::Rejected {
            continue;
        }
        for v in &c.violations {
            let key = violation_key(&v.reason);
            *breakdown.entry(key).or_insert(0) += 1;
        }
    }
    breakdown
}

fn violation_key(reason: &ViolationReason) -> String {
    match reason {
        ViolationReason::SpacingViolation { .. } => "SPACING_VIOLATION",
        ViolationReason::RegionalShareExceeded { .. } => "REGIONAL_SHARE_EXCEEDED",
        ViolationReason::LowCompleteness { .. } => "LOW_COMPLETENESS",
        ViolationReason::SaturationPenalty { .. } => "SATURATION_PENALTY",
        ViolationReason::Capacity => "CAPACITY",
    }
    .to_string()
}

fn empty_result(_request: &GenerationRequest, seed: String, country_code: &str, target_k: usize, weights: &Weights) -> GenerationResult {
    let hash = scenario_hash(country_code, target_k, weights, &seed);
    GenerationResult {
        sites: Vec::new(),
        portfolio: site_model::PortfolioSummary::default(),
        diagnostics: Diagnostics { weights_used: *weights, ..Diagnostics::default() },
        reproducibility: Reproducibility { seed, data_versions: HashMap::new(), scenario_hash: hash },
        degraded: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use site_model::{AdministrativeRegion, CountryConfig, GenerationConfig, LatLng, Polygon, PopulationCell};

    fn square_country() -> CountryConfig {
        CountryConfig {
            country_code: "XX".into(),
            boundary: Polygon::new(vec![
                LatLng::new(50.0, 10.0),
                LatLng::new(50.0, 14.0),
                LatLng::new(53.0, 14.0),
                LatLng::new(53.0, 10.0),
            ]),
            regions: vec![AdministrativeRegion { id: "r1".into(), name: "Region One".into(), boundary: Polygon::default(), population: 1_000_000 }],
            major_metropolitan_areas: vec![],
            max_region_share: 0.4,
        }
    }

    #[test]
    fn empty_boundary_yields_empty_result_without_error() {
        let request = GenerationRequest {
            country: CountryConfig { boundary: Polygon::default(), ..square_country() },
            existing_stores: vec![],
            competitors: vec![],
            population_cells: vec![],
            anchors: vec![],
            config: GenerationConfig::default(),
        };
        let result = generate(&request, None).unwrap();
        assert!(result.sites.is_empty());
    }

    #[test]
    fn minimal_grid_produces_some_candidates() {
        let request = GenerationRequest {
            country: square_country(),
            existing_stores: vec![],
            competitors: vec![],
            population_cells: vec![PopulationCell { lat: 51.5, lng: 12.0, population: 500_000, hex_index: None }],
            anchors: vec![],
            config: GenerationConfig { target_k: 2, ..GenerationConfig::default() },
        };
        let result = generate(&request, None).unwrap();
        assert!(!result.sites.is_empty());
        assert!(result.portfolio.selected_count <= 2);
    }

    #[test]
    fn invalid_weights_are_rejected_before_any_stage_runs() {
        let mut request = GenerationRequest {
            country: square_country(),
            existing_stores: vec![],
            competitors: vec![],
            population_cells: vec![],
            anchors: vec![],
            config: GenerationConfig::default(),
        };
        request.config.weights.population = 5.0;
        assert!(generate(&request, None).is_err());
    }

    #[test]
    fn scenario_hash_is_deterministic_for_same_inputs() {
        let w = Weights::default();
        let a = scenario_hash("XX", 10, &w, "seedseed1");
        let b = scenario_hash("XX", 10, &w, "seedseed1");
        assert_eq!(a, b);
        let c = scenario_hash("XX", 10, &w, "seedseed2");
        assert_ne!(a, c);
    }
}
