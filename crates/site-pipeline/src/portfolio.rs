//! PortfolioService: greedy constraint-aware selection with optional
//! swap-based local optimization.

use serde::{Deserialize, Serialize};
use site_constraints::constraint_violations;
use site_model::{Candidate, CandidateStatus, CountryConfig, ExistingStore, PortfolioSummary, ViolationReason};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortfolioMetrics {
    pub total_score: f64,
    pub mean_score: f64,
    pub mean_population_score: f64,
    pub mean_gap_score: f64,
    pub mean_anchor_score: f64,
    pub mean_performance_score: f64,
    pub mean_completeness: f64,
    pub estimated_data_percentage: f64,
    pub lat_range: (f64, f64),
    pub lng_range: (f64, f64),
    pub centroid_lat: f64,
    pub centroid_lng: f64,
}

#[derive(Debug, Clone, Default)]
pub struct PortfolioValidation {
    pub meets_minimum_acceptance: bool,
    pub metro_coverage_warning: Vec<String>,
    pub regional_fairness_violations: Vec<String>,
}

/// Greedy build: sort candidates by `final` descending, accept iff
/// `ConstraintService` returns zero violations against stores and the
/// selection so far, stop at `target_k` and mark every remaining candidate
/// rejected with `Capacity`.
pub fn build_portfolio(
    candidates: &[Candidate],
    target_k: usize,
    min_spacing_m: f64,
    min_completeness: f64,
    stores: &[ExistingStore],
    country: &CountryConfig,
) -> Vec<Candidate> {
    let mut sorted: Vec<Candidate> = candidates.to_vec();
    sorted.sort_by(|a, b| {
        b.scores
            .final_score
            .partial_cmp(&a.scores.final_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut selected: Vec<Candidate> = Vec::with_capacity(target_k);
    let mut result: Vec<Candidate> = Vec::with_capacity(sorted.len());

    for mut candidate in sorted {
        if selected.len() >= target_k {
            candidate.status = CandidateStatus::Rejected;
            candidate.violations = vec![site_model::ConstraintViolation {
                reason: ViolationReason::Capacity,
                remediation: "target portfolio size already reached".to_string(),
            }];
            result.push(candidate);
            continue;
        }

        let violations = constraint_violations(&candidate, min_spacing_m, min_completeness, stores, &selected, country);
        if violations.is_empty() {
            candidate.status = CandidateStatus::Selected;
            selected.push(candidate.clone());
        } else {
            candidate.status = CandidateStatus::Rejected;
            candidate.violations = violations;
        }
        result.push(candidate);
    }

    result
}

/// For each rejected candidate in descending `final` order, attempts a swap
/// with the lowest-scoring selected candidate whose removal would let the
/// rejected candidate pass all constraints. Swaps that improve total
/// selected score are kept; repeats until a full pass makes no improvement.
pub fn optimize_with_swaps(
    portfolio: &mut Vec<Candidate>,
    min_spacing_m: f64,
    min_completeness: f64,
    stores: &[ExistingStore],
    country: &CountryConfig,
) {
    loop {
        let mut improved = false;

        let mut rejected_order: Vec<usize> = portfolio
            .iter()
            .enumerate()
            .filter(|(_, c)| c.status == CandidateStatus::Rejected)
            .map(|(i, _)| i)
            .collect();
        rejected_order.sort_by(|&a, &b| {
            portfolio[b]
                .scores
                .final_score
                .partial_cmp(&portfolio[a].scores.final_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        'candidates: for idx in rejected_order {
            let candidate = portfolio[idx].clone();

            let mut selected_indices: Vec<usize> = portfolio
                .iter()
                .enumerate()
                .filter(|(_, c)| c.status == CandidateStatus::Selected)
                .map(|(i, _)| i)
                .collect();
            selected_indices.sort_by(|&a, &b| {
                portfolio[a]
                    .scores
                    .final_score
                    .partial_cmp(&portfolio[b].scores.final_score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            for &selected_idx in &selected_indices {
                let without: Vec<Candidate> = portfolio
                    .iter()
                    .enumerate()
                    .filter(|(i, c)| *i != selected_idx && c.status == CandidateStatus::Selected)
                    .map(|(_, c)| c.clone())
                    .collect();

                let violations = constraint_violations(&candidate, min_spacing_m, min_completeness, stores, &without, country);
                if violations.is_empty() && candidate.scores.final_score > portfolio[selected_idx].scores.final_score {
                    portfolio[selected_idx].status = CandidateStatus::Rejected;
                    portfolio[selected_idx].violations = vec![site_model::ConstraintViolation {
                        reason: ViolationReason::Capacity,
                        remediation: "swapped out in favor of a higher-scoring candidate".to_string(),
                    }];
                    portfolio[idx].status = CandidateStatus::Selected;
                    portfolio[idx].violations.clear();
                    improved = true;
                    continue 'candidates;
                }
            }
        }

        if !improved {
            break;
        }
    }
}

pub fn portfolio_summary(portfolio: &[Candidate]) -> PortfolioSummary {
    let selected_count = portfolio.iter().filter(|c| c.status == CandidateStatus::Selected).count();
    let rejected_count = portfolio.iter().filter(|c| c.status == CandidateStatus::Rejected).count();

    let mut region_distribution = std::collections::HashMap::new();
    for c in portfolio.iter().filter(|c| c.status == CandidateStatus::Selected) {
        *region_distribution.entry(c.region_id.clone()).or_insert(0usize) += 1;
    }

    let acceptance_rate = if portfolio.is_empty() {
        0.0
    } else {
        selected_count as f64 / portfolio.len() as f64
    };

    PortfolioSummary { selected_count, rejected_count, region_distribution, acceptance_rate }
}

pub fn portfolio_metrics(portfolio: &[Candidate]) -> PortfolioMetrics {
    let selected: Vec<&Candidate> = portfolio.iter().filter(|c| c.status == CandidateStatus::Selected).collect();
    if selected.is_empty() {
        return PortfolioMetrics::default();
    }
    let n = selected.len() as f64;

    let total_score: f64 = selected.iter().map(|c| c.scores.final_score).sum();
    let mean_score = total_score / n;
    let mean_population_score = selected.iter().map(|c| c.scores.population).sum::<f64>() / n;
    let mean_gap_score = selected.iter().map(|c| c.scores.gap).sum::<f64>() / n;
    let mean_anchor_score = selected.iter().map(|c| c.scores.anchor).sum::<f64>() / n;
    let mean_performance_score = selected.iter().map(|c| c.scores.performance).sum::<f64>() / n;
    let mean_completeness = selected.iter().map(|c| c.quality.completeness).sum::<f64>() / n;

    let estimated_count = selected
        .iter()
        .filter(|c| c.quality.estimated.population || c.quality.estimated.anchors || c.quality.estimated.travel_time)
        .count();
    let estimated_data_percentage = estimated_count as f64 / n * 100.0;

    let lats: Vec<f64> = selected.iter().map(|c| c.location.lat).collect();
    let lngs: Vec<f64> = selected.iter().map(|c| c.location.lng).collect();
    let lat_range = (lats.iter().cloned().fold(f64::INFINITY, f64::min), lats.iter().cloned().fold(f64::NEG_INFINITY, f64::max));
    let lng_range = (lngs.iter().cloned().fold(f64::INFINITY, f64::min), lngs.iter().cloned().fold(f64::NEG_INFINITY, f64::max));
    let centroid_lat = lats.iter().sum::<f64>() / n;
    let centroid_lng = lngs.iter().sum::<f64>() / n;

    PortfolioMetrics {
        total_score,
        mean_score,
        mean_population_score,
        mean_gap_score,
        mean_anchor_score,
        mean_performance_score,
        mean_completeness,
        estimated_data_percentage,
        lat_range,
        lng_range,
        centroid_lat,
        centroid_lng,
    }
}

/// Selected `>= 0.8 * target_k` (else an issue), metro coverage (warning if
/// missing), regional fairness violations surfaced but non-fatal.
pub fn validate_portfolio(
    portfolio: &[Candidate],
    target_k: usize,
    country: &CountryConfig,
) -> PortfolioValidation {
    let selected: Vec<Candidate> = portfolio.iter().filter(|c| c.status == CandidateStatus::Selected).cloned().collect();
    let meets_minimum_acceptance = selected.len() as f64 >= 0.8 * target_k as f64;

    let metro_coverage_warning = site_constraints::uncovered_metropolitan_areas(&selected, country);

    let regional_fairness_violations: Vec<String> = site_constraints::population_weighted_overrepresentation(&selected, country)
        .into_iter()
        .map(|r| format!("region {} is overrepresented (actual {:.1}%, expected {:.1}%)", r.region_id, r.actual_share * 100.0, r.expected_share * 100.0))
        .collect();

    PortfolioValidation { meets_minimum_acceptance, metro_coverage_warning, regional_fairness_violations }
}

#[cfg(test)]
mod tests {
    use super::*;
    use site_model::{LatLng, Polygon, SubScores};

    fn candidate(id: &str, lat: f64, lng: f64, final_score: f64) -> Candidate {
        let mut c = Candidate::new(id, LatLng::new(lat, lng), "res8:0:0", "r1");
        c.scores = SubScores { final_score, ..Default::default() };
        c.quality.completeness = 1.0;
        c
    }

    fn plain_country() -> CountryConfig {
        CountryConfig { country_code: "XX".into(), boundary: Polygon::default(), regions: vec![], major_metropolitan_areas: vec![], max_region_share: 0.4 }
    }

    #[test]
    fn rejects_second_candidate_within_spacing() {
        let candidates = vec![candidate("a", 0.0, 0.0, 0.9), candidate("b", 0.0001, 0.0001, 0.8)];
        let portfolio = build_portfolio(&candidates, 2, 1000.0, 0.0, &[], &plain_country());
        let a = portfolio.iter().find(|c| c.id == "a").unwrap();
        let b = portfolio.iter().find(|c| c.id == "b").unwrap();
        assert_eq!(a.status, CandidateStatus::Selected);
        assert_eq!(b.status, CandidateStatus::Rejected);
    }

    #[test]
    fn stops_at_target_k_and_marks_capacity() {
        let candidates = vec![candidate("a", 0.0, 0.0, 0.9), candidate("b", 1.0, 1.0, 0.8), candidate("c", 2.0, 2.0, 0.7)];
        let portfolio = build_portfolio(&candidates, 2, 0.0, 0.0, &[], &plain_country());
        let selected_count = portfolio.iter().filter(|c| c.status == CandidateStatus::Selected).count();
        assert_eq!(selected_count, 2);
        let c = portfolio.iter().find(|c| c.id == "c").unwrap();
        assert!(matches!(c.violations[0].reason, ViolationReason::Capacity));
    }

    #[test]
    fn summary_counts_match_statuses() {
        let candidates = vec![candidate("a", 0.0, 0.0, 0.9), candidate("b", 1.0, 1.0, 0.8)];
        let portfolio = build_portfolio(&candidates, 1, 0.0, 0.0, &[], &plain_country());
        let summary = portfolio_summary(&portfolio);
        assert_eq!(summary.selected_count, 1);
        assert_eq!(summary.rejected_count, 1);
    }
}
