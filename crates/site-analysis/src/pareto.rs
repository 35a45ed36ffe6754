//! ParetoService: K-sweep over portfolio size, dominance pruning, and knee
//! detection.

use site_constraints::constraint_violations;
use site_model::{Candidate, CandidateStatus, CountryConfig, ExistingStore, ParetoPoint};
use site_pipeline::portfolio::build_portfolio;
use tracing::info;

const ROI_POPULATION_DOLLARS: f64 = 500_000.0;
const ROI_PERFORMANCE_DOLLARS: f64 = 200_000.0;
const ROI_GAP_DOLLARS: f64 = 300_000.0;
const ROI_NORMALIZER_DOLLARS: f64 = 300_000.0;

const COVERAGE_POPULATION_FRACTION: f64 = 0.1;
const COVERAGE_POPULATION_WEIGHT: f64 = 0.7;
const COVERAGE_REGION_WEIGHT: f64 = 0.3;

/// Dense sweep 5..=20, then widening steps up to `max(candidates, 300)`.
pub fn sweep_k_values(candidate_count: usize) -> Vec<usize> {
    let upper = candidate_count.max(300);
    let mut values: Vec<usize> = (5..=20.min(upper)).collect();

    if upper > 20 {
        let step = (((upper - 20) as f64 / 10.0).round() as usize).max(5);
        let mut k = 20 + step;
        while k < upper {
            values.push(k);
            k += step;
        }
        values.push(upper);
    }

    values.sort_unstable();
    values.dedup();
    values
}

fn mean(values: impl Iterator<Item = f64>, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        values.sum::<f64>() / count as f64
    }
}

fn coefficient_of_variation(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let m = values.iter().sum::<f64>() / n;
    if m.abs() < 1e-12 {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / n;
    variance.sqrt() / m.abs()
}

fn roi(selected: &[Candidate], k: usize) -> f64 {
    let numerator: f64 = selected
        .iter()
        .map(|c| {
            c.scores.population * ROI_POPULATION_DOLLARS
                + c.scores.performance * ROI_PERFORMANCE_DOLLARS
                + c.scores.gap * ROI_GAP_DOLLARS
        })
        .sum();
    numerator / (ROI_NORMALIZER_DOLLARS * k as f64) - 1.0
}

fn risk(selected: &[Candidate]) -> f64 {
    let completeness_term = 1.0 - mean(selected.iter().map(|c| c.quality.completeness), selected.len());
    let lats: Vec<f64> = selected.iter().map(|c| c.location.lat).collect();
    let lngs: Vec<f64> = selected.iter().map(|c| c.location.lng).collect();
    let concentration_term = (coefficient_of_variation(&lats) + coefficient_of_variation(&lngs)) / 2.0;
    let saturation_term = mean(selected.iter().map(|c| c.scores.saturation_penalty), selected.len());
    (completeness_term + concentration_term + saturation_term) / 3.0
}

fn coverage(selected: &[Candidate], country: &CountryConfig) -> f64 {
    let total_population = country.total_population().max(1) as f64;
    let covered_population: f64 = selected
        .iter()
        .map(|c| {
            // catchment population is a feature of the scored candidate, not
            // the country total; summed across the portfolio.
            c.features.population as f64
        })
        .sum();
    let population_term = COVERAGE_POPULATION_WEIGHT * (covered_population / (COVERAGE_POPULATION_FRACTION * total_population)).min(1.0);

    let total_regions = country.regions.len().max(1);
    let regions_with_site = selected.iter().map(|c| c.region_id.as_str()).collect::<std::collections::HashSet<_>>().len();
    let region_term = COVERAGE_REGION_WEIGHT * (regions_with_site as f64 / total_regions as f64);

    population_term + region_term
}

/// Runs one portfolio build at size `k` and folds it into a `ParetoPoint`.
pub fn evaluate_k(
    candidates: &[Candidate],
    k: usize,
    min_spacing_m: f64,
    min_completeness: f64,
    stores: &[ExistingStore],
    country: &CountryConfig,
) -> ParetoPoint {
    let portfolio = build_portfolio(candidates, k, min_spacing_m, min_completeness, stores, country);
    let selected: Vec<Candidate> = portfolio.iter().filter(|c| c.status == CandidateStatus::Selected).cloned().collect();

    ParetoPoint {
        k,
        roi: if selected.is_empty() { -1.0 } else { roi(&selected, k) },
        risk: risk(&selected),
        coverage: coverage(&selected, country),
        portfolio,
        is_knee: false,
        is_dominated: false,
    }
}

/// Sweeps K, prunes dominated points, and marks the knee.
pub fn pareto_frontier(
    candidates: &[Candidate],
    min_spacing_m: f64,
    min_completeness: f64,
    stores: &[ExistingStore],
    country: &CountryConfig,
) -> Vec<ParetoPoint> {
    let k_values = sweep_k_values(candidates.len());
    let mut points: Vec<ParetoPoint> = k_values
        .iter()
        .map(|&k| evaluate_k(candidates, k, min_spacing_m, min_completeness, stores, country))
        .collect();

    for i in 0..points.len() {
        let dominated = (0..points.len()).any(|j| i != j && points[i].dominated_by(&points[j]));
        points[i].is_dominated = dominated;
    }

    let mut frontier: Vec<ParetoPoint> = points.into_iter().filter(|p| !p.is_dominated).collect();
    frontier.sort_by(|a, b| b.roi.partial_cmp(&a.roi).unwrap_or(std::cmp::Ordering::Equal));

    mark_knee(&mut frontier);
    info!(k_values = k_values.len(), frontier = frontier.len(), "pareto frontier computed");
    frontier
}

/// Marks the interior point with the steepest change in `ΔROI/ΔRisk`
/// between its two neighbor segments. For `|frontier| <= 2` the first
/// point is marked instead.
fn mark_knee(frontier: &mut [ParetoPoint]) {
    if frontier.is_empty() {
        return;
    }
    if frontier.len() <= 2 {
        frontier[0].is_knee = true;
        return;
    }

    let slope = |a: &ParetoPoint, b: &ParetoPoint| -> f64 {
        let d_risk = b.risk - a.risk;
        if d_risk.abs() < 1e-12 {
            0.0
        } else {
            (b.roi - a.roi) / d_risk
        }
    };

    let mut best_index = 1;
    let mut best_delta = f64::NEG_INFINITY;
    for i in 1..frontier.len() - 1 {
        let left_slope = slope(&frontier[i - 1], &frontier[i]);
        let right_slope = slope(&frontier[i], &frontier[i + 1]);
        let delta = (right_slope - left_slope).abs();
        if delta > best_delta {
            best_delta = delta;
            best_index = i;
        }
    }
    frontier[best_index].is_knee = true;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweep_is_dense_below_twenty() {
        let values = sweep_k_values(10);
        assert_eq!(values, (5..=20).collect::<Vec<_>>());
    }

    #[test]
    fn sweep_widens_steps_above_twenty() {
        let values = sweep_k_values(300);
        assert!(values.iter().all(|&k| k >= 5 && k <= 300));
        assert!(values.windows(2).all(|w| w[1] > w[0]));
        assert_eq!(*values.last().unwrap(), 300);
    }

    #[test]
    fn single_point_frontier_is_knee() {
        let mut points = vec![ParetoPoint { k: 5, roi: 0.1, risk: 0.2, coverage: 0.3, portfolio: vec![], is_knee: false, is_dominated: false }];
        mark_knee(&mut points);
        assert!(points[0].is_knee);
    }
}
