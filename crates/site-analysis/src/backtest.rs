//! BacktestService: mask a fraction of existing stores, rebuild the
//! portfolio against the rest, then check whether the remaining model
//! would have predicted the masked ones.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use site_model::{haversine_km, Candidate, CandidateStatus, CountryConfig, ExistingStore, LatLng, PopulationCell};
use site_pipeline::portfolio::build_portfolio;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub const DEFAULT_ITERATIONS: usize = 1;
pub const DEFAULT_MASK_PERCENTAGE: f64 = 0.10;
pub const DEFAULT_DISTANCE_THRESHOLD_KM: f64 = 2.5;

const HIT_RATE_THRESHOLD: f64 = 0.6;
const MEDIAN_DISTANCE_THRESHOLD_KM: f64 = 2.5;
const COVERAGE_UPLIFT_THRESHOLD: f64 = 0.1;

#[derive(Debug, Clone, Copy)]
pub struct BacktestConfig {
    pub iterations: usize,
    pub mask_percentage: f64,
    pub distance_threshold_km: f64,
    pub target_k: usize,
    pub min_spacing_m: f64,
    pub min_completeness: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            mask_percentage: DEFAULT_MASK_PERCENTAGE,
            distance_threshold_km: DEFAULT_DISTANCE_THRESHOLD_KM,
            target_k: 10,
            min_spacing_m: 500.0,
            min_completeness: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestIteration {
    pub hit_rate: f64,
    pub median_distance_km: f64,
    pub precision: f64,
    pub recall: f64,
    pub coverage_uplift: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestReport {
    pub iterations: Vec<BacktestIteration>,
    pub mean_hit_rate: f64,
    pub mean_median_distance_km: f64,
    pub mean_coverage_uplift: f64,
    pub passed: bool,
    pub recommendations: Vec<String>,
}

fn seeded_rng(seed: &str, iteration: usize) -> ChaCha8Rng {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    iteration.hash(&mut hasher);
    ChaCha8Rng::seed_from_u64(hasher.finish())
}

fn nearest_distance_km(point: LatLng, locations: &[LatLng]) -> f64 {
    locations.iter().map(|l| haversine_km(point, *l)).fold(f64::INFINITY, f64::min)
}

fn median(mut values: Vec<f64>) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = values.len();
    if n % 2 == 0 {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    } else {
        values[n / 2]
    }
}

/// Population-cell coverage fraction: the share of total population within
/// `radius_km` of at least one location in `locations`.
fn coverage(locations: &[LatLng], population_cells: &[PopulationCell], radius_km: f64) -> f64 {
    let total: u64 = population_cells.iter().map(|c| c.population).sum();
    if total == 0 {
        return 0.0;
    }
    let covered: u64 = population_cells
        .iter()
        .filter(|c| locations.iter().any(|l| haversine_km(*l, LatLng::new(c.lat, c.lng)) <= radius_km))
        .map(|c| c.population)
        .sum();
    covered as f64 / total as f64
}

fn run_one_iteration(
    candidates: &[Candidate],
    stores: &[ExistingStore],
    population_cells: &[PopulationCell],
    config: &BacktestConfig,
    country: &CountryConfig,
    seed: &str,
    iteration: usize,
) -> BacktestIteration {
    let mut rng = seeded_rng(seed, iteration);
    let mut shuffled: Vec<&ExistingStore> = stores.iter().collect();
    shuffled.shuffle(&mut rng);

    let mask_count = ((stores.len() as f64) * config.mask_percentage).round() as usize;
    let (masked, remaining): (Vec<&ExistingStore>, Vec<&ExistingStore>) = {
        let masked = shuffled[..mask_count.min(shuffled.len())].to_vec();
        let remaining = shuffled[mask_count.min(shuffled.len())..].to_vec();
        (masked, remaining)
    };
    let remaining_owned: Vec<ExistingStore> = remaining.iter().map(|s| (*s).clone()).collect();

    let portfolio = build_portfolio(candidates, config.target_k, config.min_spacing_m, config.min_completeness, &remaining_owned, country);
    let predicted_locations: Vec<LatLng> = portfolio.iter().filter(|c| c.status == CandidateStatus::Selected).map(|c| c.location).collect();

    let masked_points: Vec<LatLng> = masked.iter().map(|s| LatLng::new(s.lat, s.lng)).collect();
    let distances: Vec<f64> = masked_points.iter().map(|p| nearest_distance_km(*p, &predicted_locations)).collect();

    let hits = distances.iter().filter(|d| **d <= config.distance_threshold_km).count();
    let hit_rate = if masked_points.is_empty() { 1.0 } else { hits as f64 / masked_points.len() as f64 };
    let median_distance_km = median(distances);

    let true_positive_predictions = predicted_locations
        .iter()
        .filter(|p| masked_points.iter().any(|m| haversine_km(**p, *m) <= config.distance_threshold_km))
        .count();
    let precision = if predicted_locations.is_empty() { 0.0 } else { true_positive_predictions as f64 / predicted_locations.len() as f64 };
    let recall = hit_rate;

    let remaining_points: Vec<LatLng> = remaining.iter().map(|s| LatLng::new(s.lat, s.lng)).collect();
    let coverage_before = coverage(&remaining_points, population_cells, config.distance_threshold_km);
    let mut with_predictions = remaining_points;
    with_predictions.extend(predicted_locations);
    let coverage_after = coverage(&with_predictions, population_cells, config.distance_threshold_km);
    let coverage_uplift = if coverage_before > 0.0 { (coverage_after - coverage_before) / coverage_before } else { coverage_after };

    BacktestIteration { hit_rate, median_distance_km, precision, recall, coverage_uplift }
}

/// Runs `config.iterations` masked rebuild-and-measure passes, each with a
/// deterministic shuffle derived from `seed` and the iteration index.
pub fn run_backtest(
    candidates: &[Candidate],
    stores: &[ExistingStore],
    population_cells: &[PopulationCell],
    config: BacktestConfig,
    country: &CountryConfig,
    seed: &str,
) -> BacktestReport {
    let iterations: Vec<BacktestIteration> = (0..config.iterations.max(1))
        .map(|i| run_one_iteration(candidates, stores, population_cells, &config, country, seed, i))
        .collect();

    let n = iterations.len() as f64;
    let mean_hit_rate = iterations.iter().map(|i| i.hit_rate).sum::<f64>() / n;
    let mean_median_distance_km = iterations.iter().map(|i| i.median_distance_km).sum::<f64>() / n;
    let mean_coverage_uplift = iterations.iter().map(|i| i.coverage_uplift).sum::<f64>() / n;

    let passed = mean_hit_rate >= HIT_RATE_THRESHOLD
        && mean_median_distance_km <= MEDIAN_DISTANCE_THRESHOLD_KM
        && mean_coverage_uplift >= COVERAGE_UPLIFT_THRESHOLD;

    let mut recommendations = Vec::new();
    if mean_hit_rate < HIT_RATE_THRESHOLD {
        recommendations.push("hit rate below 0.6 — review the scoring weights against historical store placements".to_string());
    }
    if mean_median_distance_km > MEDIAN_DISTANCE_THRESHOLD_KM {
        recommendations.push("median prediction distance exceeds 2.5km — grid resolution or feature radii may be too coarse".to_string());
    }
    if mean_coverage_uplift < COVERAGE_UPLIFT_THRESHOLD {
        recommendations.push("coverage uplift below 0.1 — predicted sites add little population coverage over the existing network".to_string());
    }

    BacktestReport { iterations, mean_hit_rate, mean_median_distance_km, mean_coverage_uplift, passed, recommendations }
}

#[cfg(test)]
mod tests {
    use super::*;
    use site_model::Polygon;

    fn plain_country() -> CountryConfig {
        CountryConfig { country_code: "XX".into(), boundary: Polygon::default(), regions: vec![], major_metropolitan_areas: vec![], max_region_share: 0.4 }
    }

    fn store(id: &str, lat: f64, lng: f64) -> ExistingStore {
        ExistingStore { id: id.into(), name: id.into(), lat, lng, turnover: None }
    }

    fn candidate(id: &str, lat: f64, lng: f64, final_score: f64) -> Candidate {
        let mut c = Candidate::new(id, LatLng::new(lat, lng), "res8:0:0", "r1");
        c.scores.final_score = final_score;
        c.quality.completeness = 1.0;
        c
    }

    #[test]
    fn deterministic_for_same_seed() {
        let stores: Vec<ExistingStore> = (0..10).map(|i| store(&format!("s{i}"), i as f64 * 0.1, 0.0)).collect();
        let candidates: Vec<Candidate> = (0..10).map(|i| candidate(&format!("c{i}"), i as f64 * 0.1, 0.01, 1.0 - i as f64 * 0.01)).collect();
        let country = plain_country();
        let config = BacktestConfig { target_k: 5, ..BacktestConfig::default() };

        let a = run_backtest(&candidates, &stores, &[], config, &country, "seed1");
        let b = run_backtest(&candidates, &stores, &[], config, &country, "seed1");
        assert_eq!(a.iterations.len(), b.iterations.len());
        assert!((a.mean_hit_rate - b.mean_hit_rate).abs() < 1e-12);
    }

    #[test]
    fn empty_stores_yields_perfect_hit_rate() {
        let country = plain_country();
        let config = BacktestConfig::default();
        let report = run_backtest(&[], &[], &[], config, &country, "seed1");
        assert_eq!(report.mean_hit_rate, 1.0);
    }
}
