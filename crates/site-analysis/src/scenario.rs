//! ScenarioService: Defend/Balanced/Blitz re-weighting against cached
//! features, with a process-scoped result cache.

use crate::pareto::pareto_frontier;
use serde::{Deserialize, Serialize};
use site_model::{Candidate, CountryConfig, ExistingStore, ParetoPoint, ScenarioMode, Weights, WeightMultipliers};
use site_pipeline::portfolio::build_portfolio;
use site_scoring::score_candidates;
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;

pub const DEFEND_MULTIPLIERS: WeightMultipliers =
    WeightMultipliers { population: 0.9, gap: 1.0, anchor: 1.1, performance: 1.2, saturation: 1.3 };
pub const BLITZ_MULTIPLIERS: WeightMultipliers =
    WeightMultipliers { population: 1.2, gap: 1.1, anchor: 0.9, performance: 0.8, saturation: 0.7 };

pub fn multipliers_for(mode: ScenarioMode) -> WeightMultipliers {
    match mode {
        ScenarioMode::Defend => DEFEND_MULTIPLIERS,
        ScenarioMode::Balanced => WeightMultipliers::IDENTITY,
        ScenarioMode::Blitz => BLITZ_MULTIPLIERS,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub mode: ScenarioMode,
    pub weights: Weights,
    pub portfolio: Vec<Candidate>,
    pub frontier: Vec<ParetoPoint>,
    /// True iff this result was served from the cache rather than freshly
    /// computed. Two consecutive `ScenarioCache::run` calls with identical
    /// arguments must report `false` then `true`.
    pub cache_hit: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ScenarioKey {
    mode_discriminant: u8,
    candidate_set_hash: u64,
    config_hash: u64,
}

fn mode_discriminant(mode: ScenarioMode) -> u8 {
    match mode {
        ScenarioMode::Defend => 0,
        ScenarioMode::Balanced => 1,
        ScenarioMode::Blitz => 2,
    }
}

fn candidate_set_hash(candidates: &[Candidate]) -> u64 {
    let mut ids: Vec<&str> = candidates.iter().map(|c| c.id.as_str()).collect();
    ids.sort_unstable();
    let mut hasher = DefaultHasher::new();
    for id in ids {
        id.hash(&mut hasher);
    }
    hasher.finish()
}

fn config_hash(base_weights: &Weights, target_k: usize, min_spacing_m: f64, min_completeness: f64) -> u64 {
    let mut hasher = DefaultHasher::new();
    base_weights.population.to_bits().hash(&mut hasher);
    base_weights.gap.to_bits().hash(&mut hasher);
    base_weights.anchor.to_bits().hash(&mut hasher);
    base_weights.performance.to_bits().hash(&mut hasher);
    base_weights.saturation.to_bits().hash(&mut hasher);
    target_k.hash(&mut hasher);
    min_spacing_m.to_bits().hash(&mut hasher);
    min_completeness.to_bits().hash(&mut hasher);
    hasher.finish()
}

/// Process-scoped cache of `(portfolio, frontier, weights)` triples keyed
/// by `(mode, candidate-id-set hash, config hash)`. A cache hit skips
/// every external call, so the target wall time under 500ms is a
/// same-process invariant, not something this cache enforces directly.
#[derive(Default)]
pub struct ScenarioCache {
    entries: Mutex<HashMap<ScenarioKey, ScenarioResult>>,
}

impl ScenarioCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the full scenario pipeline, or returns the cached result for
    /// an identical `(mode, candidate set, config)` triple.
    pub fn run(
        &self,
        mode: ScenarioMode,
        candidates: &[Candidate],
        base_weights: &Weights,
        target_k: usize,
        min_spacing_m: f64,
        min_completeness: f64,
        stores: &[ExistingStore],
        country: &CountryConfig,
    ) -> ScenarioResult {
        let key = ScenarioKey {
            mode_discriminant: mode_discriminant(mode),
            candidate_set_hash: candidate_set_hash(candidates),
            config_hash: config_hash(base_weights, target_k, min_spacing_m, min_completeness),
        };

        if let Some(cached) = self.entries.lock().unwrap().get(&key) {
            let mut hit = cached.clone();
            hit.cache_hit = true;
            return hit;
        }

        let result = run_scenario(mode, candidates, base_weights, target_k, min_spacing_m, min_completeness, stores, country);
        self.entries.lock().unwrap().insert(key, result.clone());
        result
    }
}

fn run_scenario(
    mode: ScenarioMode,
    candidates: &[Candidate],
    base_weights: &Weights,
    target_k: usize,
    min_spacing_m: f64,
    min_completeness: f64,
    stores: &[ExistingStore],
    country: &CountryConfig,
) -> ScenarioResult {
    let scaled = base_weights.scaled(multipliers_for(mode)).normalized();

    let mut rescored: Vec<Candidate> = candidates.to_vec();
    score_candidates(&mut rescored, &scaled);

    let portfolio = build_portfolio(&rescored, target_k, min_spacing_m, min_completeness, stores, country);
    let frontier = pareto_frontier(&rescored, min_spacing_m, min_completeness, stores, country);

    ScenarioResult { mode, weights: scaled, portfolio, frontier, cache_hit: false }
}
