//! ExplanationService: the always-available deterministic template tier
//! plus an optional remote tier behind a TTL cache.

pub mod cache;
pub mod remote;
pub mod template;

pub use cache::{CacheKey, ExplanationCache, DEFAULT_TTL};
pub use remote::{RemoteExplanationConfig, RemoteExplanationError, RemoteExplanationProvider};
pub use template::{template_explanation, Explanation, ExplanationConfidence, MAX_PRIMARY_LEN};

use site_model::{Candidate, ScenarioMode};
use site_operations::TokenBudget;
use tracing::info;

/// Thresholds that flip a whole run to template-only explanations (spec
/// §4.O "Degraded mode").
pub const UNIQUENESS_MEAN_THRESHOLD: f64 = 0.3;
pub const UNIQUENESS_P5_THRESHOLD: f64 = 0.1;

/// A fingerprint of the numeric feature values a cache key is derived
/// from, stable across process restarts as long as the candidate's
/// features are unchanged.
pub fn features_fingerprint(candidate: &Candidate) -> String {
    format!(
        "{}:{:.6}:{:.6}:{:.6}",
        candidate.features.population,
        candidate.features.nearest_brand_km,
        candidate.features.competitor_density,
        candidate.scores.final_score
    )
}

/// Orchestrates the explanation tiers for one candidate: cache hit, then
/// remote (if supplied and the run is not already degraded), falling back
/// to the template on any miss or failure. Returns the explanation plus
/// whether it came from the template fallback path.
pub struct ExplanationService<'a> {
    cache: &'a ExplanationCache,
    remote: Option<&'a RemoteExplanationProvider>,
    budget: &'a TokenBudget,
    degraded: bool,
}

impl<'a> ExplanationService<'a> {
    pub fn new(cache: &'a ExplanationCache, remote: Option<&'a RemoteExplanationProvider>, budget: &'a TokenBudget, degraded: bool) -> Self {
        Self { cache, remote, budget, degraded }
    }

    pub async fn explain(&self, candidate: &Candidate, mode: ScenarioMode) -> Explanation {
        let key = CacheKey::new(&candidate.region_id, &features_fingerprint(candidate), mode);

        if let Some(cached) = self.cache.get(&key) {
            return cached;
        }

        let explanation = match (self.remote, self.degraded) {
            (Some(provider), false) => provider.generate_or_fallback(candidate, mode, self.budget).await,
            _ => {
                if self.degraded {
                    info!(id = %candidate.id, "run degraded to template-only explanations");
                }
                template_explanation(candidate, mode)
            }
        };

        self.cache.insert(key, explanation.clone());
        explanation
    }
}
