//! Health state derivation and the per-run metrics snapshot.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthState {
    Healthy,
    Degraded,
    Critical,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub isochrone_in_flight: usize,
    pub explanation_in_flight: usize,
    pub tokens_spent: u64,
    pub tokens_remaining: u64,
    pub run_elapsed_ms: u64,
    pub rate_limit_denials: u64,
}

/// Derives a health state from live metrics: critical if the run budget is
/// effectively exhausted or the token budget is fully spent; degraded if
/// either concurrency limiter is near its ceiling or denials are
/// occurring; healthy otherwise.
pub fn derive_health(
    snapshot: &MetricsSnapshot,
    isochrone_ceiling: usize,
    explanation_ceiling: usize,
    run_budget_ms: u64,
) -> HealthState {
    if snapshot.tokens_remaining == 0 || snapshot.run_elapsed_ms >= run_budget_ms {
        return HealthState::Critical;
    }
    let isochrone_near_ceiling = isochrone_ceiling > 0 && snapshot.isochrone_in_flight * 10 >= isochrone_ceiling * 8;
    let explanation_near_ceiling = explanation_ceiling > 0 && snapshot.explanation_in_flight * 10 >= explanation_ceiling * 8;
    if isochrone_near_ceiling || explanation_near_ceiling || snapshot.rate_limit_denials > 0 {
        return HealthState::Degraded;
    }
    HealthState::Healthy
}

/// Uniqueness-score thresholds that force the whole run into template-only
/// explanations.
pub const UNIQUENESS_MEAN_THRESHOLD: f64 = 0.3;
pub const UNIQUENESS_P5_THRESHOLD: f64 = 0.1;

/// True if the explanation cache being unavailable, or the rationale
/// uniqueness distribution failing either threshold, should flip the whole
/// run to template-only explanations.
pub fn should_degrade_to_template_only(cache_available: bool, uniqueness_mean: f64, uniqueness_p5: f64) -> bool {
    !cache_available || uniqueness_mean < UNIQUENESS_MEAN_THRESHOLD || uniqueness_p5 < UNIQUENESS_P5_THRESHOLD
}
