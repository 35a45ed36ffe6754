//! OperationsService: concurrency, rate, token, timeout, and run-budget
//! enforcement plus derived health state.

pub mod budget;
pub mod concurrency;
pub mod health;
pub mod rate_limit;

pub use budget::{RunBudget, TokenBudget, DEFAULT_MAX_EXECUTION, DEFAULT_MEMORY_LIMIT_MB, DEFAULT_REQUEST_TIMEOUT, DEFAULT_TOKEN_BUDGET};
pub use concurrency::{ConcurrencyLimiter, ConcurrencyPermit, EXPLANATION_MAX_CONCURRENT, ISOCHRONE_MAX_CONCURRENT};
pub use health::{derive_health, should_degrade_to_template_only, HealthState, MetricsSnapshot};
pub use rate_limit::{RateLimiter, EXPLANATION_RATE_PER_MINUTE, ISOCHRONE_RATE_PER_MINUTE};

/// Bundles the limiters and budgets one run needs. Constructed once per
/// `LocationGenerator` invocation; `isochrone_*` fields gate `FeatureService`
/// calls during refinement, `explanation_*` gate `ExplanationService`.
pub struct OperationsContext {
    pub isochrone_concurrency: ConcurrencyLimiter,
    pub explanation_concurrency: ConcurrencyLimiter,
    pub isochrone_rate: RateLimiter,
    pub explanation_rate: RateLimiter,
    pub tokens: TokenBudget,
    pub run_budget: RunBudget,
}

impl Default for OperationsContext {
    fn default() -> Self {
        Self {
            isochrone_concurrency: ConcurrencyLimiter::new(ISOCHRONE_MAX_CONCURRENT),
            explanation_concurrency: ConcurrencyLimiter::new(EXPLANATION_MAX_CONCURRENT),
            isochrone_rate: RateLimiter::new(ISOCHRONE_RATE_PER_MINUTE),
            explanation_rate: RateLimiter::new(EXPLANATION_RATE_PER_MINUTE),
            tokens: TokenBudget::new(DEFAULT_TOKEN_BUDGET),
            run_budget: RunBudget::default(),
        }
    }
}

impl OperationsContext {
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            isochrone_in_flight: self.isochrone_concurrency.in_flight(),
            explanation_in_flight: self.explanation_concurrency.in_flight(),
            tokens_spent: self.tokens.spent(),
            tokens_remaining: self.tokens.remaining(),
            run_elapsed_ms: self.run_budget.elapsed().as_millis() as u64,
            rate_limit_denials: 0,
        }
    }

    pub fn health(&self) -> HealthState {
        derive_health(&self.snapshot(), ISOCHRONE_MAX_CONCURRENT, EXPLANATION_MAX_CONCURRENT, self.run_budget.max_execution_ms())
    }
}
