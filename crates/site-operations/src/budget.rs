//! Token budget, per-request timeout, and whole-run execution budget.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Default per-run explanation token budget.
pub const DEFAULT_TOKEN_BUDGET: u64 = 20_000;
/// Default per-request wall-clock timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Default whole-run wall-clock budget.
pub const DEFAULT_MAX_EXECUTION: Duration = Duration::from_secs(10 * 60);
/// Default whole-run memory budget, in megabytes (advisory only — nothing
/// in this process enforces memory directly; `RunBudget::memory_ok`
/// exists for callers that can sample RSS via the OS).
pub const DEFAULT_MEMORY_LIMIT_MB: u64 = 2048;

/// Tracks tokens spent against a per-run budget. An admission check runs
/// before every explanation call.
pub struct TokenBudget {
    limit: u64,
    spent: AtomicU64,
}

impl TokenBudget {
    pub fn new(limit: u64) -> Self {
        Self { limit, spent: AtomicU64::new(0) }
    }

    pub fn spent(&self) -> u64 {
        self.spent.load(Ordering::Acquire)
    }

    pub fn remaining(&self) -> u64 {
        self.limit.saturating_sub(self.spent())
    }

    /// True if `cost` more tokens would still fit the budget; does not
    /// reserve them — call `spend` once the call actually completes.
    pub fn can_afford(&self, cost: u64) -> bool {
        self.spent() + cost <= self.limit
    }

    pub fn spend(&self, cost: u64) {
        self.spent.fetch_add(cost, Ordering::AcqRel);
    }
}

/// Wall-clock and (advisory) memory budget for one run.
pub struct RunBudget {
    started_at: Instant,
    max_execution: Duration,
    memory_limit_mb: u64,
}

impl RunBudget {
    pub fn new(max_execution: Duration, memory_limit_mb: u64) -> Self {
        Self { started_at: Instant::now(), max_execution, memory_limit_mb }
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn exceeded(&self) -> bool {
        self.elapsed() > self.max_execution
    }

    pub fn max_execution_ms(&self) -> u64 {
        self.max_execution.as_millis() as u64
    }

    /// `current_mb` is supplied by the caller (e.g. sampled RSS); this
    /// crate has no OS-level memory introspection of its own.
    pub fn memory_ok(&self, current_mb: u64) -> bool {
        current_mb <= self.memory_limit_mb
    }
}

impl Default for RunBudget {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_EXECUTION, DEFAULT_MEMORY_LIMIT_MB)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_budget_denies_once_exhausted() {
        let budget = TokenBudget::new(100);
        assert!(budget.can_afford(100));
        budget.spend(100);
        assert!(!budget.can_afford(1));
        assert_eq!(budget.remaining(), 0);
    }

    #[test]
    fn run_budget_not_exceeded_immediately() {
        let budget = RunBudget::new(Duration::from_secs(60), 1024);
        assert!(!budget.exceeded());
        assert!(budget.memory_ok(512));
        assert!(!budget.memory_ok(2048));
    }
}
