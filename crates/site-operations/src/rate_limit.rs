//! Per-service token-bucket rate limiting.

use std::sync::Mutex;
use std::time::{Duration, Instant};

struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

/// A token bucket refilling at `rate_per_minute`, capped at that same
/// burst size. `try_acquire` is advisory — on denial it returns the wait
/// time until the next token would be available rather than blocking.
pub struct RateLimiter {
    rate_per_minute: f64,
    capacity: f64,
    state: Mutex<BucketState>,
}

impl RateLimiter {
    pub fn new(rate_per_minute: f64) -> Self {
        Self {
            rate_per_minute,
            capacity: rate_per_minute,
            state: Mutex::new(BucketState { tokens: rate_per_minute, last_refill: Instant::now() }),
        }
    }

    fn refill(&self, state: &mut BucketState) {
        let now = Instant::now();
        let elapsed = now.duration_since(state.last_refill).as_secs_f64();
        let refilled = elapsed * (self.rate_per_minute / 60.0);
        state.tokens = (state.tokens + refilled).min(self.capacity);
        state.last_refill = now;
    }

    /// `Ok(())` on admission; `Err(wait)` with the advisory wait duration
    /// until a token would next be available.
    pub fn try_acquire(&self) -> Result<(), Duration> {
        let mut state = self.state.lock().expect("rate limiter mutex poisoned");
        self.refill(&mut state);
        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            Ok(())
        } else {
            let tokens_needed = 1.0 - state.tokens;
            let seconds = tokens_needed / (self.rate_per_minute / 60.0);
            Err(Duration::from_secs_f64(seconds.max(0.0)))
        }
    }
}

/// Isochrone calls: at most 300 per minute.
pub const ISOCHRONE_RATE_PER_MINUTE: f64 = 300.0;
/// Explanation calls: at most 60 per minute.
pub const EXPLANATION_RATE_PER_MINUTE: f64 = 60.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denies_once_bucket_is_empty() {
        let limiter = RateLimiter::new(1.0);
        assert!(limiter.try_acquire().is_ok());
        assert!(limiter.try_acquire().is_err());
    }

    #[test]
    fn wait_time_is_positive_on_denial() {
        let limiter = RateLimiter::new(60.0);
        for _ in 0..60 {
            let _ = limiter.try_acquire();
        }
        match limiter.try_acquire() {
            Err(wait) => assert!(wait.as_secs_f64() > 0.0),
            Ok(()) => panic!("expected denial with an exhausted bucket"),
        }
    }
}
