//! In-flight concurrency admission.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Tracks in-flight calls against a configured ceiling. `acquire` returns
/// `None` (admission denied) rather than blocking — callers decide whether
/// to wait, retry, or fall back.
pub struct ConcurrencyLimiter {
    max_in_flight: usize,
    in_flight: AtomicUsize,
}

/// RAII guard: dropping it releases the slot.
pub struct ConcurrencyPermit<'a> {
    limiter: &'a ConcurrencyLimiter,
}

impl Drop for ConcurrencyPermit<'_> {
    fn drop(&mut self) {
        self.limiter.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

impl ConcurrencyLimiter {
    pub fn new(max_in_flight: usize) -> Self {
        Self { max_in_flight, in_flight: AtomicUsize::new(0) }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn acquire(&self) -> Option<ConcurrencyPermit<'_>> {
        let mut current = self.in_flight.load(Ordering::Acquire);
        loop {
            if current >= self.max_in_flight {
                return None;
            }
            match self.in_flight.compare_exchange_weak(current, current + 1, Ordering::AcqRel, Ordering::Acquire) {
                Ok(_) => return Some(ConcurrencyPermit { limiter: self }),
                Err(observed) => current = observed,
            }
        }
    }
}

/// Isochrone calls admit at most 10 concurrently.
pub const ISOCHRONE_MAX_CONCURRENT: usize = 10;
/// Explanation calls admit at most 5 concurrently.
pub const EXPLANATION_MAX_CONCURRENT: usize = 5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denies_admission_past_the_ceiling() {
        let limiter = ConcurrencyLimiter::new(1);
        let first = limiter.acquire();
        assert!(first.is_some());
        assert!(limiter.acquire().is_none());
        drop(first);
        assert!(limiter.acquire().is_some());
    }

    #[test]
    fn releases_slot_on_drop() {
        let limiter = ConcurrencyLimiter::new(2);
        assert_eq!(limiter.in_flight(), 0);
        let permit = limiter.acquire().unwrap();
        assert_eq!(limiter.in_flight(), 1);
        drop(permit);
        assert_eq!(limiter.in_flight(), 0);
    }
}
