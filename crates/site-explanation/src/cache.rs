//! TTL explanation cache, keyed by `(country-code hash, features hash,
//! mode, version)`.

use crate::template::Explanation;
use site_model::ScenarioMode;
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Default cache entry lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Bumped whenever the explanation shape or formula changes, so stale
/// entries from a prior version never leak into a new one.
pub const CACHE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    country_code_hash: u64,
    features_hash: u64,
    mode: ExplanationModeKey,
    version: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ExplanationModeKey {
    Defend,
    Balanced,
    Blitz,
}

impl From<ScenarioMode> for ExplanationModeKey {
    fn from(mode: ScenarioMode) -> Self {
        match mode {
            ScenarioMode::Defend => ExplanationModeKey::Defend,
            ScenarioMode::Balanced => ExplanationModeKey::Balanced,
            ScenarioMode::Blitz => ExplanationModeKey::Blitz,
        }
    }
}

impl CacheKey {
    pub fn new(country_code: &str, features_fingerprint: &str, mode: ScenarioMode) -> Self {
        Self {
            country_code_hash: hash_str(country_code),
            features_hash: hash_str(features_fingerprint),
            mode: mode.into(),
            version: CACHE_VERSION,
        }
    }
}

fn hash_str(s: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    s.hash(&mut hasher);
    hasher.finish()
}

struct Entry {
    value: Explanation,
    inserted_at: Instant,
}

/// Process-scoped TTL cache. Eviction is lazy: a read past its TTL is
/// treated as a miss and the stale entry is dropped; nothing runs on a
/// timer. Single-writer via an internal mutex, short critical sections
/// only.
pub struct ExplanationCache {
    ttl: Duration,
    entries: Mutex<HashMap<CacheKey, Entry>>,
}

impl ExplanationCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: Mutex::new(HashMap::new()) }
    }

    pub fn get(&self, key: &CacheKey) -> Option<Explanation> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some(entry) if entry.inserted_at.elapsed() <= self.ttl => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: CacheKey, value: Explanation) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(key, Entry { value, inserted_at: Instant::now() });
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ExplanationCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::ExplanationConfidence;

    fn explanation() -> Explanation {
        Explanation {
            primary_reason: "test".to_string(),
            risks: vec![],
            actions: vec![],
            confidence: ExplanationConfidence::High,
        }
    }

    #[test]
    fn miss_then_hit_after_insert() {
        let cache = ExplanationCache::new(DEFAULT_TTL);
        let key = CacheKey::new("XX", "f1", ScenarioMode::Balanced);
        assert!(cache.get(&key).is_none());
        cache.insert(key.clone(), explanation());
        assert!(cache.get(&key).is_some());
    }

    #[test]
    fn expired_entry_is_evicted_on_read() {
        let cache = ExplanationCache::new(Duration::from_millis(1));
        let key = CacheKey::new("XX", "f1", ScenarioMode::Balanced);
        cache.insert(key.clone(), explanation());
        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.get(&key).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn different_modes_are_different_keys() {
        let a = CacheKey::new("XX", "f1", ScenarioMode::Balanced);
        let b = CacheKey::new("XX", "f1", ScenarioMode::Blitz);
        assert_ne!(a, b);
    }
}
