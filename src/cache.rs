use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};

use tracing::{debug, info};

/// Default lifetime of a cached dataset (24 hours).
pub const DEFAULT_TTL: Duration = Duration::from_secs(86_400);

/// Source of the current time, injected into the cache.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant { Instant::now() }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    start: Instant,
    elapsed: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self { Self { start: Instant::now(), elapsed: Mutex::new(Duration::ZERO) } }

    pub fn advance(&self, by: Duration) {
        *self.elapsed.lock().unwrap_or_else(|e| e.into_inner()) += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self { Self::new() }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + *self.elapsed.lock().unwrap_or_else(|e| e.into_inner())
    }
}

struct CacheEntry<V> {
    value: V,
    created: Instant,
}

/// Memoizes parameterless computations by key for a fixed time-to-live.
///
/// An entry is served while `now - created < ttl`; after that the next access
/// recomputes it. Errors are returned to the caller and never stored. The
/// computation runs without holding the lock, so two callers racing on a cold
/// key may both compute; the last one to finish wins.
pub struct Cache<V> {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
}

impl<V: Clone> Cache<V> {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self { ttl, clock, entries: Mutex::new(HashMap::new()) }
    }

    pub fn ttl(&self) -> Duration { self.ttl }

    /// Cached value for `key` if still fresh, otherwise the result of `compute` (stored on success).
    pub fn get_or_try_insert_with<E>(&self, key: &str, compute: impl FnOnce() -> Result<V, E>) -> Result<V, E> {
        let now = self.clock.now();
        if let Some(entry) = self.lock().get(key) {
            if now.duration_since(entry.created) < self.ttl {
                debug!(key, "cache hit");
                return Ok(entry.value.clone());
            }
            debug!(key, "cache entry expired");
        }

        info!(key, "cache miss, computing");
        let value = compute()?;
        let created = self.clock.now();
        self.lock().insert(key.to_string(), CacheEntry { value: value.clone(), created });
        Ok(value)
    }

    /// Whether a fresh entry exists for `key`.
    pub fn contains(&self, key: &str) -> bool {
        let now = self.clock.now();
        self.lock().get(key).is_some_and(|e| now.duration_since(e.created) < self.ttl)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<V>>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn cache(clock: &Arc<ManualClock>) -> Cache<Arc<String>> {
        Cache::new(DEFAULT_TTL, clock.clone())
    }

    #[test]
    fn serves_identical_value_within_ttl() {
        let clock = Arc::new(ManualClock::new());
        let cache = cache(&clock);
        let calls = Cell::new(0);
        let compute = || { calls.set(calls.get() + 1); Ok::<_, ()>(Arc::new("ports".to_string())) };

        let first = cache.get_or_try_insert_with("ports", compute).unwrap();
        clock.advance(DEFAULT_TTL - Duration::from_secs(1));
        let second = cache.get_or_try_insert_with("ports", compute).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn recomputes_once_after_ttl() {
        let clock = Arc::new(ManualClock::new());
        let cache = cache(&clock);
        let calls = Cell::new(0);
        let compute = || { calls.set(calls.get() + 1); Ok::<_, ()>(Arc::new(format!("v{}", calls.get()))) };

        let first = cache.get_or_try_insert_with("windmills", compute).unwrap();
        clock.advance(DEFAULT_TTL);
        assert!(!cache.contains("windmills"));
        let second = cache.get_or_try_insert_with("windmills", compute).unwrap();
        let third = cache.get_or_try_insert_with("windmills", compute).unwrap();

        assert_eq!(calls.get(), 2);
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&second, &third));
    }

    #[test]
    fn errors_are_not_cached() {
        let clock = Arc::new(ManualClock::new());
        let cache = cache(&clock);

        let err = cache.get_or_try_insert_with("natura2000", || Err("503"));
        assert_eq!(err, Err("503"));
        assert!(!cache.contains("natura2000"));

        let ok = cache.get_or_try_insert_with("natura2000", || Ok::<_, &str>(Arc::new("zsc".to_string())));
        assert_eq!(ok.unwrap().as_str(), "zsc");
    }

    #[test]
    fn keys_are_independent() {
        let clock = Arc::new(ManualClock::new());
        let cache = cache(&clock);
        let a = cache.get_or_try_insert_with("ports", || Ok::<_, ()>(Arc::new("a".to_string()))).unwrap();
        let b = cache.get_or_try_insert_with("windmills", || Ok::<_, ()>(Arc::new("b".to_string()))).unwrap();
        assert_ne!(a, b);
    }
}
