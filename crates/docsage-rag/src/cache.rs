//! TTL cache for retrieval results, shared across sessions

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tracing::debug;

use docsage_core::{Clock, Passage, Result};

/// Entry count at which `set` first sweeps expired entries
const SWEEP_THRESHOLD: usize = 1024;

#[derive(Debug, Clone)]
struct CacheEntry {
    results: Vec<Passage>,
    expires_at: DateTime<Utc>,
}

/// Retrieval results keyed by normalized query text.
///
/// Keys are not session-qualified. Expired entries are dropped when read;
/// [`ResultCache::purge_expired`] sweeps them eagerly.
pub struct ResultCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    inflight: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
    ttl: chrono::Duration,
    clock: Arc<dyn Clock>,
    hits: AtomicU64,
    misses: AtomicU64,
    sweep_at: AtomicUsize,
}

impl ResultCache {
    /// Create a new cache whose entries live for `ttl`
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            inflight: Mutex::new(HashMap::new()),
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX),
            clock,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            sweep_at: AtomicUsize::new(SWEEP_THRESHOLD),
        }
    }

    /// Look up a key, counting the access as a hit or a miss
    pub fn get(&self, key: &str) -> Option<Vec<Passage>> {
        let found = self.lookup(key);
        self.record(found.is_some());
        found
    }

    /// Store results under a key, replacing any previous entry
    pub fn set(&self, key: &str, results: Vec<Passage>) {
        let expires_at = self
            .clock
            .now()
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(
            key.to_string(),
            CacheEntry {
                results,
                expires_at,
            },
        );

        // Sweep once the map doubles past the live size seen at the last sweep.
        if entries.len() >= self.sweep_at.load(Ordering::Relaxed) {
            let now = self.clock.now();
            let before = entries.len();
            entries.retain(|_, entry| entry.expires_at > now);
            let live = entries.len();
            self.sweep_at.store((live * 2).max(SWEEP_THRESHOLD), Ordering::Relaxed);
            debug!(removed = before - live, live, "swept expired cache entries");
        }
    }

    /// Return cached results or run `fetch` to populate the entry.
    ///
    /// Concurrent callers missing on the same key wait for a single fetch and
    /// then read its result. Errors from `fetch` are returned and nothing is cached.
    /// The boolean is `true` when the results came from the cache.
    pub async fn get_or_fetch<F, Fut>(&self, key: &str, fetch: F) -> Result<(Vec<Passage>, bool)>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Passage>>>,
    {
        if let Some(results) = self.lookup(key) {
            self.record(true);
            return Ok((results, true));
        }

        let key_lock = self.key_lock(key);
        let outcome = {
            let _guard = key_lock.lock().await;
            match self.lookup(key) {
                Some(results) => Ok((results, true)),
                None => fetch().await.map(|results| {
                    self.set(key, results.clone());
                    (results, false)
                }),
            }
        };
        self.release_key_lock(key, key_lock);

        self.record(matches!(outcome, Ok((_, true))));
        outcome
    }

    /// Drop every expired entry, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    /// Fraction of lookups served from the cache, 0.0 before any lookup
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.write().unwrap_or_else(|e| e.into_inner()).clear();
    }

    fn lookup(&self, key: &str) -> Option<Vec<Passage>> {
        let now = self.clock.now();
        {
            let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
            match entries.get(key) {
                None => return None,
                Some(entry) if entry.expires_at > now => return Some(entry.results.clone()),
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        // Another writer may have refreshed the entry between the two locks.
        if entries.get(key).is_some_and(|entry| entry.expires_at <= now) {
            entries.remove(key);
            debug!(key, "cache entry expired");
        }
        None
    }

    fn record(&self, hit: bool) {
        if hit {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn key_lock(&self, key: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut inflight = self.inflight.lock().unwrap_or_else(|e| e.into_inner());
        inflight
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    fn release_key_lock(&self, key: &str, key_lock: Arc<tokio::sync::Mutex<()>>) {
        let mut inflight = self.inflight.lock().unwrap_or_else(|e| e.into_inner());
        // One reference in the map and one held here means nobody else is waiting.
        if Arc::strong_count(&key_lock) <= 2 {
            inflight.remove(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use docsage_core::{Error, ManualClock};
    use std::sync::atomic::AtomicUsize;

    fn passage(id: &str) -> Passage {
        Passage {
            id: id.to_string(),
            text: format!("text of {}", id),
            source_title: "Title".to_string(),
            source_locator: "https://example.com".to_string(),
            position_index: 0,
            total_segments: 1,
            indexed_at: None,
            similarity_score: Some(0.9),
        }
    }

    fn manual_clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()))
    }

    #[test]
    fn test_set_then_get_returns_value() {
        let cache = ResultCache::new(Duration::from_secs(3600), manual_clock());
        cache.set("what is gitlab?", vec![passage("a")]);
        assert_eq!(cache.get("what is gitlab?"), Some(vec![passage("a")]));
    }

    #[test]
    fn test_entry_expires_after_ttl() {
        let clock = manual_clock();
        let cache = ResultCache::new(Duration::from_secs(3600), clock.clone());
        cache.set("q", vec![passage("a")]);

        clock.advance(chrono::Duration::seconds(3599));
        assert!(cache.get("q").is_some());

        clock.advance(chrono::Duration::seconds(1));
        assert!(cache.get("q").is_none());
        assert!(cache.is_empty(), "expired entry should be removed on read");
    }

    #[test]
    fn test_hit_rate() {
        let cache = ResultCache::new(Duration::from_secs(60), manual_clock());
        assert_eq!(cache.hit_rate(), 0.0);
        cache.set("q", vec![]);
        cache.get("q");
        cache.get("missing");
        assert_eq!(cache.hit_rate(), 0.5);
    }

    #[test]
    fn test_purge_expired() {
        let clock = manual_clock();
        let cache = ResultCache::new(Duration::from_secs(10), clock.clone());
        cache.set("old", vec![]);
        clock.advance(chrono::Duration::seconds(11));
        cache.set("fresh", vec![]);
        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_get_or_fetch_single_flight() {
        let cache = ResultCache::new(Duration::from_secs(60), manual_clock());
        let calls = AtomicUsize::new(0);
        let counter = &calls;

        let fetch = move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            Ok(vec![passage("a")])
        };

        let (first, second) = tokio::join!(
            cache.get_or_fetch("same", fetch),
            cache.get_or_fetch("same", fetch)
        );

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let hits = [first.unwrap().1, second.unwrap().1];
        assert_eq!(hits.iter().filter(|hit| **hit).count(), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let cache = ResultCache::new(Duration::from_secs(60), manual_clock());
        let result = cache
            .get_or_fetch("q", || async { Err(Error::Retrieval("index down".into())) })
            .await;
        assert!(result.is_err());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_failed_fetch_counts_as_miss() {
        let cache = ResultCache::new(Duration::from_secs(60), manual_clock());
        cache.set("x", vec![passage("a")]);
        assert!(cache.get("x").is_some());

        let result = cache
            .get_or_fetch("y", || async { Err(Error::Retrieval("index down".into())) })
            .await;

        assert!(result.is_err());
        assert_eq!(cache.hit_rate(), 0.5);
    }

    #[test]
    fn test_set_sweeps_expired_entries_past_threshold() {
        let clock = manual_clock();
        let cache = ResultCache::new(Duration::from_secs(10), clock.clone());
        cache.sweep_at.store(3, Ordering::Relaxed);

        cache.set("old-1", vec![]);
        cache.set("old-2", vec![]);
        clock.advance(chrono::Duration::seconds(11));
        cache.set("fresh", vec![]);

        assert_eq!(cache.len(), 1);
        assert!(cache.get("fresh").is_some());
    }
}
