//! Client-side raw-result cache.
//!
//! Shorter-lived than the server cache. An entry is served only while it is
//! younger than the TTL and was recorded for the same username; a username
//! switch invalidates implicitly instead of serving another user's list.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::github::Repository;

#[derive(Debug, Clone)]
struct ClientEntry {
    repos: Arc<Vec<Repository>>,
    username: String,
    fetched_at: Instant,
}

/// Hit/miss counters for the client cache.
#[derive(Debug, Default)]
pub struct ClientCacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ClientCacheStats {
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}

/// TTL cache keyed by the route query string.
pub struct ClientCache {
    entries: Mutex<HashMap<String, ClientEntry>>,
    ttl: Duration,
    stats: ClientCacheStats,
}

impl ClientCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            stats: ClientCacheStats::default(),
        }
    }

    /// Look up a fresh entry for `key` recorded under `username`.
    ///
    /// Stale or username-mismatched entries count as misses and are evicted
    /// on the spot.
    pub fn get(&self, key: &str, username: &str, now: Instant) -> Option<Arc<Vec<Repository>>> {
        let mut entries = self.entries.lock();

        let fresh = match entries.get(key) {
            Some(entry) => {
                now.duration_since(entry.fetched_at) < self.ttl && entry.username == username
            }
            None => false,
        };

        if fresh {
            self.stats.hits.fetch_add(1, Ordering::Relaxed);
            return entries.get(key).map(|e| Arc::clone(&e.repos));
        }

        entries.remove(key);
        self.stats.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    pub fn insert(&self, key: &str, username: &str, repos: Arc<Vec<Repository>>, now: Instant) {
        self.entries.lock().insert(
            key.to_string(),
            ClientEntry {
                repos,
                username: username.to_string(),
                fetched_at: now,
            },
        );
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn stats(&self) -> &ClientCacheStats {
        &self.stats
    }
}
