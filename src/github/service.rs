//! Repository fetch service with a TTL cache in front of the upstream client.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use super::client::RepoSource;
use super::error::GitHubError;
use super::types::{RepoQuery, Repository};
use crate::projects::{Project, ProjectTransformer};

/// Hit/miss counters for the repository cache. Lock-free; safe to read from
/// any task.
#[derive(Debug, Default)]
pub struct RepoCacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl RepoCacheStats {
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits();
        let total = hits + self.misses();
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}

/// Serves repository lists out of a TTL cache, falling back to the upstream
/// source on a miss. Errors are never cached: a failed fetch leaves the entry
/// absent so the next request retries upstream.
pub struct RepoService {
    source: Arc<dyn RepoSource>,
    cache: Cache<RepoQuery, Arc<Vec<Repository>>>,
    transformer: ProjectTransformer,
    stats: Arc<RepoCacheStats>,
}

impl RepoService {
    pub fn new(source: Arc<dyn RepoSource>, ttl: Duration, capacity: u64) -> Self {
        let cache = Cache::builder()
            .time_to_live(ttl)
            .max_capacity(capacity)
            .build();

        Self {
            source,
            cache,
            transformer: ProjectTransformer::new(),
            stats: Arc::new(RepoCacheStats::default()),
        }
    }

    /// Fetch the repository list for a query, serving from cache when the
    /// entry is younger than the TTL.
    pub async fn fetch_repositories(
        &self,
        query: &RepoQuery,
    ) -> Result<Arc<Vec<Repository>>, GitHubError> {
        if let Some(cached) = self.cache.get(query).await {
            self.stats.record_hit();
            tracing::debug!(username = %query.username, "repository cache hit");
            return Ok(cached);
        }

        self.stats.record_miss();
        tracing::debug!(username = %query.username, "repository cache miss, fetching upstream");

        let repos = Arc::new(self.source.list_repositories(query).await?);
        self.cache.insert(query.clone(), Arc::clone(&repos)).await;
        Ok(repos)
    }

    /// Derive display projects from a repository list. Memoized per distinct
    /// repository set; see `ProjectTransformer`.
    pub fn transform_to_projects(&self, repos: &[Repository]) -> Arc<Vec<Project>> {
        self.transformer.transform(repos)
    }

    /// Drop every cached repository list and the transformer memo. The next
    /// request for any query goes upstream.
    pub fn clear_caches(&self) {
        self.cache.invalidate_all();
        self.transformer.clear();
        tracing::info!("repository caches cleared");
    }

    pub fn stats(&self) -> Arc<RepoCacheStats> {
        Arc::clone(&self.stats)
    }
}
