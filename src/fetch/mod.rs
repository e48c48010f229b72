//! Client-side fetch orchestration.
//!
//! `ProjectsFetcher` decides *when* to hit the same-origin API route:
//! visibility triggers are debounced, identical in-flight requests coalesce
//! into one network call, raw results live in a 15-minute cache, and a
//! process-wide gate suppresses traffic while the upstream rate limit is
//! exhausted. Every fetcher in the process shares one `FetchContext`.

pub mod cache;
pub mod coalesce;
pub mod rate_limit;
pub mod transport;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::constants::{DEFAULT_CLIENT_TTL_SECS, DEFAULT_DEBOUNCE_MS};
use crate::github::{RepoQuery, RepoSort, Repository, SortDirection};
use crate::projects::{Project, ProjectTransformer};

pub use cache::ClientCache;
pub use coalesce::{Acquired, RequestCoalescer};
pub use rate_limit::RateLimitGate;
pub use transport::{FetchError, HttpProjectsApi, ProjectsApi};

/// Settled result of one route call, shared with every coalesced waiter.
pub type FetchOutcome = Result<Arc<Vec<Repository>>, FetchError>;

/// What to fetch and how to filter the result.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub username: String,
    pub sort: RepoSort,
    pub direction: SortDirection,
    /// Keep only projects with at least this many stars.
    pub min_stars: Option<u32>,
    /// Drop forked repositories from the result.
    pub exclude_forks: bool,
}

impl FetchOptions {
    pub fn for_user(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            sort: RepoSort::default(),
            direction: SortDirection::default(),
            min_stars: None,
            exclude_forks: false,
        }
    }

    fn query(&self) -> RepoQuery {
        RepoQuery::new(self.username.clone(), self.sort, self.direction)
    }

    fn keeps(&self, project: &Project) -> bool {
        if self.exclude_forks && project.fork {
            return false;
        }
        match self.min_stars {
            Some(min) => project.stars >= min,
            None => true,
        }
    }
}

/// Dependencies shared by every fetcher in the process.
pub struct FetchContext {
    api: Arc<dyn ProjectsApi>,
    cache: ClientCache,
    coalescer: RequestCoalescer<FetchOutcome>,
    gate: RateLimitGate,
    transformer: ProjectTransformer,
    debounce: Duration,
    /// Set when the serving page already embedded fresh data; the first
    /// non-forced fetch in the process is skipped and this resets.
    server_prefetched: AtomicBool,
}

impl FetchContext {
    pub fn new(api: Arc<dyn ProjectsApi>) -> Arc<Self> {
        Self::builder(api).build()
    }

    pub fn builder(api: Arc<dyn ProjectsApi>) -> FetchContextBuilder {
        FetchContextBuilder {
            api,
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            client_ttl: Duration::from_secs(DEFAULT_CLIENT_TTL_SECS),
            server_prefetched: false,
        }
    }

    pub fn gate(&self) -> &RateLimitGate {
        &self.gate
    }

    pub fn cache(&self) -> &ClientCache {
        &self.cache
    }
}

pub struct FetchContextBuilder {
    api: Arc<dyn ProjectsApi>,
    debounce: Duration,
    client_ttl: Duration,
    server_prefetched: bool,
}

impl FetchContextBuilder {
    pub fn debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Take the client-side knobs (TTL, debounce) from the loaded
    /// configuration.
    pub fn cache_config(mut self, cache: &crate::config::CacheConfig) -> Self {
        self.client_ttl = Duration::from_secs(cache.client_ttl_seconds);
        self.debounce = Duration::from_millis(cache.debounce_ms);
        self
    }

    pub fn client_ttl(mut self, ttl: Duration) -> Self {
        self.client_ttl = ttl;
        self
    }

    pub fn server_prefetched(mut self, prefetched: bool) -> Self {
        self.server_prefetched = prefetched;
        self
    }

    pub fn build(self) -> Arc<FetchContext> {
        Arc::new(FetchContext {
            api: self.api,
            cache: ClientCache::new(self.client_ttl),
            coalescer: RequestCoalescer::new(),
            gate: RateLimitGate::new(),
            transformer: ProjectTransformer::new(),
            debounce: self.debounce,
            server_prefetched: AtomicBool::new(self.server_prefetched),
        })
    }
}

/// Observable state of one fetcher, as the caller sees it.
#[derive(Debug, Clone, Default)]
pub struct FetchState {
    pub projects: Vec<Project>,
    pub loading: bool,
    pub error: Option<String>,
}

struct FetcherInner {
    ctx: Arc<FetchContext>,
    options: FetchOptions,
    state: Mutex<FetchState>,
    attempted: AtomicBool,
    cancelled: AtomicBool,
    trigger_seq: AtomicU64,
}

impl FetcherInner {
    fn publish(&self, update: impl FnOnce(&mut FetchState)) {
        // A cancelled fetcher never mutates state, even if a fetch resolves
        // late.
        if self.cancelled.load(Ordering::SeqCst) {
            return;
        }
        update(&mut self.state.lock());
    }

    async fn fetch(&self, force: bool) {
        if self.cancelled.load(Ordering::SeqCst) {
            return;
        }

        // Data already embedded by the server; skip the very first fetch.
        if !force && self.ctx.server_prefetched.swap(false, Ordering::SeqCst) {
            self.attempted.store(true, Ordering::SeqCst);
            tracing::debug!(username = %self.options.username, "skipping fetch, server prefetched");
            return;
        }

        // Gated skip: no network call and no state change. The fetcher that
        // saw the 429 already carries the error.
        if self.ctx.gate.is_limited() {
            tracing::debug!("skipping fetch, rate limit gate closed");
            return;
        }

        let query = self.options.query();
        let key = query.to_query_string();

        if !force {
            if let Some(repos) = self.ctx.cache.get(&key, &query.username, Instant::now()) {
                self.attempted.store(true, Ordering::SeqCst);
                self.apply_success(&repos);
                return;
            }
        }

        if !self.attempted.load(Ordering::SeqCst) {
            self.publish(|state| state.loading = true);
        }

        let outcome = match self.ctx.coalescer.join_or_lead(&key).await {
            Acquired::Leader(guard) => {
                let result: FetchOutcome =
                    self.ctx.api.fetch_repos(&query).await.map(Arc::new);

                match &result {
                    Ok(repos) => {
                        self.ctx.gate.clear();
                        if !repos.is_empty() {
                            self.ctx.cache.insert(
                                &key,
                                &query.username,
                                Arc::clone(repos),
                                Instant::now(),
                            );
                        }
                    }
                    Err(FetchError::RateLimited { reset_at }) => {
                        self.ctx.gate.trip(*reset_at);
                    }
                    Err(_) => {}
                }

                guard.complete(result.clone());
                result
            }
            Acquired::Follower(outcome) => outcome,
        };

        self.attempted.store(true, Ordering::SeqCst);

        match outcome {
            Ok(repos) => self.apply_success(&repos),
            Err(err) => {
                tracing::warn!(username = %self.options.username, error = %err, "fetch failed");
                self.publish(|state| {
                    state.loading = false;
                    state.error = Some(err.to_string());
                });
            }
        }
    }

    fn apply_success(&self, repos: &[Repository]) {
        let transformed = self.ctx.transformer.transform(repos);
        let projects: Vec<Project> = transformed
            .iter()
            .filter(|p| self.options.keeps(p))
            .cloned()
            .collect();

        self.publish(|state| {
            state.projects = projects;
            state.loading = false;
            state.error = None;
        });
    }
}

/// One "hook instance": a view onto the shared context for a particular
/// username and filter set.
pub struct ProjectsFetcher {
    inner: Arc<FetcherInner>,
}

impl ProjectsFetcher {
    pub fn new(ctx: Arc<FetchContext>, options: FetchOptions) -> Self {
        Self {
            inner: Arc::new(FetcherInner {
                ctx,
                options,
                state: Mutex::new(FetchState::default()),
                attempted: AtomicBool::new(false),
                cancelled: AtomicBool::new(false),
                trigger_seq: AtomicU64::new(0),
            }),
        }
    }

    /// Signal that the consuming view became visible. The fetch runs after
    /// the debounce window; rapid repeated triggers collapse into the newest
    /// one.
    pub fn mark_visible(&self) {
        let seq = self.inner.trigger_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let weak = Arc::downgrade(&self.inner);
        let debounce = self.inner.ctx.debounce;

        tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if inner.cancelled.load(Ordering::SeqCst) {
                return;
            }
            // A newer trigger supersedes this one.
            if inner.trigger_seq.load(Ordering::SeqCst) != seq {
                return;
            }
            inner.fetch(false).await;
        });
    }

    /// Fetch now, bypassing the client cache. Still coalesces with identical
    /// in-flight requests and honors the rate-limit gate.
    pub async fn refetch(&self) {
        self.inner.fetch(true).await;
    }

    /// Fetch now through the normal path (cache first). Used where the
    /// debounce does not apply.
    pub async fn fetch(&self) {
        self.inner.fetch(false).await;
    }

    pub fn snapshot(&self) -> FetchState {
        self.inner.state.lock().clone()
    }

    /// Unmount guard: no state mutation happens after this returns.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
    }
}
