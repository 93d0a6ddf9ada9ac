//! Query cache
//!
//! Maps a [`Query`] to an in-flight or completed page fetch. At most one fetch
//! per distinct query runs at a time: concurrent requests for the same key
//! attach to the running computation and all observe its outcome.
//!
//! Consumers read a [`QueryState`] snapshot that distinguishes the first load
//! of a key (`is_loading`) from a refresh of a key whose value is already
//! known (`is_revalidating`), so stale content can stay on screen while it is
//! being refreshed.
//!
//! Failed entries are not negative-cached: the next request for the key runs
//! the fetcher again.

mod config;
mod entry;

pub use config::*;
pub use entry::EntryStatus;

use std::future::Future;
use std::sync::Arc;
use std::sync::Weak;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use chrono::Utc;
use dashmap::DashMap;
use futures::FutureExt;

use self::entry::Entry;
use self::entry::FetchOutcome;
use self::entry::SharedFetch;
use crate::error::Error;
use crate::page::PageResult;
use crate::query::Query;
use crate::response::CacheStatus;
use crate::response::Response;

/// Snapshot of a query's cache entry as seen by a consumer.
#[derive(Debug, Clone, Default)]
pub struct QueryState {
    /// The last settled value for this key, if any.
    pub data: Option<Arc<PageResult>>,
    /// A fetch is running and no value has settled yet.
    pub is_loading: bool,
    /// A fetch is running for a key that already has a value.
    pub is_revalidating: bool,
    /// The error of the last fetch, if it failed.
    pub error: Option<Arc<Error>>,
}

impl QueryState {
    /// Returns `true` if a fetch is running for this key.
    pub fn is_fetching(&self) -> bool {
        self.is_loading || self.is_revalidating
    }

    /// Returns `true` if the last fetch failed.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    fn from_entry(entry: &Entry) -> Self {
        let data = entry.value.as_ref().map(|(page, _)| Arc::clone(page));
        let in_flight = entry.is_in_flight();
        Self {
            is_loading: in_flight && data.is_none(),
            is_revalidating: in_flight && data.is_some(),
            error: entry.error.clone(),
            data,
        }
    }
}

enum Begin {
    Cached(FetchOutcome),
    Started(SharedFetch),
    Joined(SharedFetch),
}

/// Deduplicating cache of page fetches keyed by [`Query`].
///
/// The cache is cheap to clone (uses `Arc` internally); clones share entries.
/// Fetches are driven to completion by a task spawned on the current Tokio
/// runtime, so a fetch whose callers have moved on still fills its own entry.
///
/// The `fetcher` closures passed in are called synchronously while the key is
/// locked and must not access the cache themselves. The futures they return
/// may do anything.
///
/// # Example
///
/// ```ignore
/// use sheetgrid_lib::cache::QueryCache;
/// use sheetgrid_lib::Query;
///
/// let cache = QueryCache::new();
/// let query = Query::new(1, "");
///
/// let page = cache
///     .fetch(&query, || async move { service.fetch_page(&Query::new(1, "")).await })
///     .await?
///     .into_inner();
/// ```
#[derive(Clone, Default)]
pub struct QueryCache {
    inner: Arc<CacheInner>,
}

#[derive(Default)]
struct CacheInner {
    entries: DashMap<Query, Entry>,
    config: CacheConfig,
    clock: AtomicU64,
}

impl QueryCache {
    /// Creates an unbounded cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a cache with the given configuration.
    pub fn with_config(config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                entries: DashMap::new(),
                config,
                clock: AtomicU64::new(0),
            }),
        }
    }

    /// Returns the cache configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    // =========================================================================
    // Requests
    // =========================================================================

    /// Requests `query` and returns its current state without waiting.
    ///
    /// Starts a fetch when the key has never been requested or its last fetch
    /// failed. A settled key is served as is and an in-flight key is left to
    /// its running fetch.
    pub fn get<F, Fut>(&self, query: &Query, fetcher: F) -> QueryState
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<PageResult, Error>> + Send + 'static,
    {
        self.begin(query, fetcher, false);
        self.state(query)
    }

    /// Requests `query` and waits for its value.
    ///
    /// Concurrent calls for the same key share one fetch and receive the same
    /// value or the same error.
    pub async fn fetch<F, Fut>(
        &self,
        query: &Query,
        fetcher: F,
    ) -> Result<Response<Arc<PageResult>>, Arc<Error>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<PageResult, Error>> + Send + 'static,
    {
        match self.begin(query, fetcher, false) {
            Begin::Cached(outcome) => {
                outcome.map(|(page, at)| Response::new(page, CacheStatus::Hit, at))
            }
            Begin::Started(fetch) => fetch
                .await
                .map(|(page, at)| Response::new(page, CacheStatus::Miss, at)),
            Begin::Joined(fetch) => fetch
                .await
                .map(|(page, at)| Response::new(page, CacheStatus::Joined, at)),
        }
    }

    /// Recomputes `query` even if it has a settled value.
    ///
    /// The settled value stays visible while the new fetch runs, reported as
    /// `is_revalidating`. If a fetch is already running for the key, this
    /// attaches to it instead of starting another.
    pub fn revalidate<F, Fut>(&self, query: &Query, fetcher: F) -> QueryState
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<PageResult, Error>> + Send + 'static,
    {
        self.begin(query, fetcher, true);
        self.state(query)
    }

    /// Waits for the running fetch of `query`, if there is one.
    ///
    /// Returns `None` when nothing is in flight for the key.
    pub async fn settled(&self, query: &Query) -> Option<Result<Arc<PageResult>, Arc<Error>>> {
        let fetch = self
            .inner
            .entries
            .get(query)
            .and_then(|entry| entry.inflight.clone())?;
        Some(fetch.await.map(|(page, _)| page))
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Returns the state of `query` without starting a fetch.
    pub fn state(&self, query: &Query) -> QueryState {
        let tick = self.inner.tick();
        match self.inner.entries.get_mut(query) {
            Some(mut entry) => {
                entry.last_access = tick;
                QueryState::from_entry(&entry)
            }
            None => QueryState::default(),
        }
    }

    /// Returns the lifecycle status of `query`, if it has an entry.
    pub fn status(&self, query: &Query) -> Option<EntryStatus> {
        self.inner.entries.get(query).map(|entry| entry.status)
    }

    /// Returns `true` if the cache has an entry for `query`.
    pub fn contains(&self, query: &Query) -> bool {
        self.inner.entries.contains_key(query)
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    /// Returns `true` if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    // =========================================================================
    // Removal
    // =========================================================================

    /// Drops the entry for `query`. A running fetch completes but is ignored.
    pub fn invalidate(&self, query: &Query) -> bool {
        self.inner.entries.remove(query).is_some()
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.inner.entries.clear();
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn begin<F, Fut>(&self, query: &Query, fetcher: F, force: bool) -> Begin
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<PageResult, Error>> + Send + 'static,
    {
        let tick = self.inner.tick();
        let fetch = {
            let mut entry = self.inner.entries.entry(query.clone()).or_default();
            entry.last_access = tick;

            if let Some(running) = &entry.inflight {
                log::debug!("joining in-flight fetch for {}", query);
                return Begin::Joined(running.clone());
            }
            if !force
                && entry.status == EntryStatus::Settled
                && let Some(value) = &entry.value
            {
                log::debug!("cache hit for {}", query);
                return Begin::Cached(Ok(value.clone()));
            }

            entry.generation = tick;
            log::debug!(
                "starting fetch for {} (generation {}, revalidating: {})",
                query,
                entry.generation,
                entry.value.is_some()
            );
            let fetch = fetch_task(
                Arc::downgrade(&self.inner),
                query.clone(),
                entry.generation,
                fetcher(),
            );
            entry.start(fetch.clone());
            fetch
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let driver = fetch.clone();
                handle.spawn(async move {
                    let _ = driver.await;
                });
            }
            Err(_) => log::warn!("no Tokio runtime, fetch for {} only runs while awaited", query),
        }

        self.inner.evict(query);
        Begin::Started(fetch)
    }
}

impl CacheInner {
    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }

    fn settle(&self, query: &Query, generation: u64, outcome: &FetchOutcome) {
        let Some(mut entry) = self.entries.get_mut(query) else {
            log::debug!("discarding result for evicted entry {}", query);
            return;
        };
        if entry.generation != generation {
            log::debug!("discarding stale result for {} (generation {})", query, generation);
            return;
        }
        if let Err(err) = outcome {
            log::warn!("fetch for {} failed: {}", query, err);
        }
        entry.settle(outcome);
    }

    fn evict(&self, keep: &Query) {
        let Some(max) = self.config.max_entries else {
            return;
        };
        while self.entries.len() > max {
            let victim = self
                .entries
                .iter()
                .filter(|e| e.key() != keep && !e.value().is_in_flight())
                .min_by_key(|e| e.value().last_access)
                .map(|e| e.key().clone());
            let Some(victim) = victim else { break };
            log::debug!("evicting {}", victim);
            self.entries.remove(&victim);
        }
    }
}

fn fetch_task<Fut>(inner: Weak<CacheInner>, query: Query, generation: u64, fetch: Fut) -> SharedFetch
where
    Fut: Future<Output = Result<PageResult, Error>> + Send + 'static,
{
    async move {
        let outcome: FetchOutcome = match fetch.await {
            Ok(page) => Ok((Arc::new(page), Utc::now())),
            Err(err) => Err(Arc::new(err)),
        };
        if let Some(inner) = inner.upgrade() {
            inner.settle(&query, generation, &outcome);
        }
        outcome
    }
    .boxed()
    .shared()
}
