//! Data session: the consumer-facing view of the cache.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::cache::QueryCache;
use crate::cache::QueryState;
use crate::error::Error;
use crate::filter_input::FilterInput;
use crate::page::PageResult;
use crate::query::Query;
use crate::response::Response;
use crate::service::PageSource;

/// Capabilities granted by the surrounding application.
///
/// The data session never consults global state to decide whether it may
/// run; the host checks its login gate once and passes the outcome in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionContext {
    authenticated: bool,
}

impl SessionContext {
    /// Creates a context with the given authentication state.
    pub fn new(authenticated: bool) -> Self {
        Self { authenticated }
    }

    /// Context for a host that has passed its login gate.
    pub fn authenticated() -> Self {
        Self::new(true)
    }

    /// Context for a host that has not.
    pub fn anonymous() -> Self {
        Self::new(false)
    }

    /// Returns `true` if the host reported an authenticated user.
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }
}

/// A settled fetch tagged with the query it was made for.
#[derive(Debug)]
pub struct Loaded {
    /// The query that was fetched.
    pub query: Query,
    /// The fetch outcome.
    pub result: Result<Response<Arc<PageResult>>, Arc<Error>>,
}

/// Tracks the active query of one table view and routes fetches through the
/// cache.
///
/// Fetching is split into [`load`](Self::load), which produces a detached
/// future, and [`apply`](Self::apply), which accepts its outcome only if the
/// query is still the active one. A slow page that finishes after the user
/// moved on fills its own cache entry but never replaces what is displayed.
pub struct DataSession {
    cache: QueryCache,
    source: Arc<dyn PageSource>,
    active: Query,
    filter: FilterInput,
    total_pages: Option<i64>,
}

impl DataSession {
    /// Creates a session on page 1 with no filter.
    ///
    /// Fails with [`Error::Unauthenticated`] unless `context` is authenticated.
    pub fn new(context: SessionContext, source: Arc<dyn PageSource>) -> Result<Self, Error> {
        if !context.is_authenticated() {
            return Err(Error::Unauthenticated);
        }
        Ok(Self {
            cache: QueryCache::new(),
            source,
            active: Query::default(),
            filter: FilterInput::new(),
            total_pages: None,
        })
    }

    /// Uses the given cache, e.g. one shared with other views.
    pub fn with_cache(mut self, cache: QueryCache) -> Self {
        self.cache = cache;
        self
    }

    /// Uses the given filter input (to change the debounce delay).
    pub fn with_filter_input(mut self, filter: FilterInput) -> Self {
        self.filter = filter;
        self
    }

    /// Returns the active query.
    pub fn active(&self) -> &Query {
        &self.active
    }

    /// Returns the cache.
    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Returns the filter input.
    pub fn filter_input(&self) -> &FilterInput {
        &self.filter
    }

    /// Returns the page count of the active filter, once known.
    pub fn total_pages(&self) -> Option<i64> {
        self.total_pages
    }

    // =========================================================================
    // Fetching
    // =========================================================================

    /// Returns the cache state of the active query without fetching.
    pub fn state(&self) -> QueryState {
        self.cache.state(&self.active)
    }

    /// Makes sure the active query is loaded or loading and returns its state.
    pub fn request(&self) -> QueryState {
        let query = self.active.clone();
        self.cache.get(&query, self.fetcher(&query))
    }

    /// Recomputes the active query, keeping its current value visible.
    pub fn refresh(&self) -> QueryState {
        let query = self.active.clone();
        self.cache.revalidate(&query, self.fetcher(&query))
    }

    /// Returns a future resolving to the active query's outcome.
    ///
    /// The future does not borrow the session, so it can be spawned while the
    /// user keeps navigating.
    pub fn load(&self) -> impl Future<Output = Loaded> + Send + 'static {
        let cache = self.cache.clone();
        let query = self.active.clone();
        let fetcher = self.fetcher(&query);
        async move {
            let result = cache.fetch(&query, fetcher).await;
            Loaded { query, result }
        }
    }

    /// Accepts a settled fetch if it is for the active query.
    ///
    /// Returns `None` for outcomes of queries that are no longer active.
    pub fn apply(&mut self, loaded: Loaded) -> Option<Result<Arc<PageResult>, Arc<Error>>> {
        if loaded.query != self.active {
            log::debug!("ignoring result for inactive query {}", loaded.query);
            return None;
        }
        let result = loaded.result.map(Response::into_inner);
        if let Ok(page) = &result {
            self.total_pages = Some(page.total_pages);
        }
        Some(result)
    }

    /// Fetches the active query and records its page count.
    pub async fn load_active(&mut self) -> Result<Arc<PageResult>, Arc<Error>> {
        let query = self.active.clone();
        let page = self.cache.fetch(&query, self.fetcher(&query)).await?.into_inner();
        self.total_pages = Some(page.total_pages);
        Ok(page)
    }

    fn fetcher(
        &self,
        query: &Query,
    ) -> impl FnOnce() -> BoxFuture<'static, Result<PageResult, Error>> + Send + 'static + use<>
    {
        let source = Arc::clone(&self.source);
        let query = query.clone();
        move || async move { source.fetch_page(&query).await }.boxed()
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Switches to `page` (values below 1 become 1). Returns `true` if the
    /// active query changed.
    pub fn set_page(&mut self, page: i64) -> bool {
        let page = page.max(1);
        if page == self.active.page {
            return false;
        }
        self.active = self.active.with_page(page);
        true
    }

    /// Moves to the next page if one is known to exist.
    pub fn next_page(&mut self) -> bool {
        match self.total_pages {
            Some(total) if self.active.page < total => self.set_page(self.active.page + 1),
            _ => false,
        }
    }

    /// Moves to the previous page, stopping at page 1.
    pub fn prev_page(&mut self) -> bool {
        self.set_page(self.active.page - 1)
    }

    /// Records a keystroke in the filter box.
    pub fn type_filter(&mut self, text: impl Into<String>, now: Instant) {
        self.filter.edit(text, now);
    }

    /// Commits a settled filter edit. A new filter starts again at page 1.
    ///
    /// Returns `true` if the active query changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.filter.poll(now) {
            Some(filter) => {
                self.switch_filter(filter);
                true
            }
            None => false,
        }
    }

    /// Commits the filter draft immediately.
    pub fn commit_filter(&mut self) -> bool {
        match self.filter.commit_now() {
            Some(filter) => {
                self.switch_filter(filter);
                true
            }
            None => false,
        }
    }

    fn switch_filter(&mut self, filter: String) {
        log::debug!("filter committed: {:?}", filter);
        self.active = Query::new(1, filter);
        self.total_pages = None;
    }
}
