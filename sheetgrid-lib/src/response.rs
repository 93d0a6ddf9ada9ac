//! Cache-annotated results

use chrono::DateTime;
use chrono::Utc;

/// How the query cache produced a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheStatus {
    /// The caller started the fetch.
    Miss,
    /// The caller attached to a fetch someone else started.
    Joined,
    /// A settled value was returned without fetching.
    Hit,
}

impl CacheStatus {
    pub fn is_hit(self) -> bool {
        self == Self::Hit
    }

    pub fn is_miss(self) -> bool {
        self == Self::Miss
    }

    pub fn is_joined(self) -> bool {
        self == Self::Joined
    }
}

/// A page handed out by [`QueryCache::fetch`](crate::cache::QueryCache::fetch).
///
/// `settled_at` is when the underlying fetch finished. Two callers joined to
/// the same fetch see the same timestamp, and a later cache hit reports the
/// original one.
///
/// ```ignore
/// let response = cache.fetch(&query, fetcher).await?;
/// log::debug!("{:?} page, settled {}", response.cache, response.settled_at);
/// let page = response.into_inner();
/// ```
#[derive(Debug, Clone)]
pub struct Response<T> {
    data: T,
    pub cache: CacheStatus,
    pub settled_at: DateTime<Utc>,
}

impl<T> Response<T> {
    pub(crate) fn new(data: T, cache: CacheStatus, settled_at: DateTime<Utc>) -> Self {
        Self {
            data,
            cache,
            settled_at,
        }
    }

    /// Returns `true` if no fetch ran for this call.
    pub fn is_cached(&self) -> bool {
        self.cache.is_hit()
    }

    /// Returns `true` if this call started or shared a fetch.
    pub fn is_fresh(&self) -> bool {
        !self.is_cached()
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn into_inner(self) -> T {
        self.data
    }
}
