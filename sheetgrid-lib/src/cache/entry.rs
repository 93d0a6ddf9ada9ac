//! Cache entry bookkeeping

use std::sync::Arc;

use chrono::DateTime;
use chrono::Utc;
use futures::future::BoxFuture;
use futures::future::Shared;

use crate::error::Error;
use crate::page::PageResult;

/// Outcome of one fetch, shared by every caller attached to it.
pub(crate) type FetchOutcome = Result<(Arc<PageResult>, DateTime<Utc>), Arc<Error>>;

/// A single in-flight computation that many callers may await.
pub(crate) type SharedFetch = Shared<BoxFuture<'static, FetchOutcome>>;

/// Lifecycle of a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryStatus {
    /// First fetch for the key has not finished.
    #[default]
    Pending,
    /// A value is available. A revalidation may be in flight.
    Settled,
    /// The last fetch failed. The next request re-issues the fetcher.
    Failed,
}

#[derive(Default)]
pub(crate) struct Entry {
    pub status: EntryStatus,
    pub value: Option<(Arc<PageResult>, DateTime<Utc>)>,
    pub error: Option<Arc<Error>>,
    pub inflight: Option<SharedFetch>,
    /// Clock tick of the fetch that owns this entry. Only that fetch may
    /// settle it.
    pub generation: u64,
    /// Logical access time used for LRU eviction.
    pub last_access: u64,
}

impl Entry {
    pub fn start(&mut self, fetch: SharedFetch) {
        self.status = if self.value.is_some() {
            EntryStatus::Settled
        } else {
            EntryStatus::Pending
        };
        self.error = None;
        self.inflight = Some(fetch);
    }

    pub fn settle(&mut self, outcome: &FetchOutcome) {
        self.inflight = None;
        match outcome {
            Ok(value) => {
                self.status = EntryStatus::Settled;
                self.value = Some(value.clone());
                self.error = None;
            }
            Err(err) => {
                self.status = EntryStatus::Failed;
                self.error = Some(Arc::clone(err));
            }
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.inflight.is_some()
    }
}
