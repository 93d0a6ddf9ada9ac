//! Query key type.

use std::fmt;

/// The `(page, filter)` pair identifying one addressable page of results.
///
/// Queries compare structurally: two queries are equal when their page and
/// filter are equal. The filter is compared as typed (case-sensitive, before
/// any normalization), so `"Acme"` and `"acme"` are distinct cache keys even
/// though they select the same rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Query {
    /// 1-based page number. Values below 1 are clamped when selecting.
    pub page: i64,
    /// Substring filter on the filter column. Empty means no filter.
    pub filter: String,
}

impl Query {
    /// Creates a new query.
    pub fn new(page: i64, filter: impl Into<String>) -> Self {
        Self {
            page,
            filter: filter.into(),
        }
    }

    /// Returns the same filter on a different page.
    pub fn with_page(&self, page: i64) -> Self {
        Self {
            page,
            filter: self.filter.clone(),
        }
    }

    /// Returns the page number clamped to at least 1.
    pub fn effective_page(&self) -> i64 {
        self.page.max(1)
    }
}

impl Default for Query {
    fn default() -> Self {
        Self::new(1, "")
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page={} filter={:?}", self.page, self.filter)
    }
}
