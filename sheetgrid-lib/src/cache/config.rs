//! Cache configuration

/// Configuration for the query cache.
///
/// The cache is unbounded by default: the upstream dataset is finite and a
/// session rarely visits more than a handful of `(page, filter)` pairs.
///
/// # Example
///
/// ```
/// use sheetgrid_lib::cache::CacheConfig;
///
/// let config = CacheConfig::default().with_max_entries(64);
/// assert_eq!(config.max_entries, Some(64));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CacheConfig {
    /// Maximum number of entries kept. When exceeded, the least recently
    /// accessed idle entry is evicted. In-flight entries are never evicted.
    ///
    /// Default: unbounded
    pub max_entries: Option<usize>,
}

impl CacheConfig {
    /// Creates a new cache config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds the cache to `max` entries with least-recently-used eviction.
    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = Some(max);
        self
    }

    /// Removes any bound on the number of entries.
    pub fn unbounded() -> Self {
        Self { max_entries: None }
    }
}
