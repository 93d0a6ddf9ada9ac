//! Pagination and filtering over the normalized record set.

use serde::Deserialize;
use serde::Serialize;

use crate::model::Record;

/// Number of records per page.
pub const PAGE_SIZE: usize = 50;

/// Column the substring filter applies to.
pub const DEFAULT_FILTER_COLUMN: &str = "Domain";

/// One page of filtered results with totals.
///
/// A page past the end is valid: it has no items but still reports the
/// totals of the filtered set. A filter matching nothing is also valid and
/// reports `total_items == 0` with a single (empty) page. Use
/// [`is_empty`](Self::is_empty) to tell these apart from a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult {
    /// Records on this page, in source order.
    pub items: Vec<Record>,
    /// The page that was selected (after clamping to 1).
    pub current_page: i64,
    /// Number of pages in the filtered set, at least 1.
    pub total_pages: i64,
    /// Number of records in the filtered set.
    pub total_items: usize,
}

impl PageResult {
    /// Returns `true` if the filtered set has no records at all.
    pub fn is_empty(&self) -> bool {
        self.total_items == 0
    }

    /// Returns the number of records on this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }
}

/// Returns the number of pages needed for `total_items` records.
pub fn total_pages(total_items: usize) -> i64 {
    total_items.div_ceil(PAGE_SIZE).max(1) as i64
}

/// Selects one page of records, filtering on [`DEFAULT_FILTER_COLUMN`].
///
/// See [`select_by`].
pub fn select(records: &[Record], page: i64, filter: &str) -> PageResult {
    select_by(records, DEFAULT_FILTER_COLUMN, page, filter)
}

/// Selects one page of records.
///
/// With a non-empty `filter`, only records whose `column` is present and
/// non-blank and whose text contains `filter` (case-insensitively) are kept.
/// Pages below 1 are treated as page 1. The result depends only on the
/// arguments, which is what makes caching by query valid.
pub fn select_by(records: &[Record], column: &str, page: i64, filter: &str) -> PageResult {
    let page = page.max(1);
    let needle = filter.to_lowercase();

    let filtered: Vec<&Record> = if needle.is_empty() {
        records.iter().collect()
    } else {
        records
            .iter()
            .filter(|record| matches_filter(record, column, &needle))
            .collect()
    };

    let total_items = filtered.len();
    let start = usize::try_from(page - 1)
        .ok()
        .and_then(|p| p.checked_mul(PAGE_SIZE))
        .unwrap_or(usize::MAX);

    let items = filtered
        .into_iter()
        .skip(start)
        .take(PAGE_SIZE)
        .cloned()
        .collect();

    PageResult {
        items,
        current_page: page,
        total_pages: total_pages(total_items),
        total_items,
    }
}

fn matches_filter(record: &Record, column: &str, needle: &str) -> bool {
    match record.get(column) {
        Some(value) if !value.is_blank() => value.to_string().to_lowercase().contains(needle),
        _ => false,
    }
}
