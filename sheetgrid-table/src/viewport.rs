//! Viewport windowing.

use std::ops::Range;

use sheetgrid_lib::model::Record;

use crate::sort::SortState;
use crate::sort::sorted_order;

/// Default estimated height of one row.
pub const DEFAULT_ROW_HEIGHT: f64 = 45.0;

/// Default number of extra rows materialized on each side of the viewport.
pub const DEFAULT_OVERSCAN: usize = 5;

/// Default viewport height.
pub const DEFAULT_VIEWPORT_HEIGHT: f64 = 500.0;

/// Fixed layout parameters of a table viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportConfig {
    pub viewport_height: f64,
    pub estimated_row_height: f64,
    pub overscan: usize,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            estimated_row_height: DEFAULT_ROW_HEIGHT,
            overscan: DEFAULT_OVERSCAN,
        }
    }
}

impl ViewportConfig {
    pub fn with_viewport_height(mut self, height: f64) -> Self {
        self.viewport_height = height;
        self
    }

    pub fn with_row_height(mut self, height: f64) -> Self {
        self.estimated_row_height = height;
        self
    }

    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    /// Places this layout at `scroll_offset`.
    pub fn at(self, scroll_offset: f64) -> Viewport {
        Viewport {
            scroll_offset,
            viewport_height: self.viewport_height,
            estimated_row_height: self.estimated_row_height,
            overscan: self.overscan,
        }
    }
}

/// A viewport position over the table content.
///
/// All lengths share one unit (pixels, terminal rows, ...). Rows are assumed
/// to have a uniform estimated height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scroll_offset: f64,
    pub viewport_height: f64,
    pub estimated_row_height: f64,
    pub overscan: usize,
}

impl Default for Viewport {
    fn default() -> Self {
        ViewportConfig::default().at(0.0)
    }
}

impl Viewport {
    /// Returns the row height if it can lay out rows at all.
    fn row_height(&self) -> Option<f64> {
        let h = self.estimated_row_height;
        (h.is_finite() && h > 0.0).then_some(h)
    }

    /// Height of `len` rows.
    pub fn content_height(&self, len: usize) -> f64 {
        self.row_height().map_or(0.0, |h| len as f64 * h)
    }

    /// Largest scroll offset that still fills the viewport.
    pub fn max_scroll_offset(&self, len: usize) -> f64 {
        (self.content_height(len) - self.viewport_height.max(0.0)).max(0.0)
    }

    /// Positions (in display order) to materialize for `len` rows.
    ///
    /// Covers every row intersecting `[scroll_offset, scroll_offset +
    /// viewport_height]` plus `overscan` rows on each side. An offset past the
    /// end still yields the last row, so a non-empty table never renders
    /// blank.
    pub fn visible_range(&self, len: usize) -> Range<usize> {
        let Some(h) = self.row_height() else {
            return 0..0;
        };
        if len == 0 {
            return 0..0;
        }

        let last_index = len - 1;
        let top = self.scroll_offset.max(0.0);
        let bottom = top + self.viewport_height.max(0.0);

        // Float to integer casts saturate.
        let first = ((top / h).floor() as usize).min(last_index);
        let last = ((bottom / h).ceil() as usize)
            .saturating_sub(1)
            .clamp(first, last_index);

        let start = first.saturating_sub(self.overscan);
        let end = last.saturating_add(self.overscan).min(last_index) + 1;
        start..end
    }
}

/// One materialized row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleRow<'a> {
    /// Position in display (sorted) order.
    pub index: usize,
    /// Position in the page as loaded.
    pub source_index: usize,
    pub record: &'a Record,
    /// Distance from the top of the content to the top of this row.
    pub top_offset: f64,
}

/// The rows to render for one viewport position.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleWindow<'a> {
    /// Contiguous run of rows in display order.
    pub rows: Vec<VisibleRow<'a>>,
    pub total_content_height: f64,
}

impl VisibleWindow<'_> {
    /// Display positions covered by this window.
    pub fn range(&self) -> Range<usize> {
        match (self.rows.first(), self.rows.last()) {
            (Some(first), Some(last)) => first.index..last.index + 1,
            _ => 0..0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Sorts a copy of `items` and returns the rows visible in `viewport`.
pub fn compute_visible<'a>(
    items: &'a [Record],
    sort: &SortState,
    viewport: &Viewport,
) -> VisibleWindow<'a> {
    let order = sorted_order(items, sort);
    window(items, &order, viewport)
}

/// Windows `items` displayed in `order` (a permutation of its positions).
pub fn window<'a>(items: &'a [Record], order: &[usize], viewport: &Viewport) -> VisibleWindow<'a> {
    let h = viewport.row_height().unwrap_or(0.0);
    let rows = viewport
        .visible_range(order.len())
        .filter_map(|index| {
            let source_index = *order.get(index)?;
            Some(VisibleRow {
                index,
                source_index,
                record: items.get(source_index)?,
                top_offset: index as f64 * h,
            })
        })
        .collect();

    VisibleWindow {
        rows,
        total_content_height: viewport.content_height(order.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(n: usize) -> Vec<Record> {
        (0..n).map(|i| Record::new().set("N", i as i64)).collect()
    }

    #[test]
    fn test_defaults() {
        let viewport = Viewport::default();
        assert_eq!(viewport.scroll_offset, 0.0);
        assert_eq!(viewport.viewport_height, 500.0);
        assert_eq!(viewport.estimated_row_height, 45.0);
        assert_eq!(viewport.overscan, 5);
    }

    #[test]
    fn test_range_at_top() {
        // Rows 0..=11 intersect [0, 500]; five more below.
        assert_eq!(Viewport::default().visible_range(50), 0..17);
    }

    #[test]
    fn test_range_scrolled() {
        let viewport = ViewportConfig::default().at(900.0);
        // 900 / 45 = 20, (900 + 500) / 45 = 31.1 -> last row 31.
        assert_eq!(viewport.visible_range(50), 15..37);
    }

    #[test]
    fn test_range_clamped_at_bottom() {
        let viewport = ViewportConfig::default().at(1750.0);
        assert_eq!(viewport.visible_range(50), 33..50);
    }

    #[test]
    fn test_offset_past_end_keeps_last_row() {
        let viewport = ViewportConfig::default().with_overscan(0).at(1.0e9);
        assert_eq!(viewport.visible_range(50), 49..50);
    }

    #[test]
    fn test_small_lists_fit_entirely() {
        assert_eq!(Viewport::default().visible_range(3), 0..3);
        assert_eq!(Viewport::default().visible_range(0), 0..0);
    }

    #[test]
    fn test_degenerate_row_height() {
        for h in [0.0, -10.0, f64::NAN, f64::INFINITY] {
            let viewport = ViewportConfig::default().with_row_height(h).at(0.0);
            assert_eq!(viewport.visible_range(50), 0..0);
            assert_eq!(viewport.content_height(50), 0.0);
        }
    }

    #[test]
    fn test_negative_scroll_treated_as_top() {
        let viewport = ViewportConfig::default().at(-300.0);
        assert_eq!(viewport.visible_range(50), 0..17);
    }

    #[test]
    fn test_max_scroll_offset() {
        let viewport = Viewport::default();
        assert_eq!(viewport.max_scroll_offset(50), 50.0 * 45.0 - 500.0);
        assert_eq!(viewport.max_scroll_offset(5), 0.0);
    }

    #[test]
    fn test_window_offsets_and_height() {
        let items = numbered(50);
        let viewport = ViewportConfig::default().at(900.0);
        let window = compute_visible(&items, &SortState::new(), &viewport);

        assert_eq!(window.total_content_height, 2250.0);
        assert_eq!(window.range(), 15..37);
        let first = window.rows[0];
        assert_eq!(first.index, 15);
        assert_eq!(first.top_offset, 675.0);
        assert_eq!(first.record.get("N"), items[15].get("N"));
    }

    #[test]
    fn test_window_follows_sort() {
        let items = numbered(30);
        let sort = SortState::by("N", crate::SortDirection::Descending);
        let window = compute_visible(&items, &sort, &Viewport::default());

        assert_eq!(window.rows[0].source_index, 29);
        assert_eq!(window.rows[0].index, 0);
        assert_eq!(window.rows[0].top_offset, 0.0);
        // Page itself untouched.
        assert_eq!(items[0].get_text("N").as_deref(), Some("0"));
    }
}
