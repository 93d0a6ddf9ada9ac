//! Stateful table engine.

use std::sync::Arc;

use sheetgrid_lib::PageResult;
use sheetgrid_lib::model::Record;

use crate::sort::SortState;
use crate::sort::sorted_order;
use crate::viewport::Viewport;
use crate::viewport::ViewportConfig;
use crate::viewport::VisibleWindow;
use crate::viewport::window;

/// Virtualized view of one loaded page.
///
/// Holds the page reported by the cache for the active query, the sort
/// state, and the viewport. The sorted order is cached and only recomputed
/// when the page or the sort changes; scrolling and resizing just re-window
/// it. The page itself is never reordered.
///
/// Every state change sets a dirty flag the host can use to decide whether
/// to redraw.
#[derive(Debug, Clone)]
pub struct VirtualTable {
    /// Page being displayed.
    page: Option<Arc<PageResult>>,
    /// Column labels, in the order of the page's first record.
    columns: Vec<String>,
    sort: SortState,
    /// Cached display order: positions into `page.items`.
    order: Vec<usize>,
    viewport: Viewport,
    dirty: bool,
}

impl Default for VirtualTable {
    fn default() -> Self {
        Self::new(ViewportConfig::default())
    }
}

impl VirtualTable {
    /// Creates an empty table with the given layout.
    pub fn new(config: ViewportConfig) -> Self {
        Self {
            page: None,
            columns: Vec::new(),
            sort: SortState::new(),
            order: Vec::new(),
            viewport: config.at(0.0),
            dirty: false,
        }
    }

    // -------------------------------------------------------------------------
    // Data
    // -------------------------------------------------------------------------

    /// Installs a new page.
    ///
    /// The cached order is rebuilt for the current sort column and the
    /// viewport returns to the top. Installing the page already shown (same
    /// allocation) is a no-op.
    pub fn set_page(&mut self, page: Arc<PageResult>) {
        if self.page.as_ref().is_some_and(|current| Arc::ptr_eq(current, &page)) {
            return;
        }
        self.columns = page
            .items
            .first()
            .map(|record| record.columns().to_vec())
            .unwrap_or_default();
        self.page = Some(page);
        self.viewport.scroll_offset = 0.0;
        self.resort();
    }

    /// Drops the displayed page.
    pub fn clear(&mut self) {
        self.page = None;
        self.columns.clear();
        self.order.clear();
        self.viewport.scroll_offset = 0.0;
        self.dirty = true;
    }

    /// The page being displayed.
    pub fn page(&self) -> Option<&Arc<PageResult>> {
        self.page.as_ref()
    }

    /// Records of the page in loaded order.
    pub fn items(&self) -> &[Record] {
        match &self.page {
            Some(page) => &page.items,
            None => &[],
        }
    }

    /// Column labels of the page.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns the record at a display position.
    pub fn row(&self, index: usize) -> Option<&Record> {
        self.order.get(index).and_then(|&i| self.items().get(i))
    }

    // -------------------------------------------------------------------------
    // Sorting
    // -------------------------------------------------------------------------

    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    /// Handles a click on the header of `column`.
    ///
    /// Returns the new sort state, or `None` if the page has no such column.
    pub fn toggle_sort(&mut self, column: &str) -> Option<&SortState> {
        if !self.columns.iter().any(|c| c == column) {
            return None;
        }
        self.sort.toggle(column);
        self.resort();
        Some(&self.sort)
    }

    /// Replaces the sort state.
    pub fn set_sort(&mut self, sort: SortState) {
        if self.sort != sort {
            self.sort = sort;
            self.resort();
        }
    }

    /// Returns to loaded order.
    pub fn clear_sort(&mut self) {
        self.set_sort(SortState::new());
    }

    fn resort(&mut self) {
        self.order = sorted_order(self.items(), &self.sort);
        log::trace!("resorted {} rows by {:?}", self.order.len(), self.sort);
        self.dirty = true;
    }

    // -------------------------------------------------------------------------
    // Scrolling
    // -------------------------------------------------------------------------

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn scroll_offset(&self) -> f64 {
        self.viewport.scroll_offset
    }

    /// Largest valid scroll offset for the current page.
    pub fn max_scroll_offset(&self) -> f64 {
        self.viewport.max_scroll_offset(self.len())
    }

    /// Scrolls to `offset`, clamped to the content.
    pub fn set_scroll_offset(&mut self, offset: f64) {
        let offset = if offset.is_nan() {
            0.0
        } else {
            offset.clamp(0.0, self.max_scroll_offset())
        };
        if offset != self.viewport.scroll_offset {
            self.viewport.scroll_offset = offset;
            self.dirty = true;
        }
    }

    /// Scrolls by `delta` (negative is up).
    pub fn scroll_by(&mut self, delta: f64) {
        self.set_scroll_offset(self.viewport.scroll_offset + delta);
    }

    /// Scrolls the least amount needed to show the row at display position
    /// `index` entirely.
    pub fn scroll_to_row(&mut self, index: usize) {
        if index >= self.len() {
            return;
        }
        let h = self.viewport.estimated_row_height;
        let top = index as f64 * h;
        let bottom = top + h;
        let offset = self.viewport.scroll_offset;

        if top < offset {
            self.set_scroll_offset(top);
        } else if bottom > offset + self.viewport.viewport_height {
            self.set_scroll_offset(bottom - self.viewport.viewport_height);
        }
    }

    /// Changes the viewport height, keeping the offset valid.
    pub fn resize(&mut self, viewport_height: f64) {
        let viewport_height = viewport_height.max(0.0);
        if viewport_height != self.viewport.viewport_height {
            self.viewport.viewport_height = viewport_height;
            self.dirty = true;
            self.set_scroll_offset(self.viewport.scroll_offset);
        }
    }

    // -------------------------------------------------------------------------
    // Rendering
    // -------------------------------------------------------------------------

    /// Rows to render for the current state.
    pub fn visible(&self) -> VisibleWindow<'_> {
        window(self.items(), &self.order, &self.viewport)
    }

    /// Check if the table has changed since the last [`clear_dirty`](Self::clear_dirty).
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear the dirty flag.
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }
}
