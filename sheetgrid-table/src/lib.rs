//! Virtualized table engine
//!
//! Turns one loaded page of records into the handful of rows a scrollable
//! viewport actually needs, with client-side sorting of that page.
//!
//! - [`SortState`] tracks the sort column and direction (header clicks)
//! - [`sorted_order`] sorts a page by index, leaving the page untouched
//! - [`compute_visible`] maps a viewport onto the window of rows to render
//! - [`VirtualTable`] keeps all of the above for one table view

mod sort;
mod table;
mod viewport;

pub use sort::*;
pub use table::*;
pub use viewport::*;
