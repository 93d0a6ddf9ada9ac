//! Sheetgrid data layer
//!
//! Serves a large published spreadsheet as filtered, paginated pages with
//! deduplicated, cached fetches.
//!
//! - [`source`] decodes the upstream payload into [`model::Record`]s
//! - [`page`] filters and slices the record set into [`PageResult`]s
//! - [`cache`] deduplicates and caches page fetches by [`Query`]
//! - [`session`] tracks the active query of a table view
//! - [`service`] exposes pages over HTTP and consumes them back

pub mod cache;
pub mod error;
pub mod model;
pub mod page;
pub mod service;
pub mod session;
pub mod source;

mod client;
mod filter_input;
mod query;
mod response;

pub use client::*;
pub use filter_input::*;
pub use page::PAGE_SIZE;
pub use page::PageResult;
pub use query::Query;
pub use response::CacheStatus;
pub use response::Response;
pub use session::DataSession;
pub use session::SessionContext;
