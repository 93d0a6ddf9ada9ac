//! Page service
//!
//! The seam between the cache and whatever produces pages. [`DataService`]
//! computes pages directly from the upstream sheet, [`HttpPageSource`] asks a
//! running [`serve`] endpoint for them.

mod remote;
mod server;

pub use remote::*;
pub use server::*;

use std::sync::Arc;

use async_trait::async_trait;

use crate::client::SheetClient;
use crate::error::Error;
use crate::page::DEFAULT_FILTER_COLUMN;
use crate::page::PageResult;
use crate::page::select_by;
use crate::query::Query;

/// Something that can produce a page for a query.
///
/// This is the only suspension point of the data layer: the query cache wraps
/// calls to it and guarantees at most one outstanding call per query.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Produces the page for `query`.
    async fn fetch_page(&self, query: &Query) -> Result<PageResult, Error>;
}

#[async_trait]
impl<T: PageSource + ?Sized> PageSource for Arc<T> {
    async fn fetch_page(&self, query: &Query) -> Result<PageResult, Error> {
        (**self).fetch_page(query).await
    }
}

/// Serves pages straight from the upstream sheet.
///
/// Each call fetches and decodes the whole table, then filters and slices it.
#[derive(Debug, Clone)]
pub struct DataService {
    client: SheetClient,
    filter_column: String,
}

impl DataService {
    /// Creates a service filtering on the default `Domain` column.
    pub fn new(client: SheetClient) -> Self {
        Self {
            client,
            filter_column: DEFAULT_FILTER_COLUMN.to_string(),
        }
    }

    /// Sets the column the substring filter applies to.
    pub fn with_filter_column(mut self, column: impl Into<String>) -> Self {
        self.filter_column = column.into();
        self
    }

    /// Returns the column the substring filter applies to.
    pub fn filter_column(&self) -> &str {
        &self.filter_column
    }

    /// Returns the upstream client.
    pub fn client(&self) -> &SheetClient {
        &self.client
    }
}

#[async_trait]
impl PageSource for DataService {
    async fn fetch_page(&self, query: &Query) -> Result<PageResult, Error> {
        let records = self.client.fetch_records().await?;
        Ok(select_by(&records, &self.filter_column, query.effective_page(), &query.filter))
    }
}
