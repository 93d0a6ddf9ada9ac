//! Upstream spreadsheet client

use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use reqwest::Client;

use crate::error::Error;
use crate::error::SourceError;
use crate::model::Record;
use crate::source::DEFAULT_PREFIX_LEN;
use crate::source::DEFAULT_SUFFIX_LEN;
use crate::source::decode_payload;

/// Client for the remote tabular source.
///
/// Performs a plain HTTP GET against a published spreadsheet query URL and
/// decodes the wrapped JSON payload into records. Every call fetches the
/// whole table; deduplication happens one level up in the query cache.
///
/// This client is cheap to clone (uses `Arc` internally) and can be shared
/// across tasks.
///
/// # Example
///
/// ```ignore
/// use sheetgrid_lib::SheetClient;
///
/// let client = SheetClient::builder()
///     .url("https://docs.google.com/spreadsheets/d/<id>/gviz/tq?tqx=out:json")
///     .timeout(Duration::from_secs(30))
///     .build()?;
///
/// let records = client.fetch_records().await?;
/// ```
#[derive(Clone)]
pub struct SheetClient {
    inner: Arc<SheetClientInner>,
}

struct SheetClientInner {
    url: String,
    prefix_len: usize,
    suffix_len: usize,
    http_client: Client,
    timeout: Option<Duration>,
}

impl SheetClient {
    /// Creates a new builder for constructing a client.
    pub fn builder() -> SheetClientBuilder<Missing> {
        SheetClientBuilder::new()
    }

    /// Fetches the raw payload text.
    ///
    /// Transport failures and non-success statuses are reported as
    /// unreachable-source errors.
    pub async fn fetch_text(&self) -> Result<String, SourceError> {
        let mut request = self.inner.http_client.get(&self.inner.url);

        if let Some(timeout) = self.inner.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }

    /// Fetches and decodes the full record set.
    pub async fn fetch_records(&self) -> Result<Vec<Record>, SourceError> {
        let started = Instant::now();
        log::debug!("fetching upstream table from {}", self.inner.url);

        let text = self.fetch_text().await?;
        let records = decode_payload(&text, self.inner.prefix_len, self.inner.suffix_len)?;

        log::debug!(
            "decoded {} records ({} bytes) in {:?}",
            records.len(),
            text.len(),
            started.elapsed()
        );
        Ok(records)
    }

    /// Returns the source URL.
    pub fn url(&self) -> &str {
        &self.inner.url
    }

    /// Returns the configured `(prefix, suffix)` envelope lengths.
    pub fn envelope(&self) -> (usize, usize) {
        (self.inner.prefix_len, self.inner.suffix_len)
    }
}

impl std::fmt::Debug for SheetClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetClient")
            .field("url", &self.inner.url)
            .field("prefix_len", &self.inner.prefix_len)
            .field("suffix_len", &self.inner.suffix_len)
            .field("timeout", &self.inner.timeout)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for constructing a [`SheetClient`].
///
/// Uses the typestate pattern so `build` is only available once the source
/// URL is set.
///
/// # Example
///
/// ```ignore
/// let client = SheetClient::builder()
///     .url(SHEET_URL)
///     .prefix_len(47)
///     .suffix_len(2)
///     .connect_timeout(Duration::from_secs(5))
///     .build()?;
/// ```
pub struct SheetClientBuilder<Url> {
    url: Url,
    prefix_len: usize,
    suffix_len: usize,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    http_client: Option<Client>,
}

impl SheetClientBuilder<Missing> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            url: Missing,
            prefix_len: DEFAULT_PREFIX_LEN,
            suffix_len: DEFAULT_SUFFIX_LEN,
            timeout: None,
            connect_timeout: None,
            http_client: None,
        }
    }

    /// Sets the source URL.
    pub fn url(self, url: impl Into<String>) -> SheetClientBuilder<Set<String>> {
        SheetClientBuilder {
            url: Set(url.into()),
            prefix_len: self.prefix_len,
            suffix_len: self.suffix_len,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
        }
    }
}

impl Default for SheetClientBuilder<Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U> SheetClientBuilder<U> {
    /// Sets the number of bytes stripped before the JSON body.
    ///
    /// Defaults to 47.
    pub fn prefix_len(mut self, len: usize) -> Self {
        self.prefix_len = len;
        self
    }

    /// Sets the number of bytes stripped after the JSON body.
    ///
    /// Defaults to 2.
    pub fn suffix_len(mut self, len: usize) -> Self {
        self.suffix_len = len;
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout.
    ///
    /// This is applied when building the HTTP client.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets a custom HTTP client.
    ///
    /// If not set, a default client will be created.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }
}

impl SheetClientBuilder<Set<String>> {
    /// Builds the [`SheetClient`].
    pub fn build(self) -> Result<SheetClient, Error> {
        let http_client = match self.http_client {
            Some(client) => client,
            None => {
                let mut builder = Client::builder();
                if let Some(timeout) = self.connect_timeout {
                    builder = builder.connect_timeout(timeout);
                }
                builder.build()?
            }
        };

        Ok(SheetClient {
            inner: Arc::new(SheetClientInner {
                url: self.url.0,
                prefix_len: self.prefix_len,
                suffix_len: self.suffix_len,
                http_client,
                timeout: self.timeout,
            }),
        })
    }
}
