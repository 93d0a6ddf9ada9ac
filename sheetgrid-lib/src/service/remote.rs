//! Client for a remote page endpoint.

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use super::DATA_PATH;
use super::ErrorBody;
use super::PageSource;
use crate::error::Error;
use crate::page::PageResult;
use crate::query::Query;

/// Fetches pages from a server started with [`serve`](super::serve).
#[derive(Debug, Clone)]
pub struct HttpPageSource {
    endpoint: Url,
    http_client: Client,
}

impl HttpPageSource {
    /// Creates a source for the server rooted at `base_url`.
    pub fn new(base_url: &str) -> Result<Self, Error> {
        Self::with_client(base_url, Client::new())
    }

    /// Creates a source using a custom HTTP client.
    pub fn with_client(base_url: &str, http_client: Client) -> Result<Self, Error> {
        let endpoint = Url::parse(base_url)
            .and_then(|base| base.join(DATA_PATH))
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", base_url, e)))?;
        Ok(Self {
            endpoint,
            http_client,
        })
    }

    /// Returns the request URL for `query`.
    pub fn url_for(&self, query: &Query) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("page", &query.page.to_string())
            .append_pair("filter", &query.filter);
        url
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch_page(&self, query: &Query) -> Result<PageResult, Error> {
        let response = self.http_client.get(self.url_for(query)).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or(body);
            return Err(Error::remote(status.as_u16(), message));
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for_encodes_filter() {
        let source = HttpPageSource::new("http://127.0.0.1:3000").unwrap();
        let url = source.url_for(&Query::new(2, "a&b c"));
        assert_eq!(url.as_str(), "http://127.0.0.1:3000/api/data?page=2&filter=a%26b+c");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(HttpPageSource::new("not a url"), Err(Error::InvalidUrl(_))));
    }
}
