//! HTTP page fetching.

use reqwest::Client;
use tracing::debug;
use url::Url;

use sitedoc_shared::{CrawlConfig, Result, SiteDocError};

/// Thin wrapper over a shared `reqwest` client with the crawl's identity and timeout.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Build the HTTP client from the crawl configuration.
    pub fn new(config: &CrawlConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(config.timeout)
            .build()
            .map_err(|e| SiteDocError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// GET `url` once and return its body as text.
    ///
    /// Transport failures, timeouts and non-2xx statuses are all reported as
    /// [`SiteDocError::Network`]. Nothing is retried.
    pub async fn fetch(&self, url: &Url) -> Result<String> {
        debug!(%url, "fetching page");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| SiteDocError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SiteDocError::Network(format!("{url}: HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| SiteDocError::Network(format!("{url}: body read failed: {e}")))
    }
}
