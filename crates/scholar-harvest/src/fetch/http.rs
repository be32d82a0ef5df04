//! Listing pages over plain HTTP.

use std::time::Duration;

use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use url::Url;

use super::{Page, PageFetcher};
use crate::config::FetchConfig;
use crate::error::{FetchError, FetchResult};
use crate::extract::{RecordExtractor, extractor_for};
use crate::models::ListingSource;

/// Fetches one profile's listing pages.
///
/// The fetcher owns its HTTP client; dropping it ends the session.
pub struct HttpPageFetcher {
    /// HTTP client with middleware.
    client: ClientWithMiddleware,

    /// Profile URL as given.
    locator: Url,

    /// Listing service behind the locator.
    source: ListingSource,

    /// Used to read the more-results signal.
    extractor: Box<dyn RecordExtractor>,

    page_size: u32,
    page_delay: Duration,
    request_timeout: Duration,

    /// Row offset of the next page.
    offset: u32,

    /// Pages requested so far.
    requested: u32,
}

impl HttpPageFetcher {
    /// Create a fetcher for a profile URL, detecting the listing service from its host.
    ///
    /// # Errors
    ///
    /// Returns error if the URL is invalid, the host is not a known listing
    /// service, or the HTTP client cannot be built.
    pub fn for_locator(locator: &str, config: &FetchConfig) -> FetchResult<Self> {
        let source = ListingSource::detect(locator).ok_or_else(|| {
            FetchError::invalid_locator(locator, "not a Google Scholar or DBLP profile URL")
        })?;
        Self::new(locator, source, config)
    }

    /// Create a fetcher for a profile URL on a known listing service.
    ///
    /// # Errors
    ///
    /// Returns error if the URL is invalid or the HTTP client cannot be built.
    pub fn new(locator: &str, source: ListingSource, config: &FetchConfig) -> FetchResult<Self> {
        let url = Url::parse(locator)
            .map_err(|e| FetchError::invalid_locator(locator, e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(FetchError::invalid_locator(
                locator,
                "expected an http(s) URL",
            ));
        }

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .gzip(true)
            .build()?;

        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(Duration::from_secs(1), Duration::from_secs(30))
            .build_with_max_retries(config.transport_retries);

        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            locator: url,
            source,
            extractor: extractor_for(source),
            page_size: config.page_size.max(1),
            page_delay: config.page_delay,
            request_timeout: config.request_timeout,
            offset: 0,
            requested: 0,
        })
    }

    /// Listing service being read.
    #[must_use]
    pub const fn source(&self) -> ListingSource {
        self.source
    }

    /// URL of the next page.
    #[must_use]
    pub fn next_url(&self) -> Url {
        if !self.source.is_paginated() {
            return self.locator.clone();
        }

        let kept: Vec<(String, String)> = self
            .locator
            .query_pairs()
            .filter(|(key, _)| *key != "cstart" && *key != "pagesize")
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        let mut url = self.locator.clone();
        url.query_pairs_mut()
            .clear()
            .extend_pairs(kept)
            .append_pair("cstart", &self.offset.to_string())
            .append_pair("pagesize", &self.page_size.to_string());
        url
    }

    /// Map status codes to errors.
    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> FetchResult<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(60);
            return Err(FetchError::rate_limited(retry_after));
        }

        let text = response.text().await.unwrap_or_default();
        Err(FetchError::status(status.as_u16(), text))
    }

    fn transport_error(&self, err: reqwest_middleware::Error) -> FetchError {
        match err {
            reqwest_middleware::Error::Reqwest(e) if e.is_timeout() => {
                FetchError::Timeout(self.request_timeout)
            }
            reqwest_middleware::Error::Reqwest(e) => FetchError::Http(e),
            other => FetchError::Middleware(other),
        }
    }
}

#[async_trait::async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn next_page(&mut self) -> FetchResult<Page> {
        if self.requested > 0 && !self.page_delay.is_zero() {
            tokio::time::sleep(self.page_delay).await;
        }

        let url = self.next_url();
        tracing::debug!(url = %url, page = self.requested + 1, "Fetching listing page");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let response = self.handle_response(response).await?;
        let content = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(self.request_timeout)
            } else {
                FetchError::Http(e)
            }
        })?;

        self.requested += 1;
        self.offset = self.offset.saturating_add(self.page_size);

        let has_more = self.source.is_paginated() && self.extractor.has_more(&content);
        Ok(Page { content, has_more })
    }
}

impl std::fmt::Debug for HttpPageFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPageFetcher")
            .field("locator", &self.locator.as_str())
            .field("source", &self.source)
            .field("offset", &self.offset)
            .field("requested", &self.requested)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scholar_pagination_query() {
        let config = FetchConfig {
            page_size: 100,
            ..FetchConfig::default()
        };
        let mut fetcher = HttpPageFetcher::for_locator(
            "https://scholar.google.com/citations?user=abc&hl=en&cstart=20",
            &config,
        )
        .unwrap();

        let url = fetcher.next_url();
        let pairs: Vec<_> = url.query_pairs().map(|(k, v)| format!("{k}={v}")).collect();
        assert_eq!(
            pairs,
            vec!["user=abc", "hl=en", "cstart=0", "pagesize=100"]
        );

        fetcher.offset = 100;
        assert!(fetcher.next_url().as_str().contains("cstart=100"));
    }

    #[test]
    fn test_dblp_locator_is_used_as_is() {
        let fetcher = HttpPageFetcher::for_locator(
            "https://dblp.org/pid/01/234.html",
            &FetchConfig::default(),
        )
        .unwrap();
        assert_eq!(fetcher.source(), ListingSource::Dblp);
        assert_eq!(
            fetcher.next_url().as_str(),
            "https://dblp.org/pid/01/234.html"
        );
    }

    #[test]
    fn test_rejects_unknown_locators() {
        let config = FetchConfig::default();
        assert!(matches!(
            HttpPageFetcher::for_locator("not a url", &config),
            Err(FetchError::InvalidLocator { .. })
        ));
        assert!(matches!(
            HttpPageFetcher::for_locator("https://example.com/me", &config),
            Err(FetchError::InvalidLocator { .. })
        ));
        assert!(matches!(
            HttpPageFetcher::new("ftp://scholar.google.com/x", ListingSource::Scholar, &config),
            Err(FetchError::InvalidLocator { .. })
        ));
    }
}
