//! Page fetching and the pagination loop.
//!
//! A [`PageFetcher`] hands out listing pages one at a time. It does not parse
//! anything and the pipeline does not care where pages come from: a live
//! HTTP session ([`HttpPageFetcher`]), files saved earlier, or canned
//! fixtures ([`StaticPages`]).

mod http;

pub use http::HttpPageFetcher;

use std::collections::VecDeque;
use std::path::Path;
use std::time::Duration;

use serde::Serialize;

use crate::config::FetchConfig;
use crate::error::FetchResult;
use crate::extract::RecordExtractor;
use crate::models::RawPublication;

/// One listing page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    /// Page markup.
    pub content: String,

    /// Whether another page follows this one.
    pub has_more: bool,
}

/// Pull-based source of listing pages for one profile.
#[async_trait::async_trait]
pub trait PageFetcher: Send {
    /// Fetch the next page.
    ///
    /// # Errors
    ///
    /// Returns error when the page cannot be obtained. Pagination stops there.
    async fn next_page(&mut self) -> FetchResult<Page>;
}

/// Pages held in memory, handed out in order.
#[derive(Debug, Clone, Default)]
pub struct StaticPages {
    pages: VecDeque<String>,
}

impl StaticPages {
    /// Serve the given pages in order.
    pub fn new<I, S>(pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pages: pages.into_iter().map(Into::into).collect(),
        }
    }

    /// Serve pages saved to disk, in the order given.
    ///
    /// # Errors
    ///
    /// Returns error if any file cannot be read.
    pub async fn from_files<P: AsRef<Path>>(paths: &[P]) -> FetchResult<Self> {
        let mut pages = VecDeque::with_capacity(paths.len());
        for path in paths {
            pages.push_back(tokio::fs::read_to_string(path).await?);
        }
        Ok(Self { pages })
    }

    /// Pages not yet handed out.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.pages.len()
    }
}

#[async_trait::async_trait]
impl PageFetcher for StaticPages {
    async fn next_page(&mut self) -> FetchResult<Page> {
        let content = self.pages.pop_front().unwrap_or_default();
        Ok(Page {
            content,
            has_more: !self.pages.is_empty(),
        })
    }
}

/// Bounds on one pagination run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarvestLimits {
    /// Longest wait for any single page.
    pub page_timeout: Duration,

    /// Pages fetched at most.
    pub max_pages: u32,
}

impl HarvestLimits {
    /// Limits taken from fetch configuration.
    #[must_use]
    pub const fn from_config(config: &FetchConfig) -> Self {
        Self {
            page_timeout: config.page_timeout,
            max_pages: config.max_pages,
        }
    }
}

impl Default for HarvestLimits {
    fn default() -> Self {
        Self::from_config(&FetchConfig::default())
    }
}

/// Why pagination stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum Termination {
    /// The listing said there is nothing more, or returned an empty page.
    Exhausted,
    /// The wait for the next page ran out.
    TimedOut,
    /// A page could not be fetched.
    Failed(String),
    /// The page limit was reached.
    PageLimit,
}

impl Termination {
    /// Check if the listing was read to its end.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self, Self::Exhausted)
    }
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exhausted => f.write_str("no more results"),
            Self::TimedOut => f.write_str("timed out waiting for the next page"),
            Self::Failed(message) => write!(f, "fetch failed: {message}"),
            Self::PageLimit => f.write_str("page limit reached"),
        }
    }
}

/// Everything accumulated for one profile.
#[derive(Debug, Clone)]
pub struct Harvest {
    /// Raw records from every page, in page order.
    pub records: Vec<RawPublication>,

    /// Pages fetched.
    pub pages: u32,

    /// Malformed entries skipped across all pages.
    pub skipped: usize,

    /// Why the loop ended.
    pub termination: Termination,
}

/// Run the pagination loop for one profile.
///
/// Records gathered before any stop condition are always returned, including
/// when a page times out or fails.
pub async fn harvest<F>(
    fetcher: &mut F,
    extractor: &dyn RecordExtractor,
    limits: HarvestLimits,
) -> Harvest
where
    F: PageFetcher + ?Sized,
{
    let mut records = Vec::new();
    let mut pages = 0;
    let mut skipped = 0;

    let termination = loop {
        if pages >= limits.max_pages {
            tracing::warn!(pages, max_pages = limits.max_pages, "Page limit reached");
            break Termination::PageLimit;
        }

        let page = match tokio::time::timeout(limits.page_timeout, fetcher.next_page()).await {
            Ok(Ok(page)) => page,
            Ok(Err(err)) if err.is_timeout() => break Termination::TimedOut,
            Ok(Err(err)) => break Termination::Failed(err.to_string()),
            Err(_) => break Termination::TimedOut,
        };
        pages += 1;

        let extraction = extractor.extract(&page.content);
        tracing::debug!(
            extractor = extractor.name(),
            page = pages,
            records = extraction.records.len(),
            skipped = extraction.skipped,
            has_more = page.has_more,
            "Extracted page"
        );

        if extraction.is_empty() && page.has_more {
            tracing::debug!(page = pages, "Empty page despite more-results signal");
            break Termination::Exhausted;
        }

        skipped += extraction.skipped;
        records.extend(extraction.records);

        if !page.has_more {
            break Termination::Exhausted;
        }
    };

    match &termination {
        Termination::Exhausted => {
            tracing::info!(pages, records = records.len(), skipped, "Listing exhausted");
        }
        other => {
            tracing::warn!(
                pages,
                records = records.len(),
                skipped,
                reason = %other,
                "Pagination stopped early, keeping partial results"
            );
        }
    }

    Harvest {
        records,
        pages,
        skipped,
        termination,
    }
}
