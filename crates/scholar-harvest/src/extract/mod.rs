//! Listing page extractors.
//!
//! An extractor turns one page of listing HTML into [`RawPublication`]s. It is a
//! pure function of the page: no network, no state between pages. Entries that
//! cannot be read are skipped and counted instead of failing the page.

mod dblp;
mod scholar;

pub use dblp::DblpExtractor;
pub use scholar::ScholarExtractor;

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};

use crate::models::{ListingSource, RawPublication};

/// Records pulled from one page plus the number of entries skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Successfully extracted records, in page order.
    pub records: Vec<RawPublication>,

    /// Malformed entries that were skipped.
    pub skipped: usize,
}

impl Extraction {
    /// Check if nothing at all was found on the page.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.skipped == 0
    }
}

/// Parses listing pages into raw records.
pub trait RecordExtractor: Send + Sync {
    /// Extractor name for logs.
    fn name(&self) -> &'static str;

    /// Extract every entry on the page.
    fn extract(&self, page: &str) -> Extraction;

    /// Whether the page advertises a further page of results.
    fn has_more(&self, page: &str) -> bool;
}

/// Pick the extractor for a listing source.
#[must_use]
pub fn extractor_for(source: ListingSource) -> Box<dyn RecordExtractor> {
    match source {
        ListingSource::Scholar => Box::new(ScholarExtractor),
        ListingSource::Dblp => Box::new(DblpExtractor),
    }
}

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid digit pattern"));

pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid CSS selector")
}

/// Visible text of an element with whitespace runs collapsed.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    let text: String = element.text().collect();
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// First run of digits in `text`, if any.
pub(crate) fn first_number(text: &str) -> Option<&str> {
    DIGITS.find(text).map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_number() {
        assert_eq!(first_number("Cited by 42*"), Some("42"));
        assert_eq!(first_number(""), None);
        assert_eq!(first_number("n/a"), None);
    }

    #[test]
    fn test_element_text_collapses_whitespace() {
        let html = scraper::Html::parse_fragment("<p>  Deep\n   Learning <b>rocks</b> </p>");
        let p = html.select(&selector("p")).next().unwrap();
        assert_eq!(element_text(p), "Deep Learning rocks");
    }

    #[test]
    fn test_extractor_for_source() {
        assert_eq!(extractor_for(ListingSource::Scholar).name(), "scholar");
        assert_eq!(extractor_for(ListingSource::Dblp).name(), "dblp");
    }
}
