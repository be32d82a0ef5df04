//! DBLP person page extractor.
//!
//! DBLP renders a person's whole record on one page, grouped under `li.year`
//! headers. Entries carry schema.org microdata (`itemprop`), which is what
//! we read.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use super::{Extraction, RecordExtractor, element_text, selector};
use crate::models::{NOT_AVAILABLE, RawAuthors, RawCitations, RawPublication};

static YEAR_OR_ENTRY: LazyLock<Selector> = LazyLock::new(|| selector("li.year, li.entry"));
static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("span.title"));
static AUTHOR: LazyLock<Selector> = LazyLock::new(|| selector(r#"span[itemprop="author"]"#));
static PART_OF: LazyLock<Selector> = LazyLock::new(|| selector(r#"span[itemprop="isPartOf"]"#));
static DATE: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"span[itemprop="datePublished"]"#));
static LINK: LazyLock<Selector> = LazyLock::new(|| selector("nav.publ a[href]"));
static TYPE_ICON: LazyLock<Selector> = LazyLock::new(|| selector("div.box img"));

/// Extractor for `dblp.org/pid/...` person pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct DblpExtractor;

impl RecordExtractor for DblpExtractor {
    fn name(&self) -> &'static str {
        "dblp"
    }

    fn extract(&self, page: &str) -> Extraction {
        let document = Html::parse_document(page);
        let mut extraction = Extraction::default();
        let mut section_year = NOT_AVAILABLE.to_string();

        for item in document.select(&YEAR_OR_ENTRY) {
            if item.value().classes().any(|c| c == "year") {
                section_year = element_text(item);
                continue;
            }

            match parse_entry(item, &section_year) {
                Some(record) => extraction.records.push(record),
                None => {
                    tracing::debug!(id = ?item.value().id(), "Skipping DBLP entry without a title");
                    extraction.skipped += 1;
                }
            }
        }

        extraction
    }

    fn has_more(&self, _page: &str) -> bool {
        false
    }
}

fn parse_entry(entry: ElementRef<'_>, section_year: &str) -> Option<RawPublication> {
    let title = entry.select(&TITLE).next().map(element_text)?;
    let title = title.trim_end_matches('.').trim().to_string();
    if title.is_empty() {
        return None;
    }

    let authors: Vec<String> = entry
        .select(&AUTHOR)
        .map(element_text)
        .filter(|name| !name.is_empty())
        .collect();

    let venue = entry
        .select(&PART_OF)
        .map(element_text)
        .collect::<Vec<_>>()
        .join(" ");
    let venue = if venue.trim().is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        venue
    };

    let year = entry
        .select(&DATE)
        .next()
        .map(element_text)
        .unwrap_or_else(|| section_year.to_string());

    let link = entry
        .select(&LINK)
        .filter_map(|a| a.value().attr("href"))
        .find(|href| href.starts_with("http"))
        .map(str::to_string);

    Some(RawPublication {
        title,
        authors: RawAuthors::List(authors),
        year,
        venue,
        citations: RawCitations::Missing,
        link,
        source_type_hint: type_hint(entry),
    })
}

/// Publication type from the entry's icon, falling back to its CSS class.
fn type_hint(entry: ElementRef<'_>) -> Option<String> {
    let icon = entry.select(&TYPE_ICON).find_map(|img| {
        let el = img.value();
        el.attr("title")
            .or_else(|| el.attr("alt"))
            .map(str::to_string)
    });
    if icon.is_some() {
        return icon;
    }

    entry.value().classes().find_map(|class| match class {
        "article" => Some("Journal Articles".to_string()),
        "inproceedings" => Some("Conference and Workshop Papers".to_string()),
        "informal" => Some("Informal and Other Publications".to_string()),
        "book" | "incollection" | "editor" | "proceedings" | "phdthesis" => {
            Some(class.to_string())
        }
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body><div id="publ-section"><ul class="publ-list">
          <li class="year">2021</li>
          <li class="entry article toc" id="journals/jmlr/Smith21">
            <div class="box"><img alt="" title="Journal Articles" src="x.png"></div>
            <nav class="publ"><ul><li class="drop-down"><div class="head">
              <a href="https://doi.org/10.1000/jmlr.1">ee</a></div></li></ul></nav>
            <cite class="data" itemprop="headline">
              <span itemprop="author"><a><span itemprop="name">Alice Smith</span></a></span>,
              <span itemprop="author"><a><span itemprop="name">Bob Jones</span></a></span>:
              <span class="title" itemprop="name">Sparse Models at Scale.</span>
              <a><span itemprop="isPartOf"><span itemprop="name">J. Mach. Learn. Res.</span></span>
              <span itemprop="isPartOf"><span itemprop="volumeNumber">22</span></span></a>
              <span itemprop="datePublished">2021</span>
            </cite>
          </li>
          <li class="year">2019</li>
          <li class="entry inproceedings" id="conf/icml/Smith19">
            <cite class="data">
              <span itemprop="author"><a><span itemprop="name">Alice Smith</span></a></span>:
              <span class="title" itemprop="name">Fast Kernels.</span>
              <span itemprop="isPartOf"><span itemprop="name">ICML</span></span>
            </cite>
          </li>
          <li class="entry informal" id="broken">
            <cite class="data"><span itemprop="author">Nobody</span></cite>
          </li>
        </ul></div></body></html>
    "#;

    #[test]
    fn test_extracts_entries_with_section_years() {
        let extraction = DblpExtractor.extract(PAGE);
        assert_eq!(extraction.records.len(), 2);
        assert_eq!(extraction.skipped, 1);

        let first = &extraction.records[0];
        assert_eq!(first.title, "Sparse Models at Scale");
        assert_eq!(
            first.authors,
            RawAuthors::List(vec!["Alice Smith".into(), "Bob Jones".into()])
        );
        assert_eq!(first.venue, "J. Mach. Learn. Res. 22");
        assert_eq!(first.year, "2021");
        assert_eq!(first.citations, RawCitations::Missing);
        assert_eq!(
            first.link.as_deref(),
            Some("https://doi.org/10.1000/jmlr.1")
        );
        assert_eq!(first.source_type_hint.as_deref(), Some("Journal Articles"));

        let second = &extraction.records[1];
        assert_eq!(second.year, "2019");
        assert_eq!(second.venue, "ICML");
        assert_eq!(second.link, None);
        assert_eq!(
            second.source_type_hint.as_deref(),
            Some("Conference and Workshop Papers")
        );
    }

    #[test]
    fn test_single_page_listing() {
        assert!(!DblpExtractor.has_more(PAGE));
    }
}
