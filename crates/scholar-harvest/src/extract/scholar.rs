//! Google Scholar profile listing extractor.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::{Extraction, RecordExtractor, element_text, first_number, selector};
use crate::config::defaults;
use crate::models::{NOT_AVAILABLE, RawAuthors, RawCitations, RawPublication};

static ROW: LazyLock<Selector> = LazyLock::new(|| selector("tr.gsc_a_tr"));
static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("a.gsc_a_at"));
static GRAY: LazyLock<Selector> = LazyLock::new(|| selector("div.gs_gray"));
static YEAR: LazyLock<Selector> = LazyLock::new(|| selector("td.gsc_a_y"));
static CITATIONS: LazyLock<Selector> = LazyLock::new(|| selector("td.gsc_a_c"));
static MORE_BUTTON: LazyLock<Selector> = LazyLock::new(|| selector("button#gsc_bpf_more"));

// Scholar appends ", 2015" to the venue line.
static YEAR_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*\d{4}\s*$").expect("valid year pattern"));

/// Extractor for `scholar.google.com/citations?user=...` tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScholarExtractor;

impl RecordExtractor for ScholarExtractor {
    fn name(&self) -> &'static str {
        "scholar"
    }

    fn extract(&self, page: &str) -> Extraction {
        let document = Html::parse_document(page);
        let mut extraction = Extraction::default();

        for row in document.select(&ROW) {
            match parse_row(row) {
                Some(record) => extraction.records.push(record),
                None => {
                    tracing::debug!(row = %row.html(), "Skipping Scholar row without a title");
                    extraction.skipped += 1;
                }
            }
        }

        extraction
    }

    fn has_more(&self, page: &str) -> bool {
        let document = Html::parse_document(page);
        document.select(&MORE_BUTTON).next().is_some_and(|button| {
            let el = button.value();
            el.attr("disabled").is_none() && !el.classes().any(|c| c.contains("disabled"))
        })
    }
}

fn parse_row(row: ElementRef<'_>) -> Option<RawPublication> {
    let anchor = row.select(&TITLE).next()?;
    let title = element_text(anchor);
    if title.is_empty() {
        return None;
    }

    let link = anchor.value().attr("href").map(absolute_link);

    let mut gray = row.select(&GRAY);
    let authors = gray
        .next()
        .map_or_else(|| NOT_AVAILABLE.to_string(), element_text);
    let venue = gray
        .next()
        .map(element_text)
        .map(|v| YEAR_SUFFIX.replace(&v, "").trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let year = row
        .select(&YEAR)
        .next()
        .map_or_else(|| NOT_AVAILABLE.to_string(), element_text);

    let citations = row
        .select(&CITATIONS)
        .next()
        .map(element_text)
        .and_then(|text| first_number(&text).map(str::to_string))
        .map_or_else(
            || RawCitations::Text(NOT_AVAILABLE.to_string()),
            RawCitations::Text,
        );

    Some(RawPublication {
        title,
        authors: RawAuthors::Joined(authors),
        year,
        venue,
        citations,
        link,
        source_type_hint: None,
    })
}

fn absolute_link(href: &str) -> String {
    if href.starts_with('/') {
        format!("{}{href}", defaults::SCHOLAR_BASE_URL)
    } else {
        href.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body><table id="gsc_a_t"><tbody id="gsc_a_b">
          <tr class="gsc_a_tr">
            <td class="gsc_a_t">
              <a href="/citations?view_op=view_citation&amp;citation_for_view=x:1" class="gsc_a_at">Deep   Learning</a>
              <div class="gs_gray">Y LeCun, Y Bengio, G Hinton</div>
              <div class="gs_gray">Nature 521 (7553), 436-444<span class="gs_oph">, 2015</span></div>
            </td>
            <td class="gsc_a_c"><a class="gsc_a_ac gs_ibl">75123</a></td>
            <td class="gsc_a_y"><span class="gsc_a_h gsc_a_hc gs_ibl">2015</span></td>
          </tr>
          <tr class="gsc_a_tr">
            <td class="gsc_a_t">
              <a href="/citations?view_op=view_citation&amp;citation_for_view=x:2" class="gsc_a_at">A Workshop Note</a>
              <div class="gs_gray">A Smith</div>
            </td>
            <td class="gsc_a_c"><a class="gsc_a_ac gs_ibl"></a></td>
            <td class="gsc_a_y"><span class="gsc_a_h gsc_a_hc gs_ibl"></span></td>
          </tr>
          <tr class="gsc_a_tr">
            <td class="gsc_a_t"><div class="gs_gray">orphan row</div></td>
          </tr>
        </tbody></table>
        <button id="gsc_bpf_more" class="gs_btnPD"><span>Show more</span></button>
        </body></html>
    "#;

    #[test]
    fn test_extracts_rows_and_counts_malformed() {
        let extraction = ScholarExtractor.extract(PAGE);
        assert_eq!(extraction.records.len(), 2);
        assert_eq!(extraction.skipped, 1);

        let first = &extraction.records[0];
        assert_eq!(first.title, "Deep Learning");
        assert_eq!(
            first.authors,
            RawAuthors::Joined("Y LeCun, Y Bengio, G Hinton".into())
        );
        assert_eq!(first.venue, "Nature 521 (7553), 436-444");
        assert_eq!(first.year, "2015");
        assert_eq!(first.citations, RawCitations::Text("75123".into()));
        let link = first.link.as_deref().unwrap();
        assert!(link.starts_with("https://scholar.google.com/citations"));
    }

    #[test]
    fn test_absent_fields_become_sentinels() {
        let extraction = ScholarExtractor.extract(PAGE);
        let second = &extraction.records[1];
        assert_eq!(second.venue, NOT_AVAILABLE);
        assert_eq!(second.year, "");
        assert_eq!(second.citations, RawCitations::Text(NOT_AVAILABLE.into()));
    }

    #[test]
    fn test_more_button_detection() {
        assert!(ScholarExtractor.has_more(PAGE));

        let disabled = r#"<button id="gsc_bpf_more" disabled>Show more</button>"#;
        assert!(!ScholarExtractor.has_more(disabled));

        assert!(!ScholarExtractor.has_more("<html><body></body></html>"));
    }

    #[test]
    fn test_garbage_page_yields_nothing() {
        let extraction = ScholarExtractor.extract("<<<not html at all");
        assert!(extraction.is_empty());
    }
}
