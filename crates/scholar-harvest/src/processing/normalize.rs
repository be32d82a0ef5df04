//! Raw record canonicalisation.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{
    Category, NOT_AVAILABLE, Publication, RawAuthors, RawCitations, RawPublication,
};

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Markers listing pages use for a truncated author list.
const TRUNCATION_MARKERS: &[&str] = &["...", "\u{2026}"];

/// Turn a raw record into a [`Publication`]. Never fails.
#[must_use]
pub fn normalize(raw: &RawPublication) -> Publication {
    let display_title = clean_text(&raw.title);

    Publication {
        title: display_title.to_lowercase(),
        display_title,
        authors: normalize_authors(&raw.authors),
        year: parse_year(&raw.year),
        venue: clean_text(&raw.venue),
        citations: parse_citations(&raw.citations),
        category: Category::Unclassified,
        link: raw
            .link
            .as_deref()
            .map(str::trim)
            .filter(|l| !is_absent(l))
            .map(str::to_string),
        source_hint: raw
            .source_type_hint
            .as_deref()
            .and_then(Category::from_hint),
    }
}

/// Normalize a batch, preserving order.
#[must_use]
pub fn normalize_all(raws: &[RawPublication]) -> Vec<Publication> {
    raws.iter().map(normalize).collect()
}

/// Split a byline into trimmed names.
#[must_use]
pub fn normalize_authors(authors: &RawAuthors) -> Vec<String> {
    let names: Vec<&str> = match authors {
        RawAuthors::Joined(joined) => joined.split(',').collect(),
        RawAuthors::List(list) => list.iter().map(String::as_str).collect(),
    };

    names
        .into_iter()
        .map(clean_text)
        .filter(|name| {
            !is_absent(name) && !TRUNCATION_MARKERS.contains(&name.as_str())
        })
        .collect()
}

/// Four ASCII digits, otherwise `None`.
#[must_use]
pub fn parse_year(year: &str) -> Option<i32> {
    let year = year.trim();
    if year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit()) {
        year.parse().ok()
    } else {
        None
    }
}

/// Citation count; anything unparsable or negative is zero.
#[must_use]
pub fn parse_citations(citations: &RawCitations) -> u32 {
    match citations {
        RawCitations::Count(n) => u32::try_from((*n).max(0)).unwrap_or(u32::MAX),
        RawCitations::Text(text) => text.trim().parse().unwrap_or(0),
        RawCitations::Missing => 0,
    }
}

fn clean_text(text: &str) -> String {
    let text = WHITESPACE.replace_all(text.trim(), " ");
    if is_absent(&text) {
        String::new()
    } else {
        text.into_owned()
    }
}

fn is_absent(text: &str) -> bool {
    text.is_empty() || text.eq_ignore_ascii_case(NOT_AVAILABLE)
}
