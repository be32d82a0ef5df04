//! CSV output.

use crate::models::Publication;

/// Format publications as CSV with columns
/// `year,citations,title,authors,venue[,category]`.
#[must_use]
pub fn format_csv(publications: &[Publication], with_category: bool) -> String {
    let mut output = String::from("year,citations,title,authors,venue");
    if with_category {
        output.push_str(",category");
    }
    output.push('\n');

    for publication in publications {
        let year = publication.year.map_or_else(String::new, |y| y.to_string());
        let title = csv_escape(publication.title_for_display());
        let authors = csv_escape(&publication.author_names());
        let venue = csv_escape(&publication.venue);

        output.push_str(&format!(
            "{year},{},{title},{authors},{venue}",
            publication.citations
        ));
        if with_category {
            output.push(',');
            output.push_str(publication.category.as_str());
        }
        output.push('\n');
    }

    output
}

/// Quote a CSV field when needed and neutralise spreadsheet formulas.
#[must_use]
pub fn csv_escape(s: &str) -> String {
    let formula = s.starts_with(['=', '+', '-', '@']);
    let needs_quotes = s.contains([',', '"', '\n', '\r']);

    match (needs_quotes, formula) {
        (true, true) => format!("\"'{}\"", s.replace('"', "\"\"")),
        (true, false) => format!("\"{}\"", s.replace('"', "\"\"")),
        (false, true) => format!("'{s}"),
        (false, false) => s.to_string(),
    }
}
