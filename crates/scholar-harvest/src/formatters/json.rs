//! JSON output.

use serde_json::{Value, json};

use crate::models::Publication;

/// Compact publication representation for JSON reports.
#[must_use]
pub fn compact_publication(publication: &Publication, with_category: bool) -> Value {
    let mut obj = json!({
        "year": publication.year,
        "citations": publication.citations,
        "title": publication.title_for_display(),
        "authors": publication.authors,
        "venue": publication.venue,
    });

    if with_category {
        obj["category"] = json!(publication.category);
    }

    if let Some(link) = &publication.link {
        obj["link"] = json!(link);
    }

    obj
}

/// Format publications as a pretty-printed JSON array.
#[must_use]
pub fn format_json(publications: &[Publication], with_category: bool) -> String {
    let items: Vec<Value> = publications
        .iter()
        .map(|p| compact_publication(p, with_category))
        .collect();
    serde_json::to_string_pretty(&items).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    #[test]
    fn test_compact_publication() {
        let p = Publication {
            title: "graph networks".into(),
            display_title: "Graph Networks".into(),
            authors: vec!["A".into()],
            year: None,
            venue: "ICML".into(),
            citations: 3,
            category: Category::Conference,
            link: Some("https://example.org/p".into()),
            ..Default::default()
        };

        let value = compact_publication(&p, true);
        assert_eq!(value["title"], "Graph Networks");
        assert_eq!(value["year"], Value::Null);
        assert_eq!(value["category"], "conference");
        assert_eq!(value["link"], "https://example.org/p");

        let value = compact_publication(&p, false);
        assert!(value.get("category").is_none());
    }

    #[test]
    fn test_format_json_empty() {
        assert_eq!(format_json(&[], false), "[]");
    }
}
