//! Raw listing records and the canonical publication model.

use serde::{Deserialize, Deserializer, Serialize};

use super::Category;

/// Placeholder written by extractors when a field is absent.
pub const NOT_AVAILABLE: &str = "N/A";

/// Authors as found on a listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAuthors {
    /// Already split into names.
    List(Vec<String>),
    /// One delimiter-joined string, e.g. `"A Smith, B Jones"`.
    Joined(String),
}

impl Default for RawAuthors {
    fn default() -> Self {
        Self::Joined(NOT_AVAILABLE.to_string())
    }
}

impl From<&str> for RawAuthors {
    fn from(value: &str) -> Self {
        Self::Joined(value.to_string())
    }
}

impl From<Vec<String>> for RawAuthors {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// Citation count as found on a listing page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawCitations {
    /// Numeric value.
    Count(i64),
    /// Text value, possibly a sentinel like `"N/A"`.
    Text(String),
    /// No value at all.
    #[default]
    Missing,
}

impl From<i64> for RawCitations {
    fn from(value: i64) -> Self {
        Self::Count(value)
    }
}

impl From<&str> for RawCitations {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// An unvalidated record extracted from one listing page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPublication {
    /// Title text as shown.
    #[serde(default = "not_available")]
    pub title: String,

    /// Author byline.
    #[serde(default)]
    pub authors: RawAuthors,

    /// Year text as shown.
    #[serde(default = "not_available", deserialize_with = "text_or_number")]
    pub year: String,

    /// Venue text as shown.
    #[serde(default = "not_available")]
    pub venue: String,

    /// Citation count.
    #[serde(default)]
    pub citations: RawCitations,

    /// Link to the publication page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    /// Type label detected by the extractor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_type_hint: Option<String>,
}

fn not_available() -> String {
    NOT_AVAILABLE.to_string()
}

/// Saved records from other tools sometimes carry the year as a number.
fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(not_available()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

/// Canonical publication record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
    /// Lower-cased, trimmed title used for identity.
    pub title: String,

    /// Trimmed title with original casing.
    pub display_title: String,

    /// Author names in byline order.
    pub authors: Vec<String>,

    /// Four-digit publication year, if the source had one.
    pub year: Option<i32>,

    /// Venue name.
    pub venue: String,

    /// Citation count.
    pub citations: u32,

    /// Assigned category.
    #[serde(default)]
    pub category: Category,

    /// Link to the publication page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    /// Category suggested by the listing itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_hint: Option<Category>,
}

impl Publication {
    /// Key under which two records count as the same publication.
    #[must_use]
    pub fn identity_key(&self) -> IdentityKey {
        IdentityKey {
            title: self.title.trim().to_lowercase(),
            authors: self
                .authors
                .iter()
                .map(|a| a.trim().to_lowercase())
                .collect(),
            year: self.year,
        }
    }

    /// Get author names as a comma-separated string.
    #[must_use]
    pub fn author_names(&self) -> String {
        self.authors.join(", ")
    }

    /// Title for display, falling back to the identity form.
    #[must_use]
    pub fn title_for_display(&self) -> &str {
        if self.display_title.is_empty() {
            &self.title
        } else {
            &self.display_title
        }
    }

    /// Year as a report label; unknown years read "Unknown".
    #[must_use]
    pub fn year_label(&self) -> String {
        self.year
            .map_or_else(|| "Unknown".to_string(), |y| y.to_string())
    }
}

/// Identity of a publication: `(title, authors, year)`, case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    /// Lower-cased title.
    pub title: String,
    /// Lower-cased author names in byline order.
    pub authors: Vec<String>,
    /// Year, `None` when unparsable.
    pub year: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_publication_deserialize_mixed_shapes() {
        let json = r#"[
            {"title": "A", "authors": "X, Y", "year": "2020", "venue": "V", "citations": "12"},
            {"title": "B", "authors": ["X", "Y"], "year": "2021", "venue": "V", "citations": 7},
            {"title": "C"},
            {"title": "D", "year": 2019}
        ]"#;

        let raws: Vec<RawPublication> = serde_json::from_str(json).unwrap();
        assert_eq!(raws[0].authors, RawAuthors::Joined("X, Y".into()));
        assert_eq!(raws[0].citations, RawCitations::Text("12".into()));
        assert_eq!(
            raws[1].authors,
            RawAuthors::List(vec!["X".into(), "Y".into()])
        );
        assert_eq!(raws[1].citations, RawCitations::Count(7));
        assert_eq!(raws[2].year, NOT_AVAILABLE);
        assert_eq!(raws[2].citations, RawCitations::Missing);
        assert_eq!(raws[3].year, "2019");
    }

    #[test]
    fn test_identity_key_is_case_insensitive() {
        let a = Publication {
            title: "deep learning".into(),
            authors: vec!["A. Smith".into()],
            year: Some(2019),
            ..Default::default()
        };
        let b = Publication {
            authors: vec!["a. smith".into()],
            ..a.clone()
        };
        assert_eq!(a.identity_key(), b.identity_key());
    }

    #[test]
    fn test_identity_key_keeps_unknown_year() {
        let a = Publication {
            title: "t".into(),
            year: None,
            ..Default::default()
        };
        let b = Publication {
            title: "t".into(),
            year: Some(2020),
            ..Default::default()
        };
        assert_ne!(a.identity_key(), b.identity_key());
        assert_eq!(a.identity_key().year, None);
    }

    #[test]
    fn test_display_helpers() {
        let p = Publication {
            title: "graph networks".into(),
            display_title: "Graph Networks".into(),
            authors: vec!["A".into(), "B".into()],
            ..Default::default()
        };
        assert_eq!(p.title_for_display(), "Graph Networks");
        assert_eq!(p.author_names(), "A, B");
        assert_eq!(p.year_label(), "Unknown");
    }
}
