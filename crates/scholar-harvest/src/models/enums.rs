//! Enumeration types for publication categories and run options.

use serde::{Deserialize, Serialize};

/// Publication category assigned by the classifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Not classified yet, or classification failed.
    #[default]
    Unclassified,
    /// Journal article.
    Journal,
    /// Conference or workshop paper.
    Conference,
    /// Anything else (preprints, reports, theses, ...).
    Other,
}

impl Category {
    /// Lower-case label used in reports and file names.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unclassified => "unclassified",
            Self::Journal => "journal",
            Self::Conference => "conference",
            Self::Other => "other",
        }
    }

    /// Check whether a category has been decided.
    #[must_use]
    pub const fn is_classified(self) -> bool {
        !matches!(self, Self::Unclassified)
    }

    /// Parse a model answer. Only the two venue kinds are accepted.
    #[must_use]
    pub fn from_model_answer(answer: &str) -> Option<Self> {
        let answer = answer.trim();
        if answer.eq_ignore_ascii_case("journal") {
            Some(Self::Journal)
        } else if answer.eq_ignore_ascii_case("conference") {
            Some(Self::Conference)
        } else {
            None
        }
    }

    /// Interpret a listing-provided type label, e.g. DBLP's section icons.
    #[must_use]
    pub fn from_hint(hint: &str) -> Option<Self> {
        let hint = hint.trim().to_lowercase();
        if hint.is_empty() || hint == "n/a" {
            None
        } else if hint.contains("journal") || hint == "article" {
            Some(Self::Journal)
        } else if hint.contains("conference") || hint.contains("inproceedings") {
            Some(Self::Conference)
        } else {
            Some(Self::Other)
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the classifier decides categories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierMode {
    /// Venue rules only; unmatched venues become `other`.
    #[default]
    Rules,
    /// Venue rules first, remote model for whatever the rules leave open.
    Hybrid,
    /// Remote model for every publication.
    Model,
}

impl ClassifierMode {
    /// Check if this mode calls the remote model.
    #[must_use]
    pub const fn uses_model(self) -> bool {
        !matches!(self, Self::Rules)
    }
}

/// Listing service a profile locator points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ListingSource {
    /// Google Scholar citations profile (paginated table).
    Scholar,
    /// DBLP person page (single page).
    Dblp,
}

impl ListingSource {
    /// Guess the source from a profile URL.
    #[must_use]
    pub fn detect(locator: &str) -> Option<Self> {
        let host = url::Url::parse(locator).ok()?.host_str()?.to_lowercase();
        if host.starts_with("scholar.google.") {
            Some(Self::Scholar)
        } else if host == "dblp.org" || host.ends_with(".dblp.org") || host.starts_with("dblp.") {
            Some(Self::Dblp)
        } else {
            None
        }
    }

    /// Check if the listing is split across pages.
    #[must_use]
    pub const fn is_paginated(self) -> bool {
        matches!(self, Self::Scholar)
    }
}

/// Output format for reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Comma-separated values.
    #[default]
    Csv,
    /// JSON array of records.
    Json,
    /// Markdown grouped by year.
    Markdown,
}

impl ReportFormat {
    /// Get the file extension for this format.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Markdown => "md",
        }
    }
}
