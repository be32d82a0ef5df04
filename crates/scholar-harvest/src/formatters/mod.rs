//! Report rendering and report files.
//!
//! Renderers return `String`s; [`ReportSink`] owns file naming and writes them.

mod csv;
mod json;
mod markdown;

pub use self::csv::{csv_escape, format_csv};
pub use self::json::{compact_publication, format_json};
pub use self::markdown::format_markdown;

use std::path::{Path, PathBuf};

use crate::classify::partition_by_category;
use crate::error::PipelineResult;
use crate::models::{Category, Publication, RawPublication, ReportFormat};
use crate::processing::YearRange;

/// Render publications in `format`. The category column or field is
/// included when `with_category` is set.
#[must_use]
pub fn render(
    publications: &[Publication],
    format: ReportFormat,
    title: &str,
    with_category: bool,
) -> String {
    match format {
        ReportFormat::Csv => format_csv(publications, with_category),
        ReportFormat::Json => format_json(publications, with_category),
        ReportFormat::Markdown => format_markdown(publications, title, with_category),
    }
}

/// Report file name: `{label}_publications_{start}_{end}.{ext}`, or
/// `{label}_{category}_publications_...` for a category split. Without a
/// range, `all` stands in for the years.
#[must_use]
pub fn report_file_name(
    label: &str,
    category: Option<Category>,
    range: Option<YearRange>,
    format: ReportFormat,
) -> String {
    let label = file_label(label);
    let years = range.map_or_else(
        || "all".to_string(),
        |r| format!("{}_{}", r.start(), r.end()),
    );
    let ext = format.extension();
    match category {
        Some(category) => format!("{label}_{category}_publications_{years}.{ext}"),
        None => format!("{label}_publications_{years}.{ext}"),
    }
}

/// Label reduced to characters safe in a file name.
#[must_use]
pub fn file_label(label: &str) -> String {
    let cleaned: String = label
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "profile".to_string()
    } else {
        cleaned
    }
}

/// Writes report files into one directory.
#[derive(Debug, Clone)]
pub struct ReportSink {
    dir: PathBuf,
    format: ReportFormat,
    split_by_category: bool,
}

impl ReportSink {
    /// Create a sink writing `format` files into `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, format: ReportFormat, split_by_category: bool) -> Self {
        Self {
            dir: dir.into(),
            format,
            split_by_category,
        }
    }

    /// Write one profile's report, returning the files written.
    ///
    /// With category splitting on, one file per non-empty category is
    /// written; otherwise a single file with a category column.
    ///
    /// # Errors
    ///
    /// Returns error if the directory or a file cannot be written.
    pub fn write(
        &self,
        label: &str,
        range: Option<YearRange>,
        publications: &[Publication],
    ) -> PipelineResult<Vec<PathBuf>> {
        std::fs::create_dir_all(&self.dir)?;

        let with_category = publications.iter().any(|p| p.category.is_classified());
        let years = range.map_or_else(|| "all years".to_string(), |r| r.to_string());

        if !self.split_by_category {
            let title = format!("{label} publications ({years})");
            let name = report_file_name(label, None, range, self.format);
            let path = self.dir.join(name);
            let body = render(publications, self.format, &title, with_category);
            std::fs::write(&path, body)?;
            tracing::info!(path = %path.display(), count = publications.len(), "Wrote report");
            return Ok(vec![path]);
        }

        let split = partition_by_category(publications);
        let mut written = Vec::new();
        for (category, members) in split.buckets() {
            let title = format!("{label} {category} publications ({years})");
            let name = report_file_name(label, Some(category), range, self.format);
            let path = self.dir.join(name);
            std::fs::write(&path, render(members, self.format, &title, false))?;
            tracing::info!(
                path = %path.display(),
                %category,
                count = members.len(),
                "Wrote report"
            );
            written.push(path);
        }
        Ok(written)
    }
}

/// Save raw records as pretty JSON for later reprocessing.
///
/// # Errors
///
/// Returns error if serialization or the write fails.
pub fn save_raw_records(path: &Path, records: &[RawPublication]) -> PipelineResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, serde_json::to_string_pretty(records)?)?;
    tracing::info!(path = %path.display(), count = records.len(), "Saved raw records");
    Ok(())
}

/// Load raw records saved by [`save_raw_records`] or written by hand.
///
/// # Errors
///
/// Returns error if the file cannot be read or is not a JSON array of records.
pub fn load_raw_records(path: &Path) -> PipelineResult<Vec<RawPublication>> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_file_names() {
        let range = YearRange::new(2010, 2020).ok();
        assert_eq!(
            report_file_name("Jane Doe", None, range, ReportFormat::Csv),
            "Jane_Doe_publications_2010_2020.csv"
        );
        assert_eq!(
            report_file_name(
                "Jane Doe",
                Some(Category::Journal),
                range,
                ReportFormat::Markdown
            ),
            "Jane_Doe_journal_publications_2010_2020.md"
        );
        assert_eq!(
            report_file_name("x/../y", None, None, ReportFormat::Json),
            "x____y_publications_all.json"
        );
        assert_eq!(
            report_file_name("  ", None, None, ReportFormat::Csv),
            "profile_publications_all.csv"
        );
    }
}
