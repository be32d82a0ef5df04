//! End-to-end runs: harvest, normalize, deduplicate, filter, classify, organize.

use serde::Serialize;

use crate::classify::{ClassificationFailure, Classifier};
use crate::extract::RecordExtractor;
use crate::fetch::{Harvest, HarvestLimits, PageFetcher, Termination, harvest};
use crate::models::{Publication, RawPublication};
use crate::processing::{YearRange, deduplicate, filter_by_year, normalize_all, organize};

/// Options for one processing run.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions {
    /// Keep only publications in this range. `None` keeps every year,
    /// unknown years included.
    pub year_range: Option<YearRange>,

    /// Run the classifier. When off, categories stay unclassified.
    pub classify: bool,
}

/// Record counts after each stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StageCounts {
    /// Raw records in.
    pub raw: usize,
    /// Distinct publications after deduplication.
    pub unique: usize,
    /// Publications left after the year filter.
    pub in_range: usize,
    /// Publications with a decided category.
    pub classified: usize,
}

/// Result of processing one set of raw records.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Final publications in report order.
    pub publications: Vec<Publication>,

    /// Stage counts.
    pub counts: StageCounts,

    /// Publications the model tier could not classify.
    pub failures: Vec<ClassificationFailure>,
}

/// Harvest outcome for one listing source of a researcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceSummary {
    /// Extractor that read the pages.
    pub extractor: &'static str,

    /// Pages fetched.
    pub pages: u32,

    /// Malformed entries skipped during extraction.
    pub skipped: usize,

    /// Raw records gathered.
    pub records: usize,

    /// Why pagination stopped.
    pub termination: Termination,
}

/// Result for one researcher, merged across every listing source.
#[derive(Debug, Clone)]
pub struct ProfileReport {
    /// Researcher label used in logs and file names.
    pub label: String,

    /// One entry per listing source, in the order they ran.
    pub sources: Vec<SourceSummary>,

    /// Raw records from all sources, for saving and later reprocessing.
    pub raw: Vec<RawPublication>,

    /// Processed result.
    pub report: RunReport,

    /// Non-fatal problems worth telling the user about.
    pub warnings: Vec<String>,
}

impl ProfileReport {
    /// Pages fetched across sources.
    #[must_use]
    pub fn pages(&self) -> u32 {
        self.sources.iter().map(|s| s.pages).sum()
    }

    /// Malformed entries skipped across sources.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.sources.iter().map(|s| s.skipped).sum()
    }

    /// Check if every source was read to its end.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.sources.iter().all(|s| s.termination.is_complete())
    }
}

/// One listing source to harvest for a researcher.
///
/// Jobs sharing a label belong to the same researcher and are merged before
/// deduplication.
pub struct ProfileJob {
    /// Researcher label used in logs and file names.
    pub label: String,

    /// Page source for the profile.
    pub fetcher: Box<dyn PageFetcher>,

    /// Extractor matching the page source.
    pub extractor: Box<dyn RecordExtractor>,
}

impl std::fmt::Debug for ProfileJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileJob")
            .field("label", &self.label)
            .field("extractor", &self.extractor.name())
            .finish_non_exhaustive()
    }
}

/// Processing pipeline with a fixed classifier and options.
#[derive(Debug, Clone)]
pub struct Pipeline {
    classifier: Classifier,
    options: PipelineOptions,
}

impl Pipeline {
    /// Create a pipeline.
    #[must_use]
    pub const fn new(classifier: Classifier, options: PipelineOptions) -> Self {
        Self {
            classifier,
            options,
        }
    }

    /// Process raw records into the final report order.
    pub async fn process(&self, raw: &[RawPublication]) -> RunReport {
        let mut counts = StageCounts {
            raw: raw.len(),
            ..StageCounts::default()
        };

        let publications = deduplicate(normalize_all(raw));
        counts.unique = publications.len();

        let publications = match self.options.year_range {
            Some(range) => filter_by_year(publications, range),
            None => publications,
        };
        counts.in_range = publications.len();

        let (publications, failures) = if self.options.classify {
            let report = self.classifier.classify_all(publications).await;
            (report.publications, report.failures)
        } else {
            (publications, Vec::new())
        };
        counts.classified = publications
            .iter()
            .filter(|p| p.category.is_classified())
            .count();

        let publications = organize(publications);

        tracing::info!(
            raw = counts.raw,
            unique = counts.unique,
            in_range = counts.in_range,
            classified = counts.classified,
            failed = failures.len(),
            "Processed publications"
        );

        RunReport {
            publications,
            counts,
            failures,
        }
    }

    /// Harvest one listing source and process whatever was gathered.
    pub async fn run_profile(&self, job: ProfileJob, limits: HarvestLimits) -> ProfileReport {
        let label = job.label.clone();
        self.run_researcher(label, vec![job], limits).await
    }

    /// Harvest every source of one researcher, then process the combined
    /// records as one set so duplicates across sources collapse.
    ///
    /// A source that fails keeps its partial records and adds a warning; the
    /// remaining sources still run.
    pub async fn run_researcher(
        &self,
        label: String,
        jobs: Vec<ProfileJob>,
        limits: HarvestLimits,
    ) -> ProfileReport {
        let mut raw = Vec::new();
        let mut sources = Vec::with_capacity(jobs.len());
        let mut warnings = Vec::new();

        for mut job in jobs {
            let name = job.extractor.name();
            tracing::info!(profile = %label, extractor = name, "Harvesting source");
            let Harvest {
                records,
                pages,
                skipped,
                termination,
            } = harvest(job.fetcher.as_mut(), job.extractor.as_ref(), limits).await;

            if !termination.is_complete() {
                warnings.push(format!(
                    "{label} ({name}): stopped after {pages} page(s), {termination}; \
                     results are partial"
                ));
            }
            if skipped > 0 {
                warnings.push(format!(
                    "{label} ({name}): {skipped} malformed entries skipped"
                ));
            }

            sources.push(SourceSummary {
                extractor: name,
                pages,
                skipped,
                records: records.len(),
                termination,
            });
            raw.extend(records);
        }

        let report = self.process(&raw).await;
        if !report.failures.is_empty() {
            warnings.push(format!(
                "{label}: {} publication(s) could not be classified",
                report.failures.len()
            ));
        }

        for warning in &warnings {
            tracing::warn!(profile = %label, "{warning}");
        }

        ProfileReport {
            label,
            sources,
            raw,
            report,
            warnings,
        }
    }

    /// Run every researcher in order. Jobs sharing a label are merged into
    /// one report, kept at the position of the label's first job. A failing
    /// source produces warnings and partial results; the others still run.
    pub async fn run_batch(
        &self,
        jobs: Vec<ProfileJob>,
        limits: HarvestLimits,
    ) -> Vec<ProfileReport> {
        let groups = group_by_label(jobs);
        let total = groups.len();
        let mut reports = Vec::with_capacity(total);

        for (index, (label, jobs)) in groups.into_iter().enumerate() {
            tracing::info!(
                profile = %label,
                sources = jobs.len(),
                index = index + 1,
                total,
                "Starting profile"
            );
            reports.push(self.run_researcher(label, jobs, limits).await);
        }

        reports
    }
}

/// Group jobs by label, in order of each label's first appearance.
fn group_by_label(jobs: Vec<ProfileJob>) -> Vec<(String, Vec<ProfileJob>)> {
    let mut groups: Vec<(String, Vec<ProfileJob>)> = Vec::new();
    for job in jobs {
        match groups.iter_mut().find(|(label, _)| *label == job.label) {
            Some((_, members)) => members.push(job),
            None => groups.push((job.label.clone(), vec![job])),
        }
    }
    groups
}
