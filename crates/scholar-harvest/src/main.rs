//! Scholar Harvest - Entry Point
//!
//! `harvest` reads profiles over HTTP; `process` reworks saved raw records or
//! saved listing pages.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Datelike;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use scholar_harvest::{
    Classifier, Config, HttpPageFetcher, Pipeline, PipelineError, PipelineOptions, StaticPages,
    extract::extractor_for,
    fetch::HarvestLimits,
    formatters::{ReportSink, file_label, load_raw_records, save_raw_records},
    models::{ClassifierMode, ListingSource, RawPublication, ReportFormat},
    pipeline::{ProfileJob, ProfileReport},
    processing::YearRange,
};

#[derive(Parser, Debug)]
#[command(name = "scholar-harvest")]
#[command(about = "Aggregate, deduplicate, classify and rank publication records")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    report: ReportArgs,

    /// API key for the classification model
    #[arg(
        long,
        global = true,
        env = "SCHOLAR_HARVEST_MODEL_API_KEY",
        hide_env_values = true
    )]
    api_key: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch profiles over HTTP and write reports
    Harvest {
        /// Profile as `LABEL=URL` or a bare URL (repeatable)
        #[arg(long = "profile", required = true, value_parser = parse_profile)]
        profiles: Vec<ProfileArg>,

        /// Listing service, when the URL host does not say
        #[arg(long, value_enum)]
        source: Option<ListingSource>,

        /// Also save raw records as JSON into this directory
        #[arg(long)]
        raw_out: Option<PathBuf>,
    },

    /// Process saved raw JSON records or saved listing pages
    Process {
        /// Raw record files; files sharing a label are merged into one report
        #[arg(long = "raw", conflicts_with = "pages")]
        raw: Vec<PathBuf>,

        /// Saved listing pages for one profile, in page order
        #[arg(long = "page")]
        pages: Vec<PathBuf>,

        /// Listing service the saved pages come from
        #[arg(long, value_enum, default_value = "scholar")]
        source: ListingSource,

        /// Report label. Defaults to "profile" for saved pages and to the
        /// file name for raw records; given with several `--raw` files, all of
        /// them are merged under it
        #[arg(long)]
        label: Option<String>,
    },
}

#[derive(Args, Debug)]
struct ReportArgs {
    /// First year to include
    #[arg(long, global = true, requires = "end_year")]
    start_year: Option<i32>,

    /// Last year to include
    #[arg(long, global = true, requires = "start_year")]
    end_year: Option<i32>,

    /// Include only the last N years, current year included
    #[arg(long, global = true, conflicts_with_all = ["start_year", "end_year"])]
    last_years: Option<u16>,

    /// Classification mode (defaults to hybrid when a model key is set, else rules)
    #[arg(long, global = true, value_enum)]
    classifier: Option<ClassifierMode>,

    /// Skip classification entirely
    #[arg(long, global = true)]
    no_classify: bool,

    /// Report format
    #[arg(long, global = true, value_enum, default_value = "csv")]
    format: ReportFormat,

    /// Directory for report files
    #[arg(long, global = true, default_value = "reports")]
    output_dir: PathBuf,

    /// Write one file per category
    #[arg(long, global = true)]
    split_by_category: bool,

    /// Concurrent classification calls
    #[arg(long, global = true)]
    concurrency: Option<usize>,
}

impl ReportArgs {
    fn year_range(&self) -> Result<Option<YearRange>, PipelineError> {
        if let Some(years) = self.last_years {
            let end = chrono::Local::now().year();
            let start = end - i32::from(years.max(1)) + 1;
            return YearRange::new(start, end).map(Some);
        }
        match (self.start_year, self.end_year) {
            (Some(start), Some(end)) => YearRange::new(start, end).map(Some),
            _ => Ok(None),
        }
    }
}

#[derive(Debug, Clone)]
struct ProfileArg {
    label: String,
    url: String,
}

fn parse_profile(value: &str) -> Result<ProfileArg, String> {
    let (label, url) = match value.split_once('=') {
        Some((label, url)) if !label.contains('/') && !label.contains('?') => {
            (label.trim().to_string(), url.trim().to_string())
        }
        _ => (String::new(), value.trim().to_string()),
    };

    let parsed = url::Url::parse(&url)
        .map_err(|e| format!("invalid profile URL '{url}': {e}"))?;
    let label = if label.is_empty() {
        label_from_url(&parsed)
    } else {
        label
    };
    Ok(ProfileArg { label, url })
}

/// Scholar user id, else the last path segment.
fn label_from_url(url: &url::Url) -> String {
    url.query_pairs()
        .find(|(k, _)| *k == "user")
        .map(|(_, v)| v.into_owned())
        .or_else(|| {
            url.path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
                .map(|s| s.trim_end_matches(".html").to_string())
                .filter(|s| !s.is_empty())
        })
        .unwrap_or_else(|| "profile".to_string())
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        let layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr);
        subscriber.with(layer).init();
    } else {
        let layer = tracing_subscriber::fmt::layer()
            .compact()
            .with_writer(std::io::stderr);
        subscriber.with(layer).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting scholar-harvest");

    let mut config = Config::from_env()?;
    if cli.api_key.is_some() {
        config.model.api_key = cli.api_key.clone();
    }
    if let Some(concurrency) = cli.report.concurrency {
        config.classify_concurrency = concurrency.max(1);
    }

    let year_range = cli
        .report
        .year_range()
        .map_err(|e| anyhow::anyhow!(e.to_user_message()))?;

    let mode = cli.report.classifier.unwrap_or(if config.has_model() {
        ClassifierMode::Hybrid
    } else {
        ClassifierMode::Rules
    });
    let classifier = Classifier::from_config(&config, mode)?;
    let options = PipelineOptions {
        year_range,
        classify: !cli.report.no_classify,
    };
    let pipeline = Pipeline::new(classifier, options);
    let sink = ReportSink::new(
        &cli.report.output_dir,
        cli.report.format,
        cli.report.split_by_category,
    );

    match cli.command {
        Command::Harvest {
            profiles,
            source,
            raw_out,
        } => {
            let limits = HarvestLimits::from_config(&config.fetch);
            let mut jobs = Vec::with_capacity(profiles.len());
            for profile in profiles {
                let fetcher = match source {
                    Some(source) => HttpPageFetcher::new(&profile.url, source, &config.fetch),
                    None => HttpPageFetcher::for_locator(&profile.url, &config.fetch),
                };
                match fetcher {
                    Ok(fetcher) => jobs.push(ProfileJob {
                        label: profile.label,
                        extractor: extractor_for(fetcher.source()),
                        fetcher: Box::new(fetcher),
                    }),
                    Err(err) => {
                        tracing::warn!(profile = %profile.label, error = %err, "Skipping profile");
                    }
                }
            }

            let reports = pipeline.run_batch(jobs, limits).await;
            for report in &reports {
                if let Some(dir) = &raw_out {
                    let path = dir.join(format!("{}_raw.json", file_label(&report.label)));
                    save_raw_records(&path, &report.raw)?;
                }
                write_report(&sink, report, year_range)?;
            }
        }
        Command::Process {
            raw,
            pages,
            source,
            label,
        } => {
            if raw.is_empty() && pages.is_empty() {
                let err = PipelineError::missing_input("pass --raw files or --page files");
                anyhow::bail!(err.to_user_message());
            }

            if !pages.is_empty() {
                let fetcher = StaticPages::from_files(&pages)
                    .await
                    .context("Failed to read saved pages")?;
                let job = ProfileJob {
                    label: label.clone().unwrap_or_else(|| "profile".to_string()),
                    fetcher: Box::new(fetcher),
                    extractor: extractor_for(source),
                };
                let limits = HarvestLimits {
                    max_pages: u32::try_from(pages.len()).unwrap_or(u32::MAX),
                    ..HarvestLimits::from_config(&config.fetch)
                };
                let report = pipeline.run_profile(job, limits).await;
                write_report(&sink, &report, year_range)?;
            }

            let mut researchers: Vec<(String, Vec<RawPublication>)> = Vec::new();
            for path in &raw {
                let records = load_raw_records(path)
                    .with_context(|| format!("Failed to load {}", path.display()))?;
                let name = label.clone().unwrap_or_else(|| raw_label(path));
                match researchers.iter_mut().find(|(seen, _)| *seen == name) {
                    Some((_, merged)) => merged.extend(records),
                    None => researchers.push((name, records)),
                }
            }

            for (label, records) in researchers {
                let report = pipeline.process(&records).await;
                for failure in &report.failures {
                    tracing::warn!(
                        profile = %label,
                        title = %failure.title,
                        "Unclassified after retries"
                    );
                }
                let files = sink.write(&label, year_range, &report.publications)?;
                print_written(&label, report.publications.len(), &files);
            }
        }
    }

    Ok(())
}

fn write_report(
    sink: &ReportSink,
    report: &ProfileReport,
    year_range: Option<YearRange>,
) -> anyhow::Result<()> {
    let files = sink.write(&report.label, year_range, &report.report.publications)?;
    print_written(&report.label, report.report.publications.len(), &files);
    for warning in &report.warnings {
        eprintln!("warning: {warning}");
    }
    Ok(())
}

fn print_written(label: &str, count: usize, files: &[PathBuf]) {
    println!("{label}: {count} publications");
    for file in files {
        println!("  {}", file.display());
    }
}

/// `jane_raw.json` → `jane`.
fn raw_label(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().trim_end_matches("_raw").to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "profile".to_string())
}
