//! Scholar Harvest
//!
//! Aggregates a researcher's publication record from paginated listing pages
//! (Google Scholar profiles, DBLP person pages) into a clean, ranked report.
//!
//! # Pipeline
//!
//! - **Fetch**: pull listing pages one at a time through a [`fetch::PageFetcher`]
//! - **Extract**: turn each page into raw records, skipping malformed entries
//! - **Normalize**: canonical titles, author lists, years and citation counts
//! - **Deduplicate**: one record per `(title, authors, year)`, highest citations wins
//! - **Filter**: optional inclusive year range
//! - **Classify**: venue rules, optionally backed by a remote model with bounded retry
//! - **Organize**: year descending, citations descending, unknown years last
//!
//! # Example
//!
//! ```no_run
//! use scholar_harvest::{
//!     Classifier, Config, HttpPageFetcher, Pipeline, PipelineOptions,
//!     fetch::{HarvestLimits, harvest},
//!     extract::extractor_for,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let mut fetcher = HttpPageFetcher::for_locator(
//!         "https://scholar.google.com/citations?user=XXXX",
//!         &config.fetch,
//!     )?;
//!     let extractor = extractor_for(fetcher.source());
//!     let limits = HarvestLimits::from_config(&config.fetch);
//!     let harvested = harvest(&mut fetcher, extractor.as_ref(), limits).await;
//!
//!     let options = PipelineOptions {
//!         year_range: None,
//!         classify: true,
//!     };
//!     let pipeline = Pipeline::new(Classifier::rules_only(), options);
//!     let report = pipeline.process(&harvested.records).await;
//!     println!("{} publications", report.publications.len());
//!     Ok(())
//! }
//! ```

pub mod classify;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod formatters;
pub mod models;
pub mod pipeline;
pub mod processing;

pub use classify::Classifier;
pub use config::Config;
pub use error::{ClassifyError, FetchError, ModelError, PipelineError};
pub use fetch::{HttpPageFetcher, PageFetcher, StaticPages};
pub use models::{Category, Publication, RawPublication};
pub use pipeline::{Pipeline, PipelineOptions, RunReport};
