//! Two-tier publication classification.
//!
//! The rule tier reads the venue string and is free. The model tier asks a
//! remote model, wrapped in bounded retry, and only runs when a backend is
//! configured and the mode calls for it. A publication whose model call
//! fails stays [`Category::Unclassified`] and is listed in the report's
//! residual failures; the rest of the batch carries on.

mod model;
mod retry;

pub use model::{ChatCompletionsBackend, CompletionBackend, SYSTEM_PROMPT, user_prompt};
pub use retry::with_retry;

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::Serialize;

use crate::config::{Config, RetryConfig};
use crate::error::{ClassifyError, ModelError};
use crate::models::{Category, ClassifierMode, Publication};

/// Venue-keyword rule. `None` means the rules cannot tell.
#[must_use]
pub fn classify_by_venue(venue: &str) -> Option<Category> {
    let venue = venue.to_lowercase();
    if venue.contains("journal") {
        Some(Category::Journal)
    } else if venue.contains("conference") || venue.contains("proceedings") {
        Some(Category::Conference)
    } else {
        None
    }
}

/// Rule tier: venue keywords, then the listing's own type hint.
#[must_use]
pub fn classify_by_rules(publication: &Publication) -> Option<Category> {
    classify_by_venue(&publication.venue)
        .or(publication.source_hint)
}

/// A publication the model tier could not classify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationFailure {
    /// Display title of the publication.
    pub title: String,

    /// Model calls made.
    pub attempts: u32,

    /// Final error message.
    pub error: String,
}

/// Outcome of classifying a batch.
#[derive(Debug, Clone, Default)]
pub struct ClassificationReport {
    /// Every input publication in input order, with categories set.
    pub publications: Vec<Publication>,

    /// Residual bucket: publications left unclassified after retries.
    pub failures: Vec<ClassificationFailure>,

    /// Publications decided by the rule tier.
    pub by_rules: usize,

    /// Publications decided by the model tier.
    pub by_model: usize,
}

/// Publication classifier.
#[derive(Clone)]
pub struct Classifier {
    mode: ClassifierMode,
    backend: Option<Arc<dyn CompletionBackend>>,
    retry: RetryConfig,
    concurrency: usize,
}

impl Classifier {
    /// Rule tier only.
    #[must_use]
    pub fn rules_only() -> Self {
        Self {
            mode: ClassifierMode::Rules,
            backend: None,
            retry: RetryConfig::default(),
            concurrency: 1,
        }
    }

    /// Classifier with a model tier.
    #[must_use]
    pub fn with_backend(
        mode: ClassifierMode,
        backend: Arc<dyn CompletionBackend>,
        retry: RetryConfig,
        concurrency: usize,
    ) -> Self {
        Self {
            mode,
            backend: Some(backend),
            retry,
            concurrency: concurrency.max(1),
        }
    }

    /// Build from configuration. Model modes fall back to rules when no
    /// API key is configured.
    ///
    /// # Errors
    ///
    /// Returns error if the model HTTP client cannot be created.
    pub fn from_config(config: &Config, mode: ClassifierMode) -> anyhow::Result<Self> {
        if !mode.uses_model() {
            return Ok(Self::rules_only());
        }
        if !config.has_model() {
            tracing::warn!(?mode, "No model API key configured, classifying with venue rules only");
            return Ok(Self::rules_only());
        }

        let backend = ChatCompletionsBackend::new(&config.model)?;
        tracing::info!(model = backend.model(), ?mode, "Model tier enabled");
        Ok(Self::with_backend(
            mode,
            Arc::new(backend),
            config.retry,
            config.classify_concurrency,
        ))
    }

    /// Effective mode.
    #[must_use]
    pub const fn mode(&self) -> ClassifierMode {
        self.mode
    }

    /// Check if the model tier will be consulted.
    #[must_use]
    pub fn has_model(&self) -> bool {
        self.backend.is_some() && self.mode.uses_model()
    }

    /// Decide one publication's category.
    ///
    /// With no model tier, anything the rules leave open is `other`.
    pub async fn classify(&self, publication: &Publication) -> Result<Category, ClassifyError> {
        self.decide(publication).await.map(|(category, _)| category)
    }

    /// Classify a batch. Failures are isolated per publication.
    ///
    /// Up to `concurrency` publications are in flight at once and a slot is
    /// refilled as soon as any of them finishes. Output keeps input order.
    pub async fn classify_all(&self, publications: Vec<Publication>) -> ClassificationReport {
        let mut outcomes: Vec<_> = stream::iter(publications.into_iter().enumerate())
            .map(|(index, publication)| async move {
                let outcome = self.decide(&publication).await;
                (index, publication, outcome)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;
        outcomes.sort_unstable_by_key(|(index, _, _)| *index);

        let mut report = ClassificationReport::default();
        for (_, mut publication, outcome) in outcomes {
            match outcome {
                Ok((category, tier)) => {
                    publication.category = category;
                    match tier {
                        Tier::Rules => report.by_rules += 1,
                        Tier::Model => report.by_model += 1,
                    }
                }
                Err(err) => {
                    tracing::warn!(
                        title = publication.title_for_display(),
                        attempts = err.attempts(),
                        error = %err,
                        "Could not classify publication"
                    );
                    publication.category = Category::Unclassified;
                    report.failures.push(ClassificationFailure {
                        title: publication.title_for_display().to_string(),
                        attempts: err.attempts(),
                        error: err.to_string(),
                    });
                }
            }
            report.publications.push(publication);
        }

        tracing::info!(
            rules = report.by_rules,
            model = report.by_model,
            failed = report.failures.len(),
            "Classification finished"
        );
        report
    }

    async fn decide(&self, publication: &Publication) -> Result<(Category, Tier), ClassifyError> {
        let backend = match (&self.backend, self.mode) {
            (Some(backend), ClassifierMode::Model) => backend,
            (Some(backend), ClassifierMode::Hybrid) => {
                if let Some(category) = classify_by_rules(publication) {
                    return Ok((category, Tier::Rules));
                }
                backend
            }
            _ => {
                let category = classify_by_rules(publication).unwrap_or(Category::Other);
                return Ok((category, Tier::Rules));
            }
        };

        let backend: &dyn CompletionBackend = backend.as_ref();
        let prompt = user_prompt(publication.title_for_display(), &publication.venue);
        let prompt = prompt.as_str();
        let category = with_retry(&self.retry, |_| async move {
            let answer = backend.classify_text(SYSTEM_PROMPT, prompt).await?;
            Category::from_model_answer(&answer).ok_or(ModelError::UnexpectedAnswer(answer))
        })
        .await?;

        Ok((category, Tier::Model))
    }
}

impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier")
            .field("mode", &self.mode)
            .field(
                "backend",
                &self.backend.as_ref().map(|b| b.name().to_string()),
            )
            .field("concurrency", &self.concurrency)
            .finish()
    }
}

#[derive(Debug, Clone, Copy)]
enum Tier {
    Rules,
    Model,
}

/// Publications split by category, each bucket keeping input order.
#[derive(Debug, Clone, Default)]
pub struct CategorySplit {
    /// Journal articles.
    pub journal: Vec<Publication>,
    /// Conference papers.
    pub conference: Vec<Publication>,
    /// Everything else.
    pub other: Vec<Publication>,
    /// Not classified.
    pub unclassified: Vec<Publication>,
}

impl CategorySplit {
    /// Non-empty buckets with their category.
    #[must_use]
    pub fn buckets(&self) -> Vec<(Category, &[Publication])> {
        [
            (Category::Journal, self.journal.as_slice()),
            (Category::Conference, self.conference.as_slice()),
            (Category::Other, self.other.as_slice()),
            (Category::Unclassified, self.unclassified.as_slice()),
        ]
        .into_iter()
        .filter(|(_, members)| !members.is_empty())
        .collect()
    }
}

/// Split publications into category buckets.
#[must_use]
pub fn partition_by_category(publications: &[Publication]) -> CategorySplit {
    let mut split = CategorySplit::default();
    for publication in publications {
        let bucket = match publication.category {
            Category::Journal => &mut split.journal,
            Category::Conference => &mut split.conference,
            Category::Other => &mut split.other,
            Category::Unclassified => &mut split.unclassified,
        };
        bucket.push(publication.clone());
    }
    split
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_venue(venue: &str) -> Publication {
        Publication {
            title: "t".into(),
            venue: venue.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_venue_rules() {
        assert_eq!(
            classify_by_venue("Proceedings of ICML"),
            Some(Category::Conference)
        );
        assert_eq!(
            classify_by_venue("Journal of Machine Learning Research"),
            Some(Category::Journal)
        );
        assert_eq!(
            classify_by_venue("IEEE CONFERENCE on Vision"),
            Some(Category::Conference)
        );
        assert_eq!(classify_by_venue("Tech Report"), None);
    }

    #[test]
    fn test_journal_keyword_wins_over_proceedings() {
        assert_eq!(
            classify_by_venue("Journal of Proceedings Studies"),
            Some(Category::Journal)
        );
    }

    #[test]
    fn test_hint_used_when_venue_is_silent() {
        let mut p = at_venue("ICML");
        p.source_hint = Some(Category::Conference);
        assert_eq!(classify_by_rules(&p), Some(Category::Conference));

        p.venue = "Journal of X".into();
        assert_eq!(classify_by_rules(&p), Some(Category::Journal));
    }

    #[tokio::test]
    async fn test_rules_only_falls_through_to_other() {
        let classifier = Classifier::rules_only();
        assert_eq!(
            classifier.classify(&at_venue("Tech Report")).await.unwrap(),
            Category::Other
        );
        assert_eq!(
            classifier
                .classify(&at_venue("Proceedings of ICML"))
                .await
                .unwrap(),
            Category::Conference
        );
    }

    #[test]
    fn test_partition_by_category() {
        let mut a = at_venue("x");
        a.category = Category::Journal;
        let mut b = at_venue("y");
        b.category = Category::Conference;
        let c = at_venue("z");

        let split = partition_by_category(&[a, b, c]);
        assert_eq!(split.journal.len(), 1);
        assert_eq!(split.conference.len(), 1);
        assert_eq!(split.unclassified.len(), 1);
        assert!(split.other.is_empty());
        assert_eq!(split.buckets().len(), 3);
    }
}
