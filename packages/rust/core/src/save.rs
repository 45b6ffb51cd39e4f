//! The save path: fetch → extract → classify → store.
//!
//! Enrichment never fails the save. Each stage that breaks is logged and
//! replaced with fallback values, and the article is persisted anyway.

use std::time::Instant;

use readlater_classifier::{Classification, Classifier};
use readlater_extractor::ExtractedContent;
use readlater_fetcher::PageFetcher;
use readlater_shared::{NewArticle, Result};
use readlater_storage::{ArticleStore, SaveOutcome};
use serde::Serialize;
use tracing::{info, instrument, warn};
use url::Url;

/// Which enrichment stage fell back to defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum Degradation {
    /// The page could not be retrieved. `reason` is a [`readlater_fetcher::FetchError::reason`] code.
    Fetch { reason: &'static str },
    /// The page had no readable text.
    NoContent,
    /// The classifier returned an error.
    Classification,
}

/// One saved URL and how its enrichment went.
#[derive(Debug, Clone)]
pub struct SaveReport {
    pub outcome: SaveOutcome,
    pub degraded: Option<Degradation>,
}

/// Progress callback for the save path.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new stage for `url`.
    fn phase(&self, url: &str, name: &str);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _url: &str, _name: &str) {}
}

/// Shared collaborators for one save.
pub(crate) struct SavePipeline<'a> {
    pub fetcher: &'a dyn PageFetcher,
    pub classifier: &'a dyn Classifier,
    pub store: &'a dyn ArticleStore,
    pub progress: &'a dyn ProgressReporter,
    pub snippet_chars: usize,
}

impl SavePipeline<'_> {
    /// Enrich and persist one URL. Only a store failure is an error.
    #[instrument(skip_all, fields(url = %url))]
    pub async fn run(&self, url: &Url) -> Result<SaveReport> {
        let start = Instant::now();
        let (article, degraded) = self.enrich(url).await;

        self.progress.phase(url.as_str(), "Saving");
        let outcome = self.store.save(article).await?;

        info!(
            id = %outcome.article.id,
            category = %outcome.article.category,
            read_time = outcome.article.read_time_minutes,
            created = outcome.created,
            degraded = degraded.is_some(),
            duration_ms = start.elapsed().as_millis(),
            "article saved"
        );

        Ok(SaveReport { outcome, degraded })
    }

    async fn enrich(&self, url: &Url) -> (NewArticle, Option<Degradation>) {
        self.progress.phase(url.as_str(), "Fetching");
        let page = match self.fetcher.fetch(url).await {
            Ok(page) => page,
            Err(e) => {
                warn!(reason = e.reason(), error = %e, "fetch failed, saving with fallback values");
                let article = build_article(
                    url,
                    ExtractedContent::empty(url),
                    Classification::fallback(),
                    self.snippet_chars,
                );
                return (article, Some(Degradation::Fetch { reason: e.reason() }));
            }
        };

        self.progress.phase(url.as_str(), "Extracting");
        let content = readlater_extractor::extract(&page.html, url);
        if content.body.is_empty() {
            // A title alone (often just the URL) is not enough to classify.
            warn!("no readable text on page, saving with fallback values");
            let article = build_article(url, content, Classification::fallback(), self.snippet_chars);
            return (article, Some(Degradation::NoContent));
        }

        let mut degraded = None;
        self.progress.phase(url.as_str(), "Classifying");
        let classification = match self.classifier.classify(&content.title, &content.body).await {
            Ok(c) => c,
            Err(e) => {
                warn!(classifier = self.classifier.name(), error = %e, "classification failed, using fallback");
                degraded = Some(Degradation::Classification);
                Classification::fallback()
            }
        };

        (
            build_article(url, content, classification, self.snippet_chars),
            degraded,
        )
    }
}

fn build_article(
    url: &Url,
    content: ExtractedContent,
    classification: Classification,
    snippet_chars: usize,
) -> NewArticle {
    NewArticle {
        url: url.to_string(),
        domain: url.host_str().unwrap_or_default().to_string(),
        title: content.title,
        description: content.description,
        author: content.author,
        content_snippet: snippet(&content.body, snippet_chars),
        category: classification.category,
        keywords: classification.keywords,
        read_time_minutes: classification.read_time_minutes,
    }
    .normalized()
}

/// First `max` characters of `body` on a single line.
pub(crate) fn snippet(body: &str, max: usize) -> String {
    let flat = body.split_whitespace().collect::<Vec<_>>().join(" ");
    match flat.char_indices().nth(max) {
        Some((idx, _)) => flat[..idx].trim_end().to_string(),
        None => flat,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_flattens_and_caps() {
        assert_eq!(snippet("one\ntwo   three", 100), "one two three");
        assert_eq!(snippet("abcdef", 3), "abc");
        assert_eq!(snippet("ab cd", 3), "ab");
        assert_eq!(snippet("", 10), "");
    }

    #[test]
    fn fallback_article_uses_url() {
        let url = Url::parse("https://news.example.org/story?id=7").unwrap();
        let article = build_article(
            &url,
            ExtractedContent::empty(&url),
            Classification::fallback(),
            500,
        );
        assert_eq!(article.title, "https://news.example.org/story?id=7");
        assert_eq!(article.domain, "news.example.org");
        assert_eq!(article.keywords, vec!["untagged"]);
        assert_eq!(article.read_time_minutes, 1);
        assert!(article.content_snippet.is_empty());
    }

    #[test]
    fn degradation_serializes_with_stage_tag() {
        let json = serde_json::to_value(Degradation::Fetch { reason: "timeout" }).unwrap();
        assert_eq!(json, serde_json::json!({"stage": "fetch", "reason": "timeout"}));
        let json = serde_json::to_value(Degradation::NoContent).unwrap();
        assert_eq!(json, serde_json::json!({"stage": "no_content"}));
    }
}
