//! Intent classification and dispatch.
//!
//! [`classify_intent`] is a pure function over the raw message text.
//! [`IntentRouter::handle`] runs the matching path against the injected
//! fetcher, classifier and store, and renders the result with
//! [`Responder`].

use std::fmt;
use std::path::Path;
use std::sync::{Arc, LazyLock};

use readlater_classifier::Classifier;
use readlater_fetcher::{HttpFetcher, PageFetcher};
use readlater_shared::{
    AppConfig, ArticleId, ArticleStatus, Category, ResponderConfig, Result, expand_home,
};
use readlater_storage::{ArticleFilter, ArticleQuery, ArticleStore, LibsqlStore};
use regex::Regex;
use tracing::{debug, info, instrument};
use url::Url;

use crate::responder::{Reply, Responder};
use crate::save::{ProgressReporter, SavePipeline, SilentProgress};

/// `http(s)://` links embedded in free text.
static EMBEDDED_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\bhttps?://[^\s<>"'`]+"#).expect("valid regex"));

/// Punctuation that usually ends a sentence rather than a URL.
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', ')', ']', '}', '\'', '"'];

// ---------------------------------------------------------------------------
// Intent
// ---------------------------------------------------------------------------

/// What an inbound message asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Save one or more links, in message order, without duplicates.
    Save(Vec<Url>),
    List(ArticleFilter),
    Stats,
    Categories,
    Search(String),
    MarkRead(ArticleRef),
    Delete(ArticleRef),
    Help,
    /// Nothing matched. Carries the trimmed input.
    Unknown(String),
}

impl Intent {
    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Save(_) => "save",
            Self::List(_) => "list",
            Self::Stats => "stats",
            Self::Categories => "categories",
            Self::Search(_) => "search",
            Self::MarkRead(_) => "mark_read",
            Self::Delete(_) => "delete",
            Self::Help => "help",
            Self::Unknown(_) => "unknown",
        }
    }
}

/// How a command names a stored article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleRef {
    Url(String),
    Id(ArticleId),
}

impl fmt::Display for ArticleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => f.write_str(url),
            Self::Id(id) => write!(f, "{id}"),
        }
    }
}

/// Decide what `text` asks for. Case-insensitive; never fails.
pub fn classify_intent(text: &str) -> Intent {
    let text = text.trim();
    if text.is_empty() {
        return Intent::Help;
    }

    if let Some(url) = whole_url(text) {
        return Intent::Save(vec![url]);
    }

    if let Some(intent) = command(text) {
        return intent;
    }

    let urls = embedded_urls(text);
    if urls.is_empty() {
        Intent::Unknown(text.to_string())
    } else {
        Intent::Save(urls)
    }
}

/// The whole message is a single absolute URL with a host.
fn whole_url(text: &str) -> Option<Url> {
    if text.contains(char::is_whitespace) {
        return None;
    }
    Url::parse(text).ok().filter(|u| u.host_str().is_some_and(|h| !h.is_empty()))
}

fn command(text: &str) -> Option<Intent> {
    let (head, rest) = match text.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (text, ""),
    };
    let head = head.to_lowercase();

    match head.as_str() {
        "list" | "show" | "all" if rest.is_empty() => Some(Intent::List(ArticleFilter::All)),
        "list" | "show" => list_filter(rest).map(Intent::List),
        "queue" | "unread" if rest.is_empty() => {
            Some(Intent::List(ArticleFilter::Status(ArticleStatus::Unread)))
        }
        "history" | "archive" if rest.is_empty() => {
            Some(Intent::List(ArticleFilter::Status(ArticleStatus::Read)))
        }
        "stats" | "statistics" if rest.is_empty() => Some(Intent::Stats),
        "categories" | "cats" if rest.is_empty() => Some(Intent::Categories),
        "search" | "find" if !rest.is_empty() => Some(Intent::Search(rest.to_string())),
        "done" | "read" => article_ref(rest).map(Intent::MarkRead),
        "mark" => {
            let lower = rest.to_lowercase();
            let stripped = ["as read ", "read "]
                .iter()
                .find_map(|prefix| lower.starts_with(prefix).then(|| rest[prefix.len()..].trim()))
                .unwrap_or(rest);
            article_ref(stripped).map(Intent::MarkRead)
        }
        "delete" | "remove" => article_ref(rest).map(Intent::Delete),
        "help" | "?" if rest.is_empty() => Some(Intent::Help),
        _ => None,
    }
}

fn list_filter(arg: &str) -> Option<ArticleFilter> {
    match arg.to_lowercase().as_str() {
        "all" => Some(ArticleFilter::All),
        "unread" | "queue" => Some(ArticleFilter::Status(ArticleStatus::Unread)),
        "read" | "history" | "archive" => Some(ArticleFilter::Status(ArticleStatus::Read)),
        other => other.parse::<Category>().ok().map(ArticleFilter::Category),
    }
}

/// A single token naming an article: its id, or its URL.
fn article_ref(arg: &str) -> Option<ArticleRef> {
    if arg.is_empty() || arg.contains(char::is_whitespace) {
        return None;
    }
    if let Ok(id) = arg.parse::<ArticleId>() {
        return Some(ArticleRef::Id(id));
    }
    // Stored URLs are in `Url` serialized form, so normalize when we can.
    let url = Url::parse(arg).map(String::from).unwrap_or_else(|_| arg.to_string());
    Some(ArticleRef::Url(url))
}

fn embedded_urls(text: &str) -> Vec<Url> {
    let mut urls: Vec<Url> = Vec::new();
    for m in EMBEDDED_URL.find_iter(text) {
        let candidate = m.as_str().trim_end_matches(TRAILING_PUNCTUATION);
        let Some(url) = whole_url(candidate) else {
            continue;
        };
        if !urls.contains(&url) {
            urls.push(url);
        }
    }
    urls
}

// ---------------------------------------------------------------------------
// IntentRouter
// ---------------------------------------------------------------------------

/// Single entry point for inbound messages. Cheap to share behind `Arc`.
pub struct IntentRouter {
    fetcher: Arc<dyn PageFetcher>,
    classifier: Arc<dyn Classifier>,
    store: Arc<dyn ArticleStore>,
    config: ResponderConfig,
    progress: Arc<dyn ProgressReporter>,
}

impl IntentRouter {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        classifier: Arc<dyn Classifier>,
        store: Arc<dyn ArticleStore>,
        config: ResponderConfig,
    ) -> Self {
        Self {
            fetcher,
            classifier,
            store,
            config,
            progress: Arc::new(SilentProgress),
        }
    }

    /// Wire up the HTTP fetcher, configured classifier and libSQL store.
    /// `db_path` overrides `storage.database_path`.
    pub async fn from_config(config: &AppConfig, db_path: Option<&Path>) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config.fetch)?;
        let classifier = readlater_classifier::from_config(config)?;
        let path = match db_path {
            Some(p) => p.to_path_buf(),
            None => expand_home(&config.storage.database_path)?,
        };
        let store = LibsqlStore::open(&path).await?;

        info!(
            db = %path.display(),
            classifier = classifier.name(),
            "router ready"
        );

        Ok(Self::new(
            Arc::new(fetcher),
            classifier,
            Arc::new(store),
            config.responder.clone(),
        ))
    }

    /// Report save-path phases to `progress` (e.g. a CLI spinner).
    pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    /// Classify `text`, run it and render the reply.
    ///
    /// Enrichment failures degrade the save instead of erroring; the only
    /// `Err` is a store failure.
    #[instrument(skip_all, fields(intent = tracing::field::Empty))]
    pub async fn handle(&self, text: &str) -> Result<Reply> {
        let intent = classify_intent(text);
        tracing::Span::current().record("intent", intent.kind());
        debug!(?intent, "intent classified");

        let limit = self.config.list_limit;
        let reply = match intent {
            Intent::Save(urls) => self.save_all(&urls).await?,
            // One extra row tells the responder whether the list was cut.
            Intent::List(filter) => {
                let query = ArticleQuery::new(filter, limit.saturating_add(1));
                let articles = self.store.query(&query).await?;
                Responder::list(filter, articles, limit)
            }
            Intent::Stats => Responder::stats(self.store.stats().await?),
            Intent::Categories => Responder::categories(self.store.categories().await?),
            Intent::Search(terms) => {
                let articles = self.store.search(&terms, limit.saturating_add(1)).await?;
                Responder::search(&terms, articles, limit)
            }
            Intent::MarkRead(reference) => match self.resolve(&reference).await? {
                Some(url) => match self.store.mark_read(&url).await? {
                    Some(article) => Responder::marked_read(article),
                    None => Responder::not_found(&reference.to_string()),
                },
                None => Responder::not_found(&reference.to_string()),
            },
            Intent::Delete(reference) => {
                let removed = match self.resolve(&reference).await? {
                    Some(url) => self.store.delete(&url).await?.then_some(url),
                    None => None,
                };
                match removed {
                    Some(url) => Responder::deleted(&url),
                    None => Responder::not_found(&reference.to_string()),
                }
            }
            Intent::Help => Responder::help(),
            Intent::Unknown(text) => Responder::unknown(&text),
        };

        Ok(reply)
    }

    async fn save_all(&self, urls: &[Url]) -> Result<Reply> {
        let pipeline = SavePipeline {
            fetcher: self.fetcher.as_ref(),
            classifier: self.classifier.as_ref(),
            store: self.store.as_ref(),
            progress: self.progress.as_ref(),
            snippet_chars: self.config.snippet_chars,
        };

        let mut reports = Vec::with_capacity(urls.len());
        for url in urls {
            reports.push(pipeline.run(url).await?);
        }

        Ok(match reports.len() {
            1 => Responder::saved(reports.remove(0)),
            _ => Responder::saved_many(reports),
        })
    }

    /// The stored URL an [`ArticleRef`] points at, if any.
    async fn resolve(&self, reference: &ArticleRef) -> Result<Option<String>> {
        match reference {
            ArticleRef::Url(url) => Ok(Some(url.clone())),
            ArticleRef::Id(id) => Ok(self.store.get(*id).await?.map(|a| a.url)),
        }
    }
}
