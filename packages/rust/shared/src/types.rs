//! Core domain types for saved articles and reading statistics.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Placeholder keyword used when nothing could be extracted.
pub const SENTINEL_KEYWORD: &str = "untagged";

/// Lower bound for any estimated reading time.
pub const MIN_READ_TIME_MINUTES: u32 = 1;

/// Most keywords a stored article carries.
pub const MAX_KEYWORDS: usize = 5;

/// Longest stored title, in characters.
pub const MAX_TITLE_CHARS: usize = 200;

// ---------------------------------------------------------------------------
// ArticleId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper for article identifiers (time-sortable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleId(pub Uuid);

impl ArticleId {
    /// Generate a new time-sortable article identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ArticleId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ArticleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ArticleId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// ArticleStatus
// ---------------------------------------------------------------------------

/// Reading state of a saved article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    #[default]
    Unread,
    Read,
}

impl ArticleStatus {
    /// Storage/display key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unread => "unread",
            Self::Read => "read",
        }
    }
}

impl std::fmt::Display for ArticleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ArticleStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unread" => Ok(Self::Unread),
            "read" => Ok(Self::Read),
            other => Err(format!("unknown article status '{other}'")),
        }
    }
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// The closed taxonomy of labels the classifier may assign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Technology,
    Science,
    Business,
    Health,
    Politics,
    Entertainment,
    Sports,
    Education,
    Lifestyle,
    General,
}

impl Category {
    /// Every label, in tie-breaking priority order. `General` is last.
    pub const ALL: [Category; 10] = [
        Category::Technology,
        Category::Science,
        Category::Business,
        Category::Health,
        Category::Politics,
        Category::Entertainment,
        Category::Sports,
        Category::Education,
        Category::Lifestyle,
        Category::General,
    ];

    /// The label used when there is no classification signal.
    pub const FALLBACK: Category = Category::General;

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Technology => "Technology",
            Self::Science => "Science",
            Self::Business => "Business",
            Self::Health => "Health",
            Self::Politics => "Politics",
            Self::Entertainment => "Entertainment",
            Self::Sports => "Sports",
            Self::Education => "Education",
            Self::Lifestyle => "Lifestyle",
            Self::General => "General",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    /// Case-insensitive lookup by label.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown category '{wanted}'"))
    }
}

// ---------------------------------------------------------------------------
// Article
// ---------------------------------------------------------------------------

/// A saved article, as persisted by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// Unique identifier, assigned at creation.
    pub id: ArticleId,
    /// Canonical source URL (unique per store).
    pub url: String,
    /// Host part of the URL.
    pub domain: String,
    /// Extracted title, or the URL when nothing better was found.
    pub title: String,
    /// Meta description, if the page had one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Byline, if the page had one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Bounded excerpt of the extracted body.
    pub content_snippet: String,
    /// Assigned taxonomy label.
    pub category: Category,
    /// Ranked keywords, never empty.
    pub keywords: Vec<String>,
    /// Estimated reading time, at least one minute.
    pub read_time_minutes: u32,
    /// Reading state.
    pub status: ArticleStatus,
    /// First time this URL was saved. Survives re-saves.
    pub saved_at: DateTime<Utc>,
    /// Last time the enrichment fields were refreshed.
    pub updated_at: DateTime<Utc>,
    /// When the article was marked read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_at: Option<DateTime<Utc>>,
}

/// The enrichment result handed to the store by the save path.
#[derive(Debug, Clone, PartialEq)]
pub struct NewArticle {
    pub url: String,
    pub domain: String,
    pub title: String,
    pub description: Option<String>,
    pub author: Option<String>,
    pub content_snippet: String,
    pub category: Category,
    pub keywords: Vec<String>,
    pub read_time_minutes: u32,
}

impl NewArticle {
    /// Enforce the persisted-article invariants: between one and
    /// [`MAX_KEYWORDS`] distinct keywords, a positive read time and a
    /// non-empty title of at most [`MAX_TITLE_CHARS`].
    pub fn normalized(mut self) -> Self {
        let mut keywords: Vec<String> = Vec::with_capacity(MAX_KEYWORDS);
        for kw in self.keywords {
            let kw = kw.trim();
            if keywords.len() == MAX_KEYWORDS {
                break;
            }
            if !kw.is_empty() && !keywords.iter().any(|k| k == kw) {
                keywords.push(kw.to_string());
            }
        }
        if keywords.is_empty() {
            keywords.push(SENTINEL_KEYWORD.to_string());
        }
        self.keywords = keywords;

        self.read_time_minutes = self.read_time_minutes.max(MIN_READ_TIME_MINUTES);

        if self.title.trim().is_empty() {
            self.title = self.url.clone();
        }
        if let Some((idx, _)) = self.title.char_indices().nth(MAX_TITLE_CHARS) {
            self.title.truncate(idx);
        }
        self
    }
}

// ---------------------------------------------------------------------------
// ReadingStats
// ---------------------------------------------------------------------------

/// Aggregate view over the saved articles. Always computed, never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadingStats {
    pub total_articles: usize,
    pub unread: usize,
    pub read: usize,
    /// Article count per category label; only non-zero entries.
    pub by_category: BTreeMap<Category, usize>,
    pub total_reading_minutes: u64,
    pub read_reading_minutes: u64,
    pub average_reading_minutes: f64,
    pub read_percentage: f64,
    /// Category with the most articles; ties go to taxonomy order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_category: Option<Category>,
}

impl ReadingStats {
    /// Compute the aggregate from a full article set.
    pub fn from_articles(articles: &[Article]) -> Self {
        let mut stats = Self::default();
        for article in articles {
            stats.total_articles += 1;
            let minutes = u64::from(article.read_time_minutes);
            stats.total_reading_minutes += minutes;
            match article.status {
                ArticleStatus::Unread => stats.unread += 1,
                ArticleStatus::Read => {
                    stats.read += 1;
                    stats.read_reading_minutes += minutes;
                }
            }
            *stats.by_category.entry(article.category).or_insert(0) += 1;
        }
        stats.finish();
        stats
    }

    /// Fill in the derived fields from the counters.
    pub fn finish(&mut self) {
        if self.total_articles > 0 {
            let total = self.total_articles as f64;
            self.average_reading_minutes = round1(self.total_reading_minutes as f64 / total);
            self.read_percentage = round1(self.read as f64 / total * 100.0);
        } else {
            self.average_reading_minutes = 0.0;
            self.read_percentage = 0.0;
        }
        self.top_category = top_category(&self.by_category);
    }
}

/// Highest count wins; `Category` ordering breaks ties.
fn top_category(counts: &BTreeMap<Category, usize>) -> Option<Category> {
    counts
        .iter()
        .filter(|(_, n)| **n > 0)
        .max_by(|(ca, na), (cb, nb)| na.cmp(nb).then_with(|| cb.cmp(ca)))
        .map(|(c, _)| *c)
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
