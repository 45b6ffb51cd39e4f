//! Article persistence for readlater.
//!
//! Callers depend on the [`ArticleStore`] trait. Two implementations:
//! - [`LibsqlStore`]: durable local libSQL database with migrations
//! - [`MemoryStore`]: in-process store for tests
//!
//! Both enforce one row per URL. Saving a URL that already exists
//! refreshes its enrichment fields in place and keeps `id`, `saved_at`,
//! `status` and `read_at`.

mod db;
mod memory;
mod migrations;

use async_trait::async_trait;
use readlater_shared::{
    Article, ArticleId, ArticleStatus, Category, NewArticle, ReadingStats, Result,
};
use serde::Serialize;

pub use db::LibsqlStore;
pub use memory::MemoryStore;

// ---------------------------------------------------------------------------
// Query types
// ---------------------------------------------------------------------------

/// Which articles a listing returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArticleFilter {
    #[default]
    All,
    Status(ArticleStatus),
    Category(Category),
}

impl ArticleFilter {
    pub fn matches(&self, article: &Article) -> bool {
        match self {
            Self::All => true,
            Self::Status(status) => article.status == *status,
            Self::Category(category) => article.category == *category,
        }
    }
}

/// A listing request: newest saves first, at most `limit` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArticleQuery {
    pub filter: ArticleFilter,
    pub limit: usize,
}

impl ArticleQuery {
    pub fn new(filter: ArticleFilter, limit: usize) -> Self {
        Self { filter, limit }
    }

    pub fn all(limit: usize) -> Self {
        Self::new(ArticleFilter::All, limit)
    }
}

/// Result of [`ArticleStore::save`].
#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome {
    pub article: Article,
    /// `false` when an existing row for the URL was refreshed.
    pub created: bool,
}

/// Number of articles carrying one label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: Category,
    pub count: usize,
}

/// Sort by count descending, taxonomy order on ties.
pub fn sort_category_counts(counts: &mut [CategoryCount]) {
    counts.sort_by(|a, b| b.count.cmp(&a.count).then(a.category.cmp(&b.category)));
}

// ---------------------------------------------------------------------------
// ArticleStore
// ---------------------------------------------------------------------------

/// Persistence contract used by the intent router.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Insert, or refresh the existing row with the same URL.
    async fn save(&self, article: NewArticle) -> Result<SaveOutcome>;

    async fn get(&self, id: ArticleId) -> Result<Option<Article>>;

    async fn get_by_url(&self, url: &str) -> Result<Option<Article>>;

    /// Most recently saved first; ties keep reverse insertion order.
    async fn query(&self, query: &ArticleQuery) -> Result<Vec<Article>>;

    /// Case-insensitive substring match on title, description, snippet and keywords.
    async fn search(&self, terms: &str, limit: usize) -> Result<Vec<Article>>;

    async fn stats(&self) -> Result<ReadingStats>;

    /// Non-empty categories, largest first.
    async fn categories(&self) -> Result<Vec<CategoryCount>>;

    /// Mark as read. `None` if the URL is unknown. Already-read articles keep
    /// their original `read_at`.
    async fn mark_read(&self, url: &str) -> Result<Option<Article>>;

    /// Remove the article. Returns whether a row existed.
    async fn delete(&self, url: &str) -> Result<bool>;
}

#[cfg(test)]
mod contract;
