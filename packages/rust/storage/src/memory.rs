//! In-process [`ArticleStore`] for tests and ephemeral sessions.

use async_trait::async_trait;
use chrono::Utc;
use readlater_shared::{Article, ArticleId, NewArticle, ReadingStats, Result};
use tokio::sync::RwLock;

use crate::{ArticleQuery, ArticleStore, CategoryCount, SaveOutcome};

struct Entry {
    /// Insertion sequence, the ordering tiebreak.
    seq: u64,
    article: Article,
}

#[derive(Default)]
struct Inner {
    entries: Vec<Entry>,
    next_seq: u64,
}

impl Inner {
    fn find(&self, url: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.article.url == url)
    }

    fn find_mut(&mut self, url: &str) -> Option<&mut Entry> {
        self.entries.iter_mut().find(|e| e.article.url == url)
    }

    /// Articles newest-first, filtered, capped.
    fn ordered<'a>(
        &'a self,
        keep: impl Fn(&Article) -> bool,
        limit: usize,
    ) -> Vec<Article> {
        let mut matched: Vec<&'a Entry> = self.entries.iter().filter(|e| keep(&e.article)).collect();
        matched.sort_by(|a, b| {
            b.article
                .saved_at
                .cmp(&a.article.saved_at)
                .then(b.seq.cmp(&a.seq))
        });
        matched
            .into_iter()
            .take(limit)
            .map(|e| e.article.clone())
            .collect()
    }
}

/// Vec-backed store behind an async `RwLock`. Writers are exclusive.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn save(&self, article: NewArticle) -> Result<SaveOutcome> {
        let new = article.normalized();
        let mut inner = self.inner.write().await;
        let now = Utc::now();

        if let Some(entry) = inner.find_mut(&new.url) {
            let existing = &mut entry.article;
            existing.domain = new.domain;
            existing.title = new.title;
            existing.description = new.description;
            existing.author = new.author;
            existing.content_snippet = new.content_snippet;
            existing.category = new.category;
            existing.keywords = new.keywords;
            existing.read_time_minutes = new.read_time_minutes;
            existing.updated_at = now;
            return Ok(SaveOutcome {
                article: existing.clone(),
                created: false,
            });
        }

        let article = Article {
            id: ArticleId::new(),
            url: new.url,
            domain: new.domain,
            title: new.title,
            description: new.description,
            author: new.author,
            content_snippet: new.content_snippet,
            category: new.category,
            keywords: new.keywords,
            read_time_minutes: new.read_time_minutes,
            status: Default::default(),
            saved_at: now,
            updated_at: now,
            read_at: None,
        };

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.entries.push(Entry {
            seq,
            article: article.clone(),
        });

        Ok(SaveOutcome {
            article,
            created: true,
        })
    }

    async fn get(&self, id: ArticleId) -> Result<Option<Article>> {
        let inner = self.inner.read().await;
        Ok(inner
            .entries
            .iter()
            .find(|e| e.article.id == id)
            .map(|e| e.article.clone()))
    }

    async fn get_by_url(&self, url: &str) -> Result<Option<Article>> {
        Ok(self.inner.read().await.find(url).map(|e| e.article.clone()))
    }

    async fn query(&self, query: &ArticleQuery) -> Result<Vec<Article>> {
        let inner = self.inner.read().await;
        Ok(inner.ordered(|a| query.filter.matches(a), query.limit))
    }

    async fn search(&self, terms: &str, limit: usize) -> Result<Vec<Article>> {
        let needle = terms.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let inner = self.inner.read().await;
        Ok(inner.ordered(
            |a| {
                a.title.to_lowercase().contains(&needle)
                    || a
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
                    || a.content_snippet.to_lowercase().contains(&needle)
                    || a.keywords.iter().any(|k| k.to_lowercase().contains(&needle))
            },
            limit,
        ))
    }

    async fn stats(&self) -> Result<ReadingStats> {
        let inner = self.inner.read().await;
        let articles: Vec<Article> = inner.entries.iter().map(|e| e.article.clone()).collect();
        Ok(ReadingStats::from_articles(&articles))
    }

    async fn categories(&self) -> Result<Vec<CategoryCount>> {
        let stats = self.stats().await?;
        let mut counts: Vec<CategoryCount> = stats
            .by_category
            .into_iter()
            .map(|(category, count)| CategoryCount { category, count })
            .collect();
        crate::sort_category_counts(&mut counts);
        Ok(counts)
    }

    async fn mark_read(&self, url: &str) -> Result<Option<Article>> {
        let mut inner = self.inner.write().await;
        Ok(inner.find_mut(url).map(|entry| {
            let article = &mut entry.article;
            article.status = readlater_shared::ArticleStatus::Read;
            if article.read_at.is_none() {
                article.read_at = Some(Utc::now());
            }
            article.clone()
        }))
    }

    async fn delete(&self, url: &str) -> Result<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.entries.len();
        inner.entries.retain(|e| e.article.url != url);
        Ok(inner.entries.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract;
    use std::sync::Arc;

    #[tokio::test]
    async fn insert_then_update_in_place() {
        contract::insert_then_update_in_place(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn lookup_by_id_and_url() {
        contract::lookup_by_id_and_url(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn query_order_and_filters() {
        contract::query_order_and_filters(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn empty_store_queries() {
        contract::empty_store_queries(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn mark_read_and_delete() {
        contract::mark_read_and_delete(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn search_matches_fields() {
        contract::search_matches_fields(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn stats_and_categories() {
        contract::stats_and_categories(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn normalizes_invariants_on_save() {
        contract::normalizes_invariants_on_save(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn concurrent_saves() {
        contract::concurrent_saves(Arc::new(MemoryStore::new())).await;
    }
}
