//! Behaviour shared by every [`ArticleStore`] implementation, run against each.

use std::sync::Arc;

use readlater_shared::{ArticleStatus, Category, MAX_TITLE_CHARS, NewArticle, SENTINEL_KEYWORD};

use crate::{ArticleFilter, ArticleQuery, ArticleStore, CategoryCount};

pub fn new_article(url: &str, category: Category, minutes: u32) -> NewArticle {
    NewArticle {
        url: url.into(),
        domain: "example.com".into(),
        title: format!("Title for {url}"),
        description: None,
        author: None,
        content_snippet: "An excerpt about async runtimes.".into(),
        category,
        keywords: vec!["rust".into(), "async".into()],
        read_time_minutes: minutes,
    }
}

fn urls(articles: &[readlater_shared::Article]) -> Vec<&str> {
    articles.iter().map(|a| a.url.as_str()).collect()
}

pub async fn insert_then_update_in_place(store: &dyn ArticleStore) {
    let url = "https://example.com/a";
    let first = store.save(new_article(url, Category::Technology, 2)).await.unwrap();
    assert!(first.created);
    assert_eq!(first.article.status, ArticleStatus::Unread);
    assert!(first.article.read_at.is_none());

    store.mark_read(url).await.unwrap().unwrap();

    let mut refreshed = new_article(url, Category::Science, 5);
    refreshed.title = "Updated title".into();
    refreshed.keywords = vec!["telescope".into()];
    let second = store.save(refreshed).await.unwrap();

    assert!(!second.created);
    assert_eq!(second.article.id, first.article.id);
    assert_eq!(second.article.saved_at, first.article.saved_at);
    assert_eq!(second.article.status, ArticleStatus::Read);
    assert!(second.article.read_at.is_some());
    assert_eq!(second.article.title, "Updated title");
    assert_eq!(second.article.category, Category::Science);
    assert_eq!(second.article.keywords, vec!["telescope"]);
    assert_eq!(second.article.read_time_minutes, 5);
    assert!(second.article.updated_at >= first.article.updated_at);

    let all = store.query(&ArticleQuery::all(10)).await.unwrap();
    assert_eq!(all.len(), 1);
}

pub async fn lookup_by_id_and_url(store: &dyn ArticleStore) {
    let saved = store
        .save(new_article("https://example.com/id", Category::Business, 1))
        .await
        .unwrap()
        .article;

    let by_id = store.get(saved.id).await.unwrap().unwrap();
    assert_eq!(by_id.url, "https://example.com/id");
    let by_url = store.get_by_url("https://example.com/id").await.unwrap().unwrap();
    assert_eq!(by_url.id, saved.id);
    assert!(store.get_by_url("https://example.com/other").await.unwrap().is_none());
}

pub async fn query_order_and_filters(store: &dyn ArticleStore) {
    store.save(new_article("https://example.com/1", Category::Technology, 1)).await.unwrap();
    store.save(new_article("https://example.com/2", Category::Science, 1)).await.unwrap();
    store.save(new_article("https://example.com/3", Category::Technology, 1)).await.unwrap();
    store.mark_read("https://example.com/2").await.unwrap();

    let all = store.query(&ArticleQuery::all(10)).await.unwrap();
    assert_eq!(
        urls(&all),
        vec!["https://example.com/3", "https://example.com/2", "https://example.com/1"]
    );

    // Re-saving does not move an article to the front.
    store.save(new_article("https://example.com/1", Category::Technology, 2)).await.unwrap();
    let again = store.query(&ArticleQuery::all(10)).await.unwrap();
    assert_eq!(urls(&again), urls(&all));

    let limited = store.query(&ArticleQuery::all(2)).await.unwrap();
    assert_eq!(urls(&limited), vec!["https://example.com/3", "https://example.com/2"]);

    let unread = store
        .query(&ArticleQuery::new(ArticleFilter::Status(ArticleStatus::Unread), 10))
        .await
        .unwrap();
    assert_eq!(urls(&unread), vec!["https://example.com/3", "https://example.com/1"]);

    let read = store
        .query(&ArticleQuery::new(ArticleFilter::Status(ArticleStatus::Read), 10))
        .await
        .unwrap();
    assert_eq!(urls(&read), vec!["https://example.com/2"]);

    let tech = store
        .query(&ArticleQuery::new(ArticleFilter::Category(Category::Technology), 10))
        .await
        .unwrap();
    assert_eq!(urls(&tech), vec!["https://example.com/3", "https://example.com/1"]);
}

pub async fn empty_store_queries(store: &dyn ArticleStore) {
    assert!(store.query(&ArticleQuery::all(10)).await.unwrap().is_empty());
    assert!(store.search("anything", 10).await.unwrap().is_empty());
    assert!(store.categories().await.unwrap().is_empty());
    assert!(store.mark_read("https://example.com/none").await.unwrap().is_none());
    assert!(!store.delete("https://example.com/none").await.unwrap());

    let stats = store.stats().await.unwrap();
    assert_eq!(stats.total_articles, 0);
    assert_eq!(stats.read_percentage, 0.0);
    assert!(stats.top_category.is_none());
}

pub async fn mark_read_and_delete(store: &dyn ArticleStore) {
    let url = "https://example.com/read-me";
    store.save(new_article(url, Category::Health, 3)).await.unwrap();

    let read = store.mark_read(url).await.unwrap().unwrap();
    assert_eq!(read.status, ArticleStatus::Read);
    let read_at = read.read_at.unwrap();

    let again = store.mark_read(url).await.unwrap().unwrap();
    assert_eq!(again.read_at, Some(read_at));

    assert!(store.delete(url).await.unwrap());
    assert!(store.get_by_url(url).await.unwrap().is_none());
    assert!(!store.delete(url).await.unwrap());
}

pub async fn search_matches_fields(store: &dyn ArticleStore) {
    let mut a = new_article("https://example.com/tokio", Category::Technology, 1);
    a.title = "Tokio Deep Dive".into();
    let mut b = new_article("https://example.com/k8s", Category::Technology, 1);
    b.description = Some("A look at Kubernetes operators".into());
    let mut c = new_article("https://example.com/garden", Category::Lifestyle, 1);
    c.keywords = vec!["gardening".into()];

    for article in [a, b, c] {
        store.save(article).await.unwrap();
    }

    assert_eq!(urls(&store.search("TOKIO", 10).await.unwrap()), vec!["https://example.com/tokio"]);
    assert_eq!(urls(&store.search("kubernetes", 10).await.unwrap()), vec!["https://example.com/k8s"]);
    assert_eq!(urls(&store.search("garden", 10).await.unwrap()), vec!["https://example.com/garden"]);
    assert!(store.search("100%", 10).await.unwrap().is_empty());
    assert!(store.search("   ", 10).await.unwrap().is_empty());

    // Every snippet mentions async.
    assert_eq!(store.search("async", 10).await.unwrap().len(), 3);
    assert_eq!(store.search("async", 2).await.unwrap().len(), 2);
}

pub async fn stats_and_categories(store: &dyn ArticleStore) {
    store.save(new_article("https://example.com/t1", Category::Technology, 2)).await.unwrap();
    store.save(new_article("https://example.com/t2", Category::Technology, 4)).await.unwrap();
    store.save(new_article("https://example.com/s1", Category::Science, 3)).await.unwrap();
    store.mark_read("https://example.com/t2").await.unwrap();

    let stats = store.stats().await.unwrap();
    assert_eq!(stats.total_articles, 3);
    assert_eq!(stats.unread, 2);
    assert_eq!(stats.read, 1);
    assert_eq!(stats.total_reading_minutes, 9);
    assert_eq!(stats.read_reading_minutes, 4);
    assert_eq!(stats.average_reading_minutes, 3.0);
    assert_eq!(stats.read_percentage, 33.3);
    assert_eq!(stats.top_category, Some(Category::Technology));
    assert_eq!(stats.by_category.get(&Category::Technology), Some(&2));
    assert_eq!(stats.by_category.get(&Category::Science), Some(&1));

    let categories = store.categories().await.unwrap();
    assert_eq!(
        categories,
        vec![
            CategoryCount { category: Category::Technology, count: 2 },
            CategoryCount { category: Category::Science, count: 1 },
        ]
    );
}

pub async fn normalizes_invariants_on_save(store: &dyn ArticleStore) {
    let mut bare = new_article("https://example.com/bare", Category::General, 0);
    bare.title = String::new();
    bare.keywords.clear();

    let saved = store.save(bare).await.unwrap().article;
    assert_eq!(saved.title, "https://example.com/bare");
    assert_eq!(saved.keywords, vec![SENTINEL_KEYWORD]);
    assert_eq!(saved.read_time_minutes, 1);

    let mut noisy = new_article("https://example.com/noisy", Category::General, 3);
    noisy.title = "t".repeat(300);
    noisy.keywords = ["a", "a", "b", "c", "d", "e", "f"].map(String::from).to_vec();

    let saved = store.save(noisy).await.unwrap().article;
    assert_eq!(saved.keywords, vec!["a", "b", "c", "d", "e"]);
    assert_eq!(saved.title.chars().count(), MAX_TITLE_CHARS);

    let reloaded = store.get(saved.id).await.unwrap().unwrap();
    assert_eq!(reloaded.keywords, saved.keywords);
    assert_eq!(reloaded.title, saved.title);
}

pub async fn concurrent_saves(store: Arc<dyn ArticleStore>) {
    let mut handles = Vec::new();
    for i in 0..16 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store
                .save(new_article(&format!("https://example.com/p/{i}"), Category::Technology, 1))
                .await
        }));
    }
    for i in 0..8 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store
                .save(new_article("https://example.com/same", Category::Science, i + 1))
                .await
        }));
    }

    let mut created_same = 0;
    for handle in handles {
        let outcome = handle.await.unwrap().unwrap();
        if outcome.article.url == "https://example.com/same" && outcome.created {
            created_same += 1;
        }
    }

    assert_eq!(created_same, 1);
    let all = store.query(&ArticleQuery::all(100)).await.unwrap();
    assert_eq!(all.len(), 17);
    assert_eq!(all.iter().filter(|a| a.url == "https://example.com/same").count(), 1);
}
