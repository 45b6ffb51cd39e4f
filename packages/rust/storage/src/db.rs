//! libSQL-backed [`ArticleStore`] (local file, offline mode).

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use libsql::{Connection, Database, params};
use readlater_shared::{
    Article, ArticleId, ArticleStatus, Category, NewArticle, ReadLaterError, ReadingStats,
    Result,
};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::migrations;
use crate::{ArticleFilter, ArticleQuery, ArticleStore, CategoryCount, SaveOutcome};

const COLUMNS: &str = "id, url, domain, title, description, author, content_snippet, category, \
                       keywords, read_time_minutes, status, saved_at, updated_at, read_at";

/// Newest first; rowid keeps same-instant saves in reverse insertion order.
const ORDER: &str = "ORDER BY saved_at DESC, rowid DESC";

fn storage_err(e: libsql::Error) -> ReadLaterError {
    ReadLaterError::Storage(e.to_string())
}

/// Durable article store on a local libSQL database.
pub struct LibsqlStore {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
    /// Serializes writers so read-modify-write sequences never interleave.
    write_lock: Mutex<()>,
}

impl LibsqlStore {
    /// Open or create a database at `path` and apply pending migrations.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| ReadLaterError::io(parent, e))?;
            }
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(storage_err)?;
        let conn = db.connect().map_err(storage_err)?;

        let store = Self {
            db,
            conn,
            write_lock: Mutex::new(()),
        };
        store.run_migrations().await?;
        debug!(path = %path.display(), "article store opened");
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.schema_version().await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn.execute_batch(migration.sql).await.map_err(|e| {
                    ReadLaterError::Storage(format!("migration v{} failed: {e}", migration.version))
                })?;
            }
        }
        Ok(())
    }

    /// Current schema version, or 0 on a fresh database.
    pub(crate) async fn schema_version(&self) -> u32 {
        let result = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => match rows.next().await {
                Ok(Some(row)) => row.get::<u32>(0).unwrap_or(0),
                _ => 0,
            },
            // Table doesn't exist yet
            Err(_) => 0,
        }
    }

    async fn fetch_one(&self, condition: &str, value: &str) -> Result<Option<Article>> {
        let sql = format!("SELECT {COLUMNS} FROM articles WHERE {condition} = ?1");
        let mut rows = self.conn.query(&sql, params![value]).await.map_err(storage_err)?;

        match rows.next().await.map_err(storage_err)? {
            Some(row) => Ok(Some(row_to_article(&row)?)),
            None => Ok(None),
        }
    }

    async fn collect(&self, mut rows: libsql::Rows) -> Result<Vec<Article>> {
        let mut articles = Vec::new();
        while let Some(row) = rows.next().await.map_err(storage_err)? {
            articles.push(row_to_article(&row)?);
        }
        Ok(articles)
    }
}

#[async_trait]
impl ArticleStore for LibsqlStore {
    #[instrument(skip_all, fields(url = %article.url))]
    async fn save(&self, article: NewArticle) -> Result<SaveOutcome> {
        let article = article.normalized();
        let keywords = serde_json::to_string(&article.keywords)
            .map_err(|e| ReadLaterError::Storage(format!("keywords encode failed: {e}")))?;
        let _guard = self.write_lock.lock().await;
        let now = timestamp(&Utc::now());

        let existed = self.fetch_one("url", &article.url).await?.is_some();

        self.conn
            .execute(
                "INSERT INTO articles (id, url, domain, title, description, author, content_snippet,
                                       category, keywords, read_time_minutes, status, saved_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 'unread', ?11, ?11)
                 ON CONFLICT(url) DO UPDATE SET
                   domain = excluded.domain,
                   title = excluded.title,
                   description = excluded.description,
                   author = excluded.author,
                   content_snippet = excluded.content_snippet,
                   category = excluded.category,
                   keywords = excluded.keywords,
                   read_time_minutes = excluded.read_time_minutes,
                   updated_at = excluded.updated_at",
                params![
                    ArticleId::new().to_string(),
                    article.url.as_str(),
                    article.domain.as_str(),
                    article.title.as_str(),
                    article.description.as_deref(),
                    article.author.as_deref(),
                    article.content_snippet.as_str(),
                    article.category.as_str(),
                    keywords,
                    i64::from(article.read_time_minutes),
                    now,
                ],
            )
            .await
            .map_err(storage_err)?;

        let saved = self
            .fetch_one("url", &article.url)
            .await?
            .ok_or_else(|| ReadLaterError::Storage("saved article vanished".into()))?;

        debug!(id = %saved.id, created = !existed, "article saved");
        Ok(SaveOutcome {
            article: saved,
            created: !existed,
        })
    }

    async fn get(&self, id: ArticleId) -> Result<Option<Article>> {
        self.fetch_one("id", &id.to_string()).await
    }

    async fn get_by_url(&self, url: &str) -> Result<Option<Article>> {
        self.fetch_one("url", url).await
    }

    async fn query(&self, query: &ArticleQuery) -> Result<Vec<Article>> {
        let limit = i64::try_from(query.limit).unwrap_or(i64::MAX);
        let rows = match query.filter {
            ArticleFilter::All => {
                let sql = format!("SELECT {COLUMNS} FROM articles {ORDER} LIMIT ?1");
                self.conn.query(&sql, params![limit]).await
            }
            ArticleFilter::Status(status) => {
                let sql = format!("SELECT {COLUMNS} FROM articles WHERE status = ?1 {ORDER} LIMIT ?2");
                self.conn.query(&sql, params![status.as_str(), limit]).await
            }
            ArticleFilter::Category(category) => {
                let sql =
                    format!("SELECT {COLUMNS} FROM articles WHERE category = ?1 {ORDER} LIMIT ?2");
                self.conn.query(&sql, params![category.as_str(), limit]).await
            }
        }
        .map_err(storage_err)?;

        self.collect(rows).await
    }

    async fn search(&self, terms: &str, limit: usize) -> Result<Vec<Article>> {
        if terms.trim().is_empty() {
            return Ok(Vec::new());
        }

        let pattern = like_pattern(terms);
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let sql = format!(
            r"SELECT {COLUMNS} FROM articles
              WHERE lower(title) LIKE ?1 ESCAPE '\'
                 OR lower(coalesce(description, '')) LIKE ?1 ESCAPE '\'
                 OR lower(content_snippet) LIKE ?1 ESCAPE '\'
                 OR lower(keywords) LIKE ?1 ESCAPE '\'
              {ORDER} LIMIT ?2"
        );

        let rows = self
            .conn
            .query(&sql, params![pattern, limit])
            .await
            .map_err(storage_err)?;
        self.collect(rows).await
    }

    async fn stats(&self) -> Result<ReadingStats> {
        let mut rows = self
            .conn
            .query(
                "SELECT category, status, COUNT(*), COALESCE(SUM(read_time_minutes), 0)
                 FROM articles GROUP BY category, status",
                params![],
            )
            .await
            .map_err(storage_err)?;

        let mut stats = ReadingStats::default();
        while let Some(row) = rows.next().await.map_err(storage_err)? {
            let category = parse_category(&row.get::<String>(0).map_err(storage_err)?)?;
            let status = parse_status(&row.get::<String>(1).map_err(storage_err)?)?;
            let count = row.get::<i64>(2).map_err(storage_err)? as usize;
            let minutes = row.get::<i64>(3).map_err(storage_err)? as u64;

            stats.total_articles += count;
            stats.total_reading_minutes += minutes;
            match status {
                ArticleStatus::Unread => stats.unread += count,
                ArticleStatus::Read => {
                    stats.read += count;
                    stats.read_reading_minutes += minutes;
                }
            }
            *stats.by_category.entry(category).or_insert(0) += count;
        }

        stats.finish();
        Ok(stats)
    }

    async fn categories(&self) -> Result<Vec<CategoryCount>> {
        let mut rows = self
            .conn
            .query(
                "SELECT category, COUNT(*) FROM articles GROUP BY category",
                params![],
            )
            .await
            .map_err(storage_err)?;

        let mut counts = Vec::new();
        while let Some(row) = rows.next().await.map_err(storage_err)? {
            counts.push(CategoryCount {
                category: parse_category(&row.get::<String>(0).map_err(storage_err)?)?,
                count: row.get::<i64>(1).map_err(storage_err)? as usize,
            });
        }

        crate::sort_category_counts(&mut counts);
        Ok(counts)
    }

    #[instrument(skip_all, fields(url = %url))]
    async fn mark_read(&self, url: &str) -> Result<Option<Article>> {
        let _guard = self.write_lock.lock().await;
        let now = timestamp(&Utc::now());

        let changed = self
            .conn
            .execute(
                "UPDATE articles SET status = 'read', read_at = COALESCE(read_at, ?2) WHERE url = ?1",
                params![url, now],
            )
            .await
            .map_err(storage_err)?;

        if changed == 0 {
            return Ok(None);
        }
        self.fetch_one("url", url).await
    }

    #[instrument(skip_all, fields(url = %url))]
    async fn delete(&self, url: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let removed = self
            .conn
            .execute("DELETE FROM articles WHERE url = ?1", params![url])
            .await
            .map_err(storage_err)?;
        Ok(removed > 0)
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

/// Fixed-width UTC timestamp so text ordering matches time ordering.
fn timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ReadLaterError::Storage(format!("invalid date '{s}': {e}")))
}

fn parse_category(s: &str) -> Result<Category> {
    s.parse().map_err(ReadLaterError::Storage)
}

fn parse_status(s: &str) -> Result<ArticleStatus> {
    s.parse().map_err(ReadLaterError::Storage)
}

/// `%terms%`, lowercased, with LIKE wildcards escaped.
fn like_pattern(terms: &str) -> String {
    let mut pattern = String::from("%");
    for c in terms.trim().to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn row_to_article(row: &libsql::Row) -> Result<Article> {
    let id: String = row.get(0).map_err(storage_err)?;
    let keywords: String = row.get(8).map_err(storage_err)?;
    let saved_at: String = row.get(11).map_err(storage_err)?;
    let updated_at: String = row.get(12).map_err(storage_err)?;

    Ok(Article {
        id: id
            .parse()
            .map_err(|e| ReadLaterError::Storage(format!("invalid article id '{id}': {e}")))?,
        url: row.get(1).map_err(storage_err)?,
        domain: row.get(2).map_err(storage_err)?,
        title: row.get(3).map_err(storage_err)?,
        description: row.get::<String>(4).ok(),
        author: row.get::<String>(5).ok(),
        content_snippet: row.get(6).map_err(storage_err)?,
        category: parse_category(&row.get::<String>(7).map_err(storage_err)?)?,
        keywords: serde_json::from_str(&keywords)
            .map_err(|e| ReadLaterError::Storage(format!("invalid keywords: {e}")))?,
        read_time_minutes: row.get::<u32>(9).map_err(storage_err)?,
        status: parse_status(&row.get::<String>(10).map_err(storage_err)?)?,
        saved_at: parse_timestamp(&saved_at)?,
        updated_at: parse_timestamp(&updated_at)?,
        read_at: row
            .get::<String>(13)
            .ok()
            .map(|s| parse_timestamp(&s))
            .transpose()?,
    })
}
