//! SQL migration definitions for the readlater database.
//!
//! Applied in order on open. Each migration records its own version in
//! `schema_migrations` as its last statement.

pub(crate) struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// All migrations, in ascending version order.
pub(crate) fn all_migrations() -> Vec<Migration> {
    vec![
        Migration {
            version: 1,
            description: "Initial schema: articles",
            sql: r#"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version    INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS articles (
    id                TEXT PRIMARY KEY,
    url               TEXT NOT NULL UNIQUE,
    domain            TEXT NOT NULL,
    title             TEXT NOT NULL,
    description       TEXT,
    author            TEXT,
    content_snippet   TEXT NOT NULL DEFAULT '',
    category          TEXT NOT NULL,
    keywords          TEXT NOT NULL,
    read_time_minutes INTEGER NOT NULL CHECK (read_time_minutes >= 1),
    status            TEXT NOT NULL DEFAULT 'unread' CHECK (status IN ('unread', 'read')),
    saved_at          TEXT NOT NULL,
    updated_at        TEXT NOT NULL,
    read_at           TEXT
);

INSERT INTO schema_migrations (version) VALUES (1);
"#,
        },
        Migration {
            version: 2,
            description: "Indexes for listing by status and category",
            sql: r#"
CREATE INDEX IF NOT EXISTS idx_articles_saved_at ON articles(saved_at);
CREATE INDEX IF NOT EXISTS idx_articles_status ON articles(status, saved_at);
CREATE INDEX IF NOT EXISTS idx_articles_category ON articles(category, saved_at);

INSERT INTO schema_migrations (version) VALUES (2);
"#,
        },
    ]
}
