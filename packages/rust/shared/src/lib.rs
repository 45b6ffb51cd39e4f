//! Shared types, error model, and configuration for readlater.
//!
//! This crate is the foundation depended on by all other readlater crates.
//! It provides:
//! - [`ReadLaterError`]: the unified error type
//! - Domain types ([`Article`], [`Category`], [`ReadingStats`], [`ArticleId`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ClassifierBackend, ClassifierConfig, FetchConfig, OpenRouterConfig,
    ResponderConfig, StorageConfig, config_dir, config_file_path, expand_home, init_config,
    load_config, load_config_from, validate_api_key,
};
pub use error::{ErrorCategory, ReadLaterError, Result};
pub use types::{
    Article, ArticleId, ArticleStatus, Category, MAX_KEYWORDS, MAX_TITLE_CHARS,
    MIN_READ_TIME_MINUTES, NewArticle, ReadingStats, SENTINEL_KEYWORD,
};
