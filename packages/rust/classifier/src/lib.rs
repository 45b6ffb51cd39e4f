//! Article classification for readlater.
//!
//! A [`Classifier`] turns extracted text into a taxonomy [`Category`], a
//! short keyword list and a read-time estimate. Two implementations:
//! - [`RuleBasedClassifier`]: deterministic vocabulary scoring (default)
//! - [`OpenRouterClassifier`]: asks a chat model, read time still local

pub mod openrouter;
pub mod rules;
mod vocabulary;

use std::sync::Arc;

use async_trait::async_trait;
use readlater_shared::{
    AppConfig, Category, ClassifierBackend, MIN_READ_TIME_MINUTES, Result, SENTINEL_KEYWORD,
    validate_api_key,
};
use serde::Serialize;

pub use openrouter::OpenRouterClassifier;
pub use rules::RuleBasedClassifier;

/// Reading speed used when the configured value is unusable.
pub const DEFAULT_WORDS_PER_MINUTE: u32 = 200;

/// Result of classifying one article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub category: Category,
    /// Ranked, deduplicated, never empty.
    pub keywords: Vec<String>,
    pub read_time_minutes: u32,
    pub word_count: usize,
}

impl Classification {
    /// Values used when classification is impossible or fails.
    pub fn fallback() -> Self {
        Self {
            category: Category::FALLBACK,
            keywords: vec![SENTINEL_KEYWORD.to_string()],
            read_time_minutes: MIN_READ_TIME_MINUTES,
            word_count: 0,
        }
    }
}

/// Assigns category, keywords and read time to extracted text.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    async fn classify(&self, title: &str, body: &str) -> Result<Classification>;
}

/// `max(1, ceil(words / wpm))`.
pub fn read_time_minutes(word_count: usize, words_per_minute: u32) -> u32 {
    let wpm = if words_per_minute == 0 {
        DEFAULT_WORDS_PER_MINUTE
    } else {
        words_per_minute
    } as usize;

    let minutes = word_count.div_ceil(wpm);
    u32::try_from(minutes)
        .unwrap_or(u32::MAX)
        .max(MIN_READ_TIME_MINUTES)
}

/// Build the classifier selected by `[classifier] backend`.
pub fn from_config(config: &AppConfig) -> Result<Arc<dyn Classifier>> {
    let rules = RuleBasedClassifier::new(&config.classifier);
    match config.classifier.backend {
        ClassifierBackend::Rules => Ok(Arc::new(rules)),
        ClassifierBackend::OpenRouter => {
            let api_key = validate_api_key(config)?;
            Ok(Arc::new(OpenRouterClassifier::new(
                &config.openrouter,
                api_key,
                rules,
            )?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_time_rounds_up() {
        assert_eq!(read_time_minutes(0, 200), 1);
        assert_eq!(read_time_minutes(1, 200), 1);
        assert_eq!(read_time_minutes(200, 200), 1);
        assert_eq!(read_time_minutes(201, 200), 2);
        assert_eq!(read_time_minutes(220, 200), 2);
        assert_eq!(read_time_minutes(1000, 200), 5);
    }

    #[test]
    fn zero_wpm_uses_default() {
        assert_eq!(read_time_minutes(400, 0), 2);
    }

    #[test]
    fn fallback_satisfies_invariants() {
        let c = Classification::fallback();
        assert_eq!(c.category, Category::General);
        assert_eq!(c.keywords, vec!["untagged"]);
        assert_eq!(c.read_time_minutes, 1);
    }

    #[test]
    fn default_config_builds_rules() {
        let classifier = from_config(&AppConfig::default()).unwrap();
        assert_eq!(classifier.name(), "rules");
    }

    #[test]
    fn openrouter_without_key_is_config_error() {
        let mut config = AppConfig::default();
        config.classifier.backend = ClassifierBackend::OpenRouter;
        config.openrouter.api_key_env = "RL_TEST_MISSING_OPENROUTER_KEY_987".into();
        let err = from_config(&config).err().unwrap();
        assert!(err.to_string().contains("API key not found"));
    }
}
