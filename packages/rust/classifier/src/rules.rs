//! Deterministic vocabulary-based classifier.

use std::collections::HashMap;
use std::sync::LazyLock;

use async_trait::async_trait;
use readlater_shared::{Category, ClassifierConfig, MAX_KEYWORDS, Result, SENTINEL_KEYWORD};
use regex::Regex;
use tracing::debug;

use crate::vocabulary::{STOP_WORDS, terms};
use crate::{Classification, Classifier, read_time_minutes};

/// Title terms count this many times more than body terms.
const TITLE_WEIGHT: usize = 3;

/// Shortest token eligible as a keyword.
const MIN_KEYWORD_CHARS: usize = 3;

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\p{Alphabetic}+").expect("valid regex"));

/// Scores text against fixed per-category vocabularies.
#[derive(Debug, Clone)]
pub struct RuleBasedClassifier {
    words_per_minute: u32,
    max_keywords: usize,
}

impl Default for RuleBasedClassifier {
    fn default() -> Self {
        Self::new(&ClassifierConfig::default())
    }
}

impl RuleBasedClassifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            words_per_minute: config.words_per_minute,
            max_keywords: config.max_keywords.clamp(1, MAX_KEYWORDS),
        }
    }

    /// Synchronous core of [`Classifier::classify`].
    pub fn classify_text(&self, title: &str, body: &str) -> Classification {
        let title_tokens = tokenize(title);
        let body_tokens = tokenize(body);
        let word_count = body.split_whitespace().count();

        let category = self.categorize(&title_tokens, &body_tokens);
        let keywords = self.keywords(&title_tokens, &body_tokens);

        Classification {
            category,
            keywords,
            read_time_minutes: read_time_minutes(word_count, self.words_per_minute),
            word_count,
        }
    }

    /// Ranked keywords for the given text, sentinel when nothing qualifies.
    pub fn extract_keywords(&self, text: &str) -> Vec<String> {
        self.keywords(&tokenize(text), &[])
    }

    pub(crate) fn words_per_minute(&self) -> u32 {
        self.words_per_minute
    }

    pub(crate) fn max_keywords(&self) -> usize {
        self.max_keywords
    }

    fn categorize(&self, title: &[String], body: &[String]) -> Category {
        let mut best = Category::FALLBACK;
        let mut best_score = 0;

        // Strictly-greater keeps the earlier category on ties.
        for category in Category::ALL {
            let score: usize = terms(category)
                .iter()
                .map(|term| TITLE_WEIGHT * term_hits(title, term) + term_hits(body, term))
                .sum();

            if score > best_score {
                best = category;
                best_score = score;
            }
        }

        debug!(category = %best, score = best_score, "rule-based category");
        best
    }

    fn keywords(&self, title: &[String], body: &[String]) -> Vec<String> {
        // token -> (count, first position)
        let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();

        for (pos, token) in title.iter().chain(body).enumerate() {
            if token.chars().count() < MIN_KEYWORD_CHARS || is_stop_word(token) {
                continue;
            }
            counts
                .entry(token.as_str())
                .and_modify(|(count, _)| *count += 1)
                .or_insert((1, pos));
        }

        let mut ranked: Vec<(&str, usize, usize)> = counts
            .into_iter()
            .map(|(token, (count, first))| (token, count, first))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

        let keywords: Vec<String> = ranked
            .into_iter()
            .take(self.max_keywords)
            .map(|(token, _, _)| token.to_string())
            .collect();

        if keywords.is_empty() {
            vec![SENTINEL_KEYWORD.to_string()]
        } else {
            keywords
        }
    }
}

#[async_trait]
impl Classifier for RuleBasedClassifier {
    fn name(&self) -> &'static str {
        "rules"
    }

    async fn classify(&self, title: &str, body: &str) -> Result<Classification> {
        Ok(self.classify_text(title, body))
    }
}

/// Lowercase alphabetic runs.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    TOKEN_RE
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.binary_search(&token).is_ok()
}

/// A token matches a term exactly or as its simple plural.
fn token_matches(token: &str, term: &str) -> bool {
    token == term || token.strip_suffix('s') == Some(term)
}

/// Occurrences of `term` in `tokens`; multi-word terms match consecutive tokens.
fn term_hits(tokens: &[String], term: &str) -> usize {
    let parts: Vec<&str> = term.split(' ').collect();
    if parts.len() == 1 {
        return tokens.iter().filter(|t| token_matches(t, term)).count();
    }

    tokens
        .windows(parts.len())
        .filter(|window| {
            window
                .iter()
                .zip(&parts)
                .all(|(token, part)| token_matches(token, part))
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> RuleBasedClassifier {
        RuleBasedClassifier::default()
    }

    #[test]
    fn empty_input_is_fallback() {
        let c = classifier().classify_text("", "");
        assert_eq!(c, Classification::fallback());
    }

    #[test]
    fn technology_text() {
        let body = "The server handles every network request with async code. \
                    Developers tune the runtime and the database driver for the API.";
        let c = classifier().classify_text("Scaling backend software", body);
        assert_eq!(c.category, Category::Technology);
        assert!(!c.keywords.is_empty());
        assert!(c.keywords.len() <= 5);
    }

    #[test]
    fn health_text() {
        let body = "Doctors say a steady sleep schedule and a balanced diet reduce the risk \
                    of disease. Patients in the clinical trial reported fewer symptoms.";
        let c = classifier().classify_text("Sleep and your health", body);
        assert_eq!(c.category, Category::Health);
    }

    #[test]
    fn title_outweighs_body() {
        // One body hit for Business, one title hit for Sports.
        let c = classifier().classify_text("Tournament recap", "The company sponsored it.");
        assert_eq!(c.category, Category::Sports);
    }

    #[test]
    fn ties_follow_taxonomy_order() {
        let c = classifier().classify_text("", "software research");
        assert_eq!(c.category, Category::Technology);

        let c = classifier().classify_text("", "election recipe");
        assert_eq!(c.category, Category::Politics);
    }

    #[test]
    fn phrases_match_consecutive_tokens() {
        let tokens = tokenize("Machine learning beats learning machines");
        assert_eq!(term_hits(&tokens, "machine learning"), 1);
        assert_eq!(term_hits(&tokens, "learning"), 2);
    }

    #[test]
    fn plural_tokens_match_terms() {
        let tokens = tokenize("servers and databases");
        assert_eq!(term_hits(&tokens, "server"), 1);
        assert_eq!(term_hits(&tokens, "database"), 1);
    }

    #[test]
    fn no_signal_is_general() {
        let c = classifier().classify_text("Untitled", "lorem ipsum dolor sit amet");
        assert_eq!(c.category, Category::General);
        assert_ne!(c.keywords, vec![SENTINEL_KEYWORD]);
    }

    #[test]
    fn keywords_ranked_by_frequency_then_first_seen() {
        let c = classifier();
        let kws = c.extract_keywords("zeta alpha beta alpha gamma beta alpha delta epsilon omega");
        assert_eq!(kws, vec!["alpha", "beta", "zeta", "gamma", "delta"]);
    }

    #[test]
    fn keywords_skip_stop_words_and_short_tokens() {
        let kws = classifier().extract_keywords("the and of to is it rust");
        assert_eq!(kws, vec!["rust"]);
    }

    #[test]
    fn keywords_sentinel_when_nothing_qualifies() {
        let kws = classifier().extract_keywords("a an of to 42 !!");
        assert_eq!(kws, vec![SENTINEL_KEYWORD]);
    }

    #[test]
    fn keyword_cap_is_configurable() {
        let config = ClassifierConfig {
            max_keywords: 2,
            ..ClassifierConfig::default()
        };
        let kws = RuleBasedClassifier::new(&config).extract_keywords("red green blue cyan");
        assert_eq!(kws, vec!["red", "green"]);
    }

    #[test]
    fn read_time_from_body_words() {
        let body = "word ".repeat(220);
        let c = classifier().classify_text("Title", &body);
        assert_eq!(c.word_count, 220);
        assert_eq!(c.read_time_minutes, 2);
    }

    #[tokio::test]
    async fn trait_classify_matches_sync() {
        let c = classifier();
        let via_trait = c.classify("Cooking at home", "A simple recipe for food lovers").await.unwrap();
        assert_eq!(via_trait, c.classify_text("Cooking at home", "A simple recipe for food lovers"));
        assert_eq!(via_trait.category, Category::Lifestyle);
    }
}
