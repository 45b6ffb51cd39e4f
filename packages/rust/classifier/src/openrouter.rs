//! Model-backed classifier using the OpenRouter chat completions API.
//!
//! The model only picks the category and keywords. Read time is always
//! computed locally so it stays comparable across backends.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use readlater_shared::{Category, OpenRouterConfig, ReadLaterError, Result, SENTINEL_KEYWORD};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::rules::RuleBasedClassifier;
use crate::{Classification, Classifier, read_time_minutes};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Body text sent to the model is cut to this many characters.
const MAX_PROMPT_BODY_CHARS: usize = 6_000;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// What the model is asked to return.
#[derive(Debug, Deserialize)]
struct ModelVerdict {
    category: String,
    #[serde(default)]
    keywords: Vec<String>,
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

pub struct OpenRouterClassifier {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    rules: RuleBasedClassifier,
}

impl fmt::Debug for OpenRouterClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenRouterClassifier")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl OpenRouterClassifier {
    /// `rules` supplies the keyword cap and reading speed.
    pub fn new(
        config: &OpenRouterConfig,
        api_key: String,
        rules: RuleBasedClassifier,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ReadLaterError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            model: config.default_model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            rules,
        })
    }

    fn prompt(&self, title: &str, body: &str) -> String {
        let labels: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
        let body: String = body.chars().take(MAX_PROMPT_BODY_CHARS).collect();
        format!(
            "Classify this article for a reading list.\n\
             Reply with JSON only: {{\"category\": <one of {labels}>, \"keywords\": [up to {k} short lowercase keywords]}}.\n\n\
             Title: {title}\n\nContent:\n{body}",
            labels = labels.join(", "),
            k = self.rules.max_keywords(),
        )
    }

    async fn ask(&self, prompt: String) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user".into(),
                content: prompt,
            }],
            temperature: 0.0,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ReadLaterError::Classification(format!("openrouter request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReadLaterError::Classification(format!(
                "openrouter returned HTTP {status}"
            )));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            ReadLaterError::Classification(format!("invalid openrouter response: {e}"))
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ReadLaterError::Classification("openrouter returned no choices".into()))
    }

    fn normalize_keywords(&self, raw: Vec<String>) -> Vec<String> {
        let mut keywords: Vec<String> = Vec::new();
        for kw in raw {
            let kw = kw.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
            if !kw.is_empty() && !keywords.contains(&kw) {
                keywords.push(kw);
            }
            if keywords.len() == self.rules.max_keywords() {
                break;
            }
        }

        if keywords.is_empty() {
            keywords.push(SENTINEL_KEYWORD.to_string());
        }
        keywords
    }
}

#[async_trait]
impl Classifier for OpenRouterClassifier {
    fn name(&self) -> &'static str {
        "openrouter"
    }

    #[instrument(skip_all, fields(model = %self.model))]
    async fn classify(&self, title: &str, body: &str) -> Result<Classification> {
        let word_count = body.split_whitespace().count();
        if title.trim().is_empty() && word_count == 0 {
            return Ok(Classification::fallback());
        }

        let content = self.ask(self.prompt(title, body)).await?;
        let verdict = parse_verdict(&content)?;

        let category = Category::from_str(verdict.category.trim()).unwrap_or_else(|_| {
            warn!(label = %verdict.category, "model returned unknown category");
            Category::FALLBACK
        });
        let keywords = self.normalize_keywords(verdict.keywords);

        debug!(%category, ?keywords, "model classification");

        Ok(Classification {
            category,
            keywords,
            read_time_minutes: read_time_minutes(word_count, self.rules.words_per_minute()),
            word_count,
        })
    }
}

/// Parse the model's JSON, tolerating a Markdown code fence around it.
fn parse_verdict(content: &str) -> Result<ModelVerdict> {
    let trimmed = content.trim();
    let json = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|s| s.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    serde_json::from_str(json)
        .map_err(|e| ReadLaterError::Classification(format!("unparseable model output: {e}")))
}
