//! HTML → readable text for readlater.
//!
//! [`extract`] never fails: a page with nothing usable comes back with the
//! URL as its title and an empty body, and the classifier takes it from
//! there.

mod body;
mod meta;

use scraper::Html;
use tracing::debug;
use url::Url;

pub use body::MAX_BODY_CHARS;
pub use meta::MAX_TITLE_CHARS;

/// What the extractor pulled out of one page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractedContent {
    /// Page title, or the URL when none was found. Never empty.
    pub title: String,
    /// Main text, one line per block element. May be empty.
    pub body: String,
    pub description: Option<String>,
    pub author: Option<String>,
    /// Publication date string as found on the page.
    pub published: Option<String>,
}

impl ExtractedContent {
    /// The `(url, "")` result used for pages with no usable content.
    pub fn empty(url: &Url) -> Self {
        Self {
            title: url_title(url),
            ..Self::default()
        }
    }

    /// Whitespace-separated word count of the body.
    pub fn word_count(&self) -> usize {
        self.body.split_whitespace().count()
    }
}

/// Extract title, body and metadata from an HTML document.
pub fn extract(html: &str, url: &Url) -> ExtractedContent {
    if html.trim().is_empty() {
        return ExtractedContent::empty(url);
    }

    let doc = Html::parse_document(html);

    let title = meta::find_title(&doc).unwrap_or_else(|| url_title(url));
    let body = body::extract_body(&doc);

    let content = ExtractedContent {
        title,
        body,
        description: meta::find_description(&doc),
        author: meta::find_author(&doc),
        published: meta::find_published(&doc),
    };

    debug!(
        %url,
        title = %content.title,
        words = content.word_count(),
        "content extracted"
    );

    content
}

fn url_title(url: &Url) -> String {
    url.as_str().chars().take(MAX_TITLE_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fixture_path(name: &str) -> std::path::PathBuf {
        std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures/html")
            .join(name)
    }

    fn load_fixture(name: &str) -> String {
        fs::read_to_string(fixture_path(name))
            .unwrap_or_else(|e| panic!("failed to read fixture {name}: {e}"))
    }

    fn url() -> Url {
        Url::parse("https://blog.example.com/posts/rust-async").unwrap()
    }

    #[test]
    fn empty_input_yields_url_and_empty_body() {
        let content = extract("", &url());
        assert_eq!(content.title, "https://blog.example.com/posts/rust-async");
        assert!(content.body.is_empty());
        assert_eq!(content.word_count(), 0);
    }

    #[test]
    fn garbage_input_yields_url_and_empty_body() {
        let content = extract("<<<>>> \u{0} </div></div> <p", &url());
        assert_eq!(content.title, url().as_str());
        assert!(content.body.is_empty());
        assert_eq!(content, ExtractedContent::empty(&url()));
    }

    #[test]
    fn no_title_falls_back_to_url() {
        let content = extract("<html><body><p>Just a paragraph.</p></body></html>", &url());
        assert_eq!(content.title, url().as_str());
        assert_eq!(content.body, "Just a paragraph.");
    }

    #[test]
    fn technology_fixture() {
        let html = load_fixture("technology-article.html");
        let content = extract(&html, &url());

        assert_eq!(content.title, "Why Rust Async Runtimes Matter for Backend Software");
        assert_eq!(content.author.as_deref(), Some("Jamie Rivera"));
        assert_eq!(content.published.as_deref(), Some("2024-05-14T09:30:00Z"));
        assert!(content.description.is_some());

        // Chrome and scripts are gone, article text remains.
        assert!(!content.body.contains("Subscribe"));
        assert!(!content.body.contains("analytics"));
        assert!(content.body.contains("async runtime"));
        assert!((201..=400).contains(&content.word_count()));
    }

    #[test]
    fn cluttered_fixture_prefers_main_content() {
        let html = load_fixture("cluttered-page.html");
        let content = extract(&html, &url());

        assert_eq!(content.title, "Ten Minute Morning Stretch Routine");
        assert!(content.body.contains("hamstring"));
        assert!(!content.body.contains("Related posts"));
        assert!(!content.body.contains("Cookie settings"));
    }
}
