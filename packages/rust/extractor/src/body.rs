//! Main-content text extraction.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

/// Subtrees that never contribute article text.
const SKIPPED_TAGS: [&str; 11] = [
    "script", "style", "noscript", "nav", "header", "footer", "aside", "iframe", "form", "svg",
    "template",
];

/// Elements that start a new line of text.
const BLOCK_TAGS: [&str; 24] = [
    "address", "article", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption", "h1", "h2",
    "h3", "h4", "h5", "h6", "hr", "li", "main", "ol", "p", "pre", "section", "tr", "ul",
];

/// Candidate content containers, most specific first.
const CONTAINER_SELECTORS: [&str; 7] = [
    "article",
    r#"[role="main"]"#,
    "main",
    ".post-content",
    ".entry-content",
    ".article-content",
    "#content",
];

/// A container must carry at least this much text to beat `<body>`.
pub(crate) const MIN_CONTAINER_CHARS: usize = 200;

/// Upper bound on the extracted body.
pub const MAX_BODY_CHARS: usize = 50_000;

static CONTAINERS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    CONTAINER_SELECTORS
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .collect()
});

static BODY: LazyLock<Option<Selector>> = LazyLock::new(|| Selector::parse("body").ok());

/// Extract the readable body text of `doc`.
///
/// Tries each content container in turn and falls back to `<body>`.
pub(crate) fn extract_body(doc: &Html) -> String {
    for selector in CONTAINERS.iter() {
        if let Some(el) = doc.select(selector).next() {
            let text = visible_text(el);
            if text.chars().count() >= MIN_CONTAINER_CHARS {
                return cap_chars(text, MAX_BODY_CHARS);
            }
        }
    }

    let root = BODY
        .as_ref()
        .and_then(|sel| doc.select(sel).next())
        .unwrap_or_else(|| doc.root_element());

    // Text the parser salvaged from broken markup is not page content.
    if !has_child_elements(root) {
        return String::new();
    }

    cap_chars(visible_text(root), MAX_BODY_CHARS)
}

fn has_child_elements(root: ElementRef<'_>) -> bool {
    root.descendants().skip(1).any(|node| node.value().is_element())
}

enum Step<'a> {
    Enter(ElementRef<'a>),
    Text(&'a str),
    Break,
}

/// Concatenate the text under `root` in document order, one line per block.
///
/// Walks with an explicit stack so deeply nested markup cannot exhaust
/// the call stack.
pub(crate) fn visible_text(root: ElementRef<'_>) -> String {
    let mut raw = String::new();
    let mut stack = vec![Step::Enter(root)];

    while let Some(step) = stack.pop() {
        match step {
            Step::Text(text) => raw.push_str(text),
            Step::Break => raw.push('\n'),
            Step::Enter(el) => {
                let element = el.value();
                let name = element.name();
                if SKIPPED_TAGS.contains(&name) || is_hidden(el) {
                    continue;
                }

                if BLOCK_TAGS.contains(&name) {
                    raw.push('\n');
                    stack.push(Step::Break);
                }

                for child in el.children().rev() {
                    if let Some(text) = child.value().as_text() {
                        stack.push(Step::Text(&**text));
                    } else if let Some(child_el) = ElementRef::wrap(child) {
                        stack.push(Step::Enter(child_el));
                    }
                }
            }
        }
    }

    collapse_lines(&raw)
}

fn is_hidden(el: ElementRef<'_>) -> bool {
    let element = el.value();
    element.attr("hidden").is_some() || element.attr("aria-hidden") == Some("true")
}

/// Collapse runs of whitespace inside each line and drop empty lines.
pub(crate) fn collapse_lines(raw: &str) -> String {
    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Truncate to at most `max` characters without splitting a code point.
pub(crate) fn cap_chars(text: String, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].trim_end().to_string(),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_of(html: &str) -> String {
        extract_body(&Html::parse_document(html))
    }

    #[test]
    fn strips_chrome_and_scripts() {
        let html = r#"<html><body>
            <nav>Home About</nav>
            <header>Site header</header>
            <p>Real   text here.</p>
            <script>var x = 1;</script>
            <style>p { color: red }</style>
            <footer>Copyright</footer>
        </body></html>"#;

        let body = body_of(html);
        assert_eq!(body, "Real text here.");
    }

    #[test]
    fn blocks_become_lines() {
        let html = "<body><h2>Heading</h2><p>First <em>para</em>.</p><ul><li>one</li><li>two</li></ul></body>";
        assert_eq!(body_of(html), "Heading\nFirst para.\none\ntwo");
    }

    #[test]
    fn prefers_container_with_enough_text() {
        let long = "word ".repeat(60);
        let html = format!(
            "<body><div class=\"sidebar\">Sidebar links</div><article><p>{long}</p></article></body>"
        );
        let body = body_of(&html);
        assert!(!body.contains("Sidebar"));
        assert!(body.starts_with("word word"));
    }

    #[test]
    fn short_container_falls_back_to_body() {
        let html = "<body><p>Intro outside.</p><article>Tiny.</article></body>";
        let body = body_of(html);
        assert!(body.contains("Intro outside."));
        assert!(body.contains("Tiny."));
    }

    #[test]
    fn hidden_elements_skipped() {
        let html = r#"<body><p>Shown</p><div hidden>Secret</div><span aria-hidden="true">Icon</span></body>"#;
        assert_eq!(body_of(html), "Shown");
    }

    #[test]
    fn body_is_capped() {
        let html = format!("<body><p>{}</p></body>", "abcd ".repeat(20_000));
        let body = body_of(&html);
        assert!(body.chars().count() <= MAX_BODY_CHARS);
    }

    #[test]
    fn deep_nesting_does_not_overflow() {
        let depth = 3_000;
        let html = format!("{}deep{}", "<div>".repeat(depth), "</div>".repeat(depth));
        let body = body_of(&html);
        assert!(body.contains("deep"));
    }

    #[test]
    fn stray_text_without_markup_is_dropped() {
        assert_eq!(body_of("<<<>>> \u{0} </div></div> <p"), "");
        assert_eq!(body_of("just some words"), "");
        assert_eq!(body_of("words <b>bold</b>"), "words bold");
    }

    #[test]
    fn cap_chars_respects_code_points() {
        let s = "héllo wörld".to_string();
        assert_eq!(cap_chars(s, 4), "héll");
    }
}
