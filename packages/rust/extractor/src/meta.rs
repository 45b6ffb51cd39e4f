//! Title and metadata lookup.

use scraper::{Html, Selector};

/// Maximum title length in characters.
pub const MAX_TITLE_CHARS: usize = 200;

const MAX_DESCRIPTION_CHARS: usize = 500;
const MAX_AUTHOR_CHARS: usize = 120;

/// Site-name separators stripped from the end of titles.
const TITLE_SEPARATORS: [&str; 3] = [" | ", " - ", " :: "];

/// Title candidates after `<title>`, in priority order.
const TITLE_META: [&str; 2] = [
    r#"meta[property="og:title"]"#,
    r#"meta[name="twitter:title"]"#,
];

const DESCRIPTION_META: [&str; 3] = [
    r#"meta[property="og:description"]"#,
    r#"meta[name="description"]"#,
    r#"meta[name="twitter:description"]"#,
];

const AUTHOR_META: [&str; 2] = [r#"meta[name="author"]"#, r#"meta[property="article:author"]"#];

const AUTHOR_ELEMENTS: [&str; 5] = [
    ".author",
    ".author-name",
    ".by-author",
    r#"[rel="author"]"#,
    ".post-author",
];

/// Pick the page title, or `None` when the document offers nothing usable.
pub(crate) fn find_title(doc: &Html) -> Option<String> {
    first_text(doc, &["title"])
        .or_else(|| first_content(doc, &TITLE_META))
        .or_else(|| first_text(doc, &["h1", "h2"]))
        .map(|t| clean_title(&t))
        .filter(|t| !t.is_empty())
}

/// Strip a trailing site name and bound the length.
pub(crate) fn clean_title(raw: &str) -> String {
    let mut title = collapse(raw);
    // Only the last segment is a site name; earlier separators belong to the title.
    let cut = TITLE_SEPARATORS.iter().filter_map(|sep| title.rfind(sep)).max();
    if let Some(idx) = cut {
        let head = title[..idx].trim();
        if !head.is_empty() {
            title = head.to_string();
        }
    }
    truncate(&title, MAX_TITLE_CHARS)
}

pub(crate) fn find_description(doc: &Html) -> Option<String> {
    first_content(doc, &DESCRIPTION_META).map(|d| truncate(&d, MAX_DESCRIPTION_CHARS))
}

pub(crate) fn find_author(doc: &Html) -> Option<String> {
    first_content(doc, &AUTHOR_META)
        .or_else(|| first_text(doc, &AUTHOR_ELEMENTS))
        .map(|a| truncate(&a, MAX_AUTHOR_CHARS))
}

/// Publication date as written by the page; not parsed.
pub(crate) fn find_published(doc: &Html) -> Option<String> {
    if let Some(date) = first_content(doc, &[r#"meta[property="article:published_time"]"#]) {
        return Some(date);
    }

    let time = Selector::parse("time").ok()?;
    let el = doc.select(&time).next()?;
    el.value()
        .attr("datetime")
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .or_else(|| non_empty(collapse(&el.text().collect::<String>())))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// First non-empty `content` attribute among the selectors.
fn first_content(doc: &Html, selectors: &[&str]) -> Option<String> {
    selectors.iter().find_map(|s| {
        let sel = Selector::parse(s).ok()?;
        doc.select(&sel)
            .filter_map(|el| el.value().attr("content"))
            .find_map(|c| non_empty(collapse(c)))
    })
}

/// First non-empty element text among the selectors.
fn first_text(doc: &Html, selectors: &[&str]) -> Option<String> {
    selectors.iter().find_map(|s| {
        let sel = Selector::parse(s).ok()?;
        doc.select(&sel)
            .find_map(|el| non_empty(collapse(&el.text().collect::<String>())))
    })
}

fn collapse(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect::<String>().trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(html: &str) -> Html {
        Html::parse_document(html)
    }

    #[test]
    fn title_tag_wins() {
        let d = doc(r#"<html><head><title>From Title</title>
            <meta property="og:title" content="From OG"></head>
            <body><h1>From H1</h1></body></html>"#);
        assert_eq!(find_title(&d).as_deref(), Some("From Title"));
    }

    #[test]
    fn og_title_then_heading() {
        let d = doc(r#"<head><meta property="og:title" content="OG Title"></head><body><h1>H1</h1></body>"#);
        assert_eq!(find_title(&d).as_deref(), Some("OG Title"));

        let d = doc("<body><h2>Only a subheading</h2></body>");
        assert_eq!(find_title(&d).as_deref(), Some("Only a subheading"));

        let d = doc("<body><p>no headings</p></body>");
        assert_eq!(find_title(&d), None);
    }

    #[test]
    fn site_suffixes_trimmed() {
        assert_eq!(clean_title("Rust 2024 Released | The Blog"), "Rust 2024 Released");
        assert_eq!(clean_title("Async Traits - Dev Weekly"), "Async Traits");
        assert_eq!(clean_title("Page :: Site"), "Page");
        assert_eq!(clean_title("  spaced \n  title "), "spaced title");
        assert_eq!(clean_title("Rust - the good parts | Blog"), "Rust - the good parts");
        assert_eq!(clean_title("Tokio | Part 2 - Rust Weekly"), "Tokio | Part 2");
        // A leading separator leaves the text alone.
        assert_eq!(clean_title(" | Site"), "| Site");
    }

    #[test]
    fn long_titles_truncated() {
        let long = "x".repeat(500);
        assert_eq!(clean_title(&long).chars().count(), MAX_TITLE_CHARS);
    }

    #[test]
    fn description_priority() {
        let d = doc(r#"<head>
            <meta name="description" content="plain">
            <meta property="og:description" content="open graph">
            </head>"#);
        assert_eq!(find_description(&d).as_deref(), Some("open graph"));
    }

    #[test]
    fn author_from_meta_or_byline() {
        let d = doc(r#"<head><meta name="author" content="Ada Lovelace"></head>"#);
        assert_eq!(find_author(&d).as_deref(), Some("Ada Lovelace"));

        let d = doc(r#"<body><span class="byline"><a rel="author" href="/u/g">Grace Hopper</a></span></body>"#);
        assert_eq!(find_author(&d).as_deref(), Some("Grace Hopper"));
    }

    #[test]
    fn published_from_meta_or_time() {
        let d = doc(r#"<head><meta property="article:published_time" content="2024-03-01T10:00:00Z"></head>"#);
        assert_eq!(find_published(&d).as_deref(), Some("2024-03-01T10:00:00Z"));

        let d = doc(r#"<body><time datetime="2023-11-05">Nov 5</time></body>"#);
        assert_eq!(find_published(&d).as_deref(), Some("2023-11-05"));

        let d = doc("<body><time>yesterday</time></body>");
        assert_eq!(find_published(&d).as_deref(), Some("yesterday"));
    }
}
