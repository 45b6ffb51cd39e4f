//! Reply rendering: a short human summary plus a structured payload.
//!
//! Nothing here ever shows internal error text. Failures are reported by
//! category only.

use chrono::{DateTime, Utc};
use readlater_shared::{
    Article, ArticleId, ArticleStatus, Category, ErrorCategory, ReadLaterError, ReadingStats,
};
use readlater_storage::{ArticleFilter, CategoryCount, sort_category_counts};
use serde::Serialize;

use crate::save::{Degradation, SaveReport};

// ---------------------------------------------------------------------------
// Reply types
// ---------------------------------------------------------------------------

/// What the router hands back to the shell.
#[derive(Debug, Clone, Serialize)]
pub struct Reply {
    /// Plain-text message suitable for a chat bubble.
    pub summary: String,
    pub structured: ReplyBody,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ReplyBody {
    Article(ArticleView),
    Articles(ArticleListView),
    Stats(StatsView),
    Categories(CategoryListView),
    Help(HelpView),
    Error(ErrorView),
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticleView {
    pub id: ArticleId,
    pub url: String,
    pub domain: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub category: Category,
    pub keywords: Vec<String>,
    pub read_time_minutes: u32,
    pub status: ArticleStatus,
    pub saved_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_at: Option<DateTime<Utc>>,
    /// Present on save replies only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save: Option<SaveInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SaveInfo {
    pub created: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded: Option<Degradation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticleListView {
    /// What was listed, e.g. `"unread"` or `"search: tokio"`.
    pub scope: String,
    pub count: usize,
    /// More articles matched than were shown.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub truncated: bool,
    pub articles: Vec<ArticleView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsView {
    pub total_articles: usize,
    pub unread: usize,
    pub read: usize,
    pub total_reading_minutes: u64,
    pub read_reading_minutes: u64,
    pub average_reading_minutes: f64,
    pub read_percentage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_category: Option<Category>,
    /// Largest first.
    pub by_category: Vec<CategoryCount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryListView {
    /// Categories in use, largest first.
    pub categories: Vec<CategoryCount>,
    /// Every label the classifier can assign.
    pub taxonomy: Vec<Category>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HelpView {
    /// The unrecognized input, when help is a fallback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unrecognized: Option<String>,
    pub commands: Vec<CommandHelp>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommandHelp {
    pub usage: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorView {
    pub category: ErrorCategory,
    pub message: String,
}

const COMMANDS: &[CommandHelp] = &[
    CommandHelp { usage: "<url>", description: "Save a link (several links in one message work too)" },
    CommandHelp { usage: "list [unread|read|<category>]", description: "Show saved articles" },
    CommandHelp { usage: "queue", description: "Show unread articles" },
    CommandHelp { usage: "history", description: "Show articles you've read" },
    CommandHelp { usage: "search <terms>", description: "Find articles by title, keyword or text" },
    CommandHelp { usage: "done <url|id>", description: "Mark an article as read" },
    CommandHelp { usage: "delete <url|id>", description: "Remove an article" },
    CommandHelp { usage: "stats", description: "Reading statistics" },
    CommandHelp { usage: "categories", description: "Article counts per category" },
    CommandHelp { usage: "help", description: "Show this message" },
];

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Turns store results into [`Reply`] values.
pub struct Responder;

impl Responder {
    /// Reply for a single saved URL.
    pub fn saved(report: SaveReport) -> Reply {
        let summary = save_line(&report);
        let mut view = ArticleView::from(report.outcome.article);
        view.save = Some(SaveInfo {
            created: report.outcome.created,
            degraded: report.degraded,
        });
        Reply {
            summary,
            structured: ReplyBody::Article(view),
        }
    }

    /// Reply for several URLs saved from one message.
    pub fn saved_many(reports: Vec<SaveReport>) -> Reply {
        let mut lines = vec![format!("Saved {} articles:", reports.len())];
        lines.extend(reports.iter().map(|r| format!("- {}", save_line(r))));

        let articles: Vec<ArticleView> = reports
            .into_iter()
            .map(|r| {
                let mut view = ArticleView::from(r.outcome.article);
                view.save = Some(SaveInfo {
                    created: r.outcome.created,
                    degraded: r.degraded,
                });
                view
            })
            .collect();

        Reply {
            summary: lines.join("\n"),
            structured: ReplyBody::Articles(ArticleListView {
                scope: "saved".into(),
                count: articles.len(),
                truncated: false,
                articles,
            }),
        }
    }

    /// Render up to `limit` articles. Pass one more than `limit` to let the
    /// reply say the list was cut.
    pub fn list(filter: ArticleFilter, mut articles: Vec<Article>, limit: usize) -> Reply {
        let truncated = cut(&mut articles, limit);
        let scope = match filter {
            ArticleFilter::All => "all".to_string(),
            ArticleFilter::Status(status) => status.as_str().to_string(),
            ArticleFilter::Category(category) => category.as_str().to_string(),
        };

        let summary = if articles.is_empty() {
            match filter {
                ArticleFilter::All => "Your reading list is empty. Send me a link to save it.".to_string(),
                ArticleFilter::Status(ArticleStatus::Unread) => "Nothing unread. You're all caught up.".to_string(),
                ArticleFilter::Status(ArticleStatus::Read) => "You haven't marked anything as read yet.".to_string(),
                ArticleFilter::Category(category) => format!("No {category} articles saved."),
            }
        } else {
            let mut summary =
                numbered(&format!("{} ({scope}):", plural(articles.len(), "article")), &articles);
            if truncated {
                summary.push_str(&format!(
                    "\nShowing the latest {limit}. Narrow it down with a category or a search."
                ));
            }
            summary
        };

        Self::article_list(scope, summary, articles, truncated)
    }

    /// Render up to `limit` matches, same convention as [`Responder::list`].
    pub fn search(terms: &str, mut articles: Vec<Article>, limit: usize) -> Reply {
        let truncated = cut(&mut articles, limit);
        let summary = if articles.is_empty() {
            format!("No saved articles match \"{terms}\".")
        } else {
            let mut summary = numbered(
                &format!("{} matching \"{terms}\":", plural(articles.len(), "article")),
                &articles,
            );
            if truncated {
                summary.push_str(&format!(
                    "\nShowing the top {limit} matches. Add more words to narrow it down."
                ));
            }
            summary
        };
        Self::article_list(format!("search: {terms}"), summary, articles, truncated)
    }

    pub fn stats(stats: ReadingStats) -> Reply {
        let summary = if stats.total_articles == 0 {
            "No articles saved yet.".to_string()
        } else {
            let mut s = format!(
                "{} saved: {} unread, {} read ({}% read). {} min of reading in total, {} min on average.",
                plural(stats.total_articles, "article"),
                stats.unread,
                stats.read,
                stats.read_percentage,
                stats.total_reading_minutes,
                stats.average_reading_minutes,
            );
            if let Some(top) = stats.top_category {
                s.push_str(&format!(" Top category: {top}."));
            }
            s
        };

        let mut by_category: Vec<CategoryCount> = stats
            .by_category
            .iter()
            .map(|(category, count)| CategoryCount {
                category: *category,
                count: *count,
            })
            .collect();
        sort_category_counts(&mut by_category);

        Reply {
            summary,
            structured: ReplyBody::Stats(StatsView {
                total_articles: stats.total_articles,
                unread: stats.unread,
                read: stats.read,
                total_reading_minutes: stats.total_reading_minutes,
                read_reading_minutes: stats.read_reading_minutes,
                average_reading_minutes: stats.average_reading_minutes,
                read_percentage: stats.read_percentage,
                top_category: stats.top_category,
                by_category,
            }),
        }
    }

    pub fn categories(counts: Vec<CategoryCount>) -> Reply {
        let summary = if counts.is_empty() {
            "No categories yet. Save a few links first.".to_string()
        } else {
            let parts: Vec<String> = counts
                .iter()
                .map(|c| format!("{} ({})", c.category, c.count))
                .collect();
            format!("Categories: {}", parts.join(", "))
        };

        Reply {
            summary,
            structured: ReplyBody::Categories(CategoryListView {
                categories: counts,
                taxonomy: Category::ALL.to_vec(),
            }),
        }
    }

    pub fn marked_read(article: Article) -> Reply {
        Reply {
            summary: format!("Marked \"{}\" as read.", article.title),
            structured: ReplyBody::Article(article.into()),
        }
    }

    pub fn deleted(url: &str) -> Reply {
        Reply {
            summary: format!("Removed {url} from your list."),
            structured: ReplyBody::Articles(ArticleListView {
                scope: "deleted".into(),
                count: 0,
                truncated: false,
                articles: Vec::new(),
            }),
        }
    }

    /// The referenced article does not exist.
    pub fn not_found(reference: &str) -> Reply {
        Reply {
            summary: format!("I couldn't find {reference} in your list."),
            structured: ReplyBody::Error(ErrorView {
                category: ErrorCategory::MalformedInput,
                message: "article not found".into(),
            }),
        }
    }

    pub fn help() -> Reply {
        Self::help_reply(None)
    }

    /// Fallback for input that matched no command.
    pub fn unknown(text: &str) -> Reply {
        Self::help_reply(Some(text.to_string()))
    }

    /// Render a failure without exposing its internals.
    pub fn error(err: &ReadLaterError) -> Reply {
        let category = err.category();
        let message = match category {
            ErrorCategory::MalformedInput => "That request couldn't be processed. Type \"help\" for commands.",
            ErrorCategory::InternalFailure => "Something went wrong on my side. Please try again in a moment.",
        };
        Reply {
            summary: message.to_string(),
            structured: ReplyBody::Error(ErrorView {
                category,
                message: message.to_string(),
            }),
        }
    }

    fn help_reply(unrecognized: Option<String>) -> Reply {
        let mut lines = Vec::new();
        if unrecognized.is_some() {
            lines.push("I didn't understand that. Here's what I can do:".to_string());
        } else {
            lines.push("Send me a link and I'll save it to your reading list. Commands:".to_string());
        }
        lines.extend(COMMANDS.iter().map(|c| format!("  {:<32} {}", c.usage, c.description)));

        Reply {
            summary: lines.join("\n"),
            structured: ReplyBody::Help(HelpView {
                unrecognized,
                commands: COMMANDS.to_vec(),
            }),
        }
    }

    fn article_list(
        scope: String,
        summary: String,
        articles: Vec<Article>,
        truncated: bool,
    ) -> Reply {
        let articles: Vec<ArticleView> = articles.into_iter().map(ArticleView::from).collect();
        Reply {
            summary,
            structured: ReplyBody::Articles(ArticleListView {
                scope,
                count: articles.len(),
                truncated,
                articles,
            }),
        }
    }
}

impl From<Article> for ArticleView {
    fn from(a: Article) -> Self {
        Self {
            id: a.id,
            url: a.url,
            domain: a.domain,
            title: a.title,
            description: a.description,
            author: a.author,
            category: a.category,
            keywords: a.keywords,
            read_time_minutes: a.read_time_minutes,
            status: a.status,
            saved_at: a.saved_at,
            read_at: a.read_at,
            save: None,
        }
    }
}

fn save_line(report: &SaveReport) -> String {
    let a = &report.outcome.article;
    let verb = if report.outcome.created { "Saved" } else { "Updated" };
    let mut line = format!(
        "{verb} \"{}\" ({}, {} min read).",
        a.title, a.category, a.read_time_minutes
    );
    if let Some(d) = report.degraded {
        line.push_str(&format!(" Note: {}, so only basic details were kept.", degradation_text(d)));
    }
    line
}

fn degradation_text(d: Degradation) -> &'static str {
    match d {
        Degradation::Fetch { reason } => match reason {
            "timeout" => "the page took too long to respond",
            "http_status" => "the site returned an error",
            "too_large" => "the page is too large",
            "too_many_redirects" => "the page redirects too many times",
            "unsupported_content_type" => "the link isn't a web page",
            "blocked" => "that address can't be fetched",
            _ => "the site couldn't be reached",
        },
        Degradation::NoContent => "no readable text was found",
        Degradation::Classification => "it couldn't be categorized",
    }
}

/// Keep the first `limit` articles; true if any were dropped.
fn cut(articles: &mut Vec<Article>, limit: usize) -> bool {
    let truncated = articles.len() > limit;
    articles.truncate(limit);
    truncated
}

fn numbered(heading: &str, articles: &[Article]) -> String {
    let mut lines = vec![heading.to_string()];
    for (i, a) in articles.iter().enumerate() {
        lines.push(format!(
            "{}. {} ({}, {} min) [{}] {}",
            i + 1,
            a.title,
            a.category,
            a.read_time_minutes,
            a.status,
            a.url
        ));
    }
    lines.join("\n")
}

fn plural(n: usize, noun: &str) -> String {
    if n == 1 { format!("1 {noun}") } else { format!("{n} {noun}s") }
}
