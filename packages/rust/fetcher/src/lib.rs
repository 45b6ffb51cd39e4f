//! Page fetching for readlater.
//!
//! [`HttpFetcher`] retrieves a single HTML document with hard limits on
//! time, redirect hops and body size. Callers depend on the
//! [`PageFetcher`] trait so tests can swap in canned pages.

pub mod error;
pub mod guard;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use readlater_shared::{FetchConfig, ReadLaterError};
use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE};
use reqwest::redirect::Policy;
use tracing::{debug, instrument, warn};
use url::Url;

pub use error::FetchError;
pub use guard::is_blocked_target;

/// User agent sent with every request.
const USER_AGENT: &str = concat!("readlater/", env!("CARGO_PKG_VERSION"));

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml;q=0.9,*/*;q=0.5";

/// Content types treated as HTML.
const HTML_TYPES: [&str; 2] = ["text/html", "application/xhtml+xml"];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A successfully retrieved HTML document.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects.
    pub url: Url,
    pub status: u16,
    pub content_type: Option<String>,
    /// Body decoded as UTF-8 (lossy).
    pub html: String,
    pub fetched_at: DateTime<Utc>,
}

/// Retrieves the raw HTML behind a URL.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError>;
}

/// Marker error returned from the redirect policy when a hop is refused.
#[derive(Debug, thiserror::Error)]
#[error("redirect to {0} refused")]
struct RedirectRefused(String);

// ---------------------------------------------------------------------------
// HttpFetcher
// ---------------------------------------------------------------------------

/// reqwest-backed fetcher with timeout, redirect and size caps.
pub struct HttpFetcher {
    client: Client,
    max_response_bytes: u64,
    max_redirects: usize,
    allow_private_hosts: bool,
}

impl HttpFetcher {
    /// Build a fetcher from the `[fetch]` config section.
    pub fn new(config: &FetchConfig) -> readlater_shared::Result<Self> {
        let max_redirects = config.max_redirects;
        let allow_private = config.allow_private_hosts;

        // Every hop is re-checked so a public page cannot bounce us onto
        // the local network.
        let policy = Policy::custom(move |attempt| {
            if attempt.previous().len() > max_redirects {
                attempt.error("too many redirects")
            } else if !allow_private && is_blocked_target(attempt.url()) {
                let target = attempt.url().to_string();
                attempt.error(RedirectRefused(target))
            } else {
                attempt.follow()
            }
        });

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(policy)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ReadLaterError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            max_response_bytes: config.max_response_bytes,
            max_redirects,
            allow_private_hosts: allow_private,
        })
    }

    fn map_reqwest_error(&self, url: &Url, err: reqwest::Error) -> FetchError {
        let url = url.to_string();
        if err.is_timeout() {
            FetchError::Timeout { url }
        } else if err.is_redirect() {
            if caused_by_refused_redirect(&err) {
                FetchError::Blocked { url }
            } else {
                FetchError::TooManyRedirects {
                    url,
                    limit: self.max_redirects,
                }
            }
        } else if err.is_connect() {
            FetchError::Connection {
                url,
                message: err.to_string(),
            }
        } else {
            FetchError::Request {
                url,
                message: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    #[instrument(skip_all, fields(url = %url))]
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        if !self.allow_private_hosts && is_blocked_target(url) {
            warn!("refusing blocked target");
            return Err(FetchError::Blocked {
                url: url.to_string(),
            });
        }

        debug!("fetching page");

        let mut response = self
            .client
            .get(url.as_str())
            .header(ACCEPT, ACCEPT_HTML)
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.8")
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_ascii_lowercase());

        if let Some(ct) = &content_type {
            if !HTML_TYPES.iter().any(|t| ct.starts_with(t)) {
                return Err(FetchError::UnsupportedContentType {
                    url: url.to_string(),
                    content_type: ct.clone(),
                });
            }
        }

        let too_large = || FetchError::TooLarge {
            url: url.to_string(),
            limit: self.max_response_bytes,
        };

        if response
            .content_length()
            .is_some_and(|len| len > self.max_response_bytes)
        {
            return Err(too_large());
        }

        // Content-Length can be absent or wrong, so enforce the cap while streaming.
        let final_url = response.url().clone();
        let mut body: Vec<u8> = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| self.map_reqwest_error(url, e))?
        {
            if (body.len() + chunk.len()) as u64 > self.max_response_bytes {
                return Err(too_large());
            }
            body.extend_from_slice(&chunk);
        }

        debug!(bytes = body.len(), final_url = %final_url, "page fetched");

        Ok(FetchedPage {
            url: final_url,
            status: status.as_u16(),
            content_type,
            html: String::from_utf8_lossy(&body).into_owned(),
            fetched_at: Utc::now(),
        })
    }
}

fn caused_by_refused_redirect(err: &reqwest::Error) -> bool {
    let mut source = std::error::Error::source(err);
    while let Some(inner) = source {
        if inner.is::<RedirectRefused>() {
            return true;
        }
        source = inner.source();
    }
    false
}
