//! Typed fetch failures.
//!
//! Every variant is recoverable: the save path degrades instead of failing.

/// Why a page could not be retrieved.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The request (connect, headers or body) exceeded the configured timeout.
    #[error("{url}: timed out")]
    Timeout { url: String },

    /// DNS resolution or TCP/TLS connection failed.
    #[error("{url}: connection failed: {message}")]
    Connection { url: String, message: String },

    /// The server answered with a non-success status.
    #[error("{url}: HTTP {status}")]
    Status { url: String, status: u16 },

    /// The body is larger than the configured cap.
    #[error("{url}: response too large (max {limit} bytes)")]
    TooLarge { url: String, limit: u64 },

    /// The redirect chain exceeded the hop cap.
    #[error("{url}: too many redirects (max {limit})")]
    TooManyRedirects { url: String, limit: usize },

    /// The response is not an HTML document.
    #[error("{url}: unsupported content type {content_type}")]
    UnsupportedContentType { url: String, content_type: String },

    /// The target (or a redirect hop) is a non-HTTP or private address.
    #[error("{url}: target not allowed")]
    Blocked { url: String },

    /// Anything else reqwest reports.
    #[error("{url}: request failed: {message}")]
    Request { url: String, message: String },
}

impl FetchError {
    /// Short machine-friendly reason, used in logs and reply payloads.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::Connection { .. } => "connection",
            Self::Status { .. } => "http_status",
            Self::TooLarge { .. } => "too_large",
            Self::TooManyRedirects { .. } => "too_many_redirects",
            Self::UnsupportedContentType { .. } => "unsupported_content_type",
            Self::Blocked { .. } => "blocked",
            Self::Request { .. } => "request",
        }
    }
}
