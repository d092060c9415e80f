use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Request to {url} timed out")]
    Timeout { url: String },
    #[error("HTTP {status} fetching {url}")]
    Status { url: String, status: u16 },
    #[error("Invalid search URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("HTML parse error: {0}")]
    HtmlParse(String),
    #[error("Listing count mismatch: page declares {declared}, crawled {accumulated}")]
    Consistency { declared: usize, accumulated: usize },
    #[error("Results total not found on final page")]
    MissingTotal,
}

impl ScraperError {
    /// True for errors raised while fetching a page, as opposed to
    /// checks on what was fetched.
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            ScraperError::Network(_) | ScraperError::Timeout { .. } | ScraperError::Status { .. }
        )
    }
}
