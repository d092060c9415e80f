// errors.rs
use crate::config::ConfigError;
use crate::domain::normalize::ParseError;
use crate::scraper::ScraperError;
use thiserror::Error;

/// Errors surfaced by a pipeline run: crawl and consistency failures from
/// the scraper, malformed cards from the normalizer, and storage errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Scraper(#[from] ScraperError),
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),
    #[error("Load error: {0}")]
    Load(String),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Reference data error: {0}")]
    Json(#[from] serde_json::Error),
}
