pub mod extractor;
pub mod fetcher;
pub mod models;
mod scraper;
mod scraper_error;

pub use extractor::{ListingExtractor, Pagination};
pub use fetcher::{HttpFetcher, PageFetcher};
pub use models::{ListingField, RawListing};
pub use self::scraper::ListingsScraper;
pub use scraper_error::ScraperError;
