// fetcher.rs
use crate::config::CrawlConfig;
use crate::scraper::ScraperError;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use tracing::debug;
use url::Url;

const PAGE_PARAM: &str = "pagina";

/// Retrieves one results page. Any failure, including a non-success status,
/// is returned as an error; retrying is not the fetcher's job.
pub trait PageFetcher {
    fn fetch(&self, base_url: &Url, page: u32) -> Result<String, ScraperError>;
}

/// `base_url` with the page number appended as a query parameter.
pub fn page_url(base_url: &Url, page: u32) -> Url {
    let mut url = base_url.clone();
    url.query_pairs_mut()
        .append_pair(PAGE_PARAM, &page.to_string());
    url
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(cfg: &CrawlConfig) -> Result<Self, ScraperError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("pt-BR,pt;q=0.9"));

        let client = Client::builder()
            .user_agent(cfg.user_agent.as_str())
            .default_headers(headers)
            .timeout(cfg.timeout)
            .build()
            .map_err(|e| ScraperError::Network(e.to_string()))?;

        Ok(Self { client })
    }
}

fn transport_error(url: &Url, e: reqwest::Error) -> ScraperError {
    if e.is_timeout() {
        ScraperError::Timeout {
            url: url.to_string(),
        }
    } else {
        ScraperError::Network(e.to_string())
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, base_url: &Url, page: u32) -> Result<String, ScraperError> {
        let url = page_url(base_url, page);
        let start = std::time::Instant::now();

        let resp = self
            .client
            .get(url.clone())
            .send()
            .map_err(|e| transport_error(&url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ScraperError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = resp.text().map_err(|e| transport_error(&url, e))?;
        debug!(page, bytes = body.len(), elapsed = ?start.elapsed(), "Fetched page");
        Ok(body)
    }
}
