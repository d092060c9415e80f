// scraper.rs
use crate::config::CrawlConfig;
use crate::domain::params::SearchCombination;
use crate::scraper::{ListingExtractor, PageFetcher, Pagination, RawListing, ScraperError};
use tracing::{debug, info, warn};
use url::Url;

/// Listings of one combination, only produced once the page count and the
/// declared total have been checked.
#[derive(Debug)]
pub struct CrawlOutcome {
    pub listings: Vec<RawListing>,
    pub pages_fetched: u32,
    pub declared_total: usize,
}

/// Per-combination crawl progress.
struct PageFetchState<'a> {
    name: &'a str,
    base_url: Url,
    page: u32,
    listings: Vec<RawListing>,
    has_next: bool,
}

enum CrawlStep {
    Fetching,
    Accumulating(String),
    CheckingNext {
        pagination: Pagination,
        declared_total: Option<usize>,
    },
    Validating(Option<usize>),
    Done(usize),
    Failed(ScraperError),
}

pub struct ListingsScraper<F: PageFetcher> {
    fetcher: F,
    extractor: ListingExtractor,
    cfg: CrawlConfig,
}

impl<F: PageFetcher> ListingsScraper<F> {
    pub fn new(fetcher: F, cfg: CrawlConfig) -> Result<Self, ScraperError> {
        Ok(Self {
            fetcher,
            extractor: ListingExtractor::new()?,
            cfg,
        })
    }

    #[cfg(test)]
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn crawl(&self, combination: &SearchCombination) -> Result<CrawlOutcome, ScraperError> {
        let base_url = combination.search_url(&self.cfg.site_url)?;
        info!(url = %base_url, "Crawling combination");
        self.crawl_url(&combination.to_string().replace('/', "_"), base_url)
    }

    /// Walks the result pages of `base_url` from page 1 until the pagination
    /// control says there is no next page. Any fetch failure ends the crawl
    /// and drops what was accumulated. `name` prefixes the page snapshots.
    pub fn crawl_url(&self, name: &str, base_url: Url) -> Result<CrawlOutcome, ScraperError> {
        let mut state = PageFetchState {
            name,
            base_url,
            page: 1,
            listings: Vec::new(),
            has_next: true,
        };
        let mut step = CrawlStep::Fetching;

        loop {
            step = match step {
                CrawlStep::Fetching => {
                    debug!(page = state.page, "Fetching page");
                    match self.fetcher.fetch(&state.base_url, state.page) {
                        Ok(html) => CrawlStep::Accumulating(html),
                        Err(e) => CrawlStep::Failed(e),
                    }
                }

                CrawlStep::Accumulating(html) => {
                    self.keep_snapshot(state.name, state.page, &html);

                    let results = self.extractor.extract(&html);
                    let found = results.listings.len();
                    state.listings.extend(results.listings);

                    info!(
                        page = state.page,
                        found,
                        total = state.listings.len(),
                        "Page parsed"
                    );
                    CrawlStep::CheckingNext {
                        pagination: results.pagination,
                        declared_total: results.declared_total,
                    }
                }

                CrawlStep::CheckingNext {
                    pagination,
                    declared_total,
                } => {
                    if pagination == Pagination::Missing {
                        warn!(page = state.page, "No pagination control, treating as last page");
                    }
                    state.has_next = pagination.has_next();

                    if state.has_next {
                        self.pause();
                        state.page += 1;
                        CrawlStep::Fetching
                    } else {
                        CrawlStep::Validating(declared_total)
                    }
                }

                CrawlStep::Validating(declared_total) => {
                    let accumulated = state.listings.len();
                    match declared_total {
                        Some(declared) if declared == accumulated => CrawlStep::Done(declared),
                        Some(declared) => CrawlStep::Failed(ScraperError::Consistency {
                            declared,
                            accumulated,
                        }),
                        None => CrawlStep::Failed(ScraperError::MissingTotal),
                    }
                }

                CrawlStep::Done(declared_total) => {
                    info!(
                        pages = state.page,
                        listings = declared_total,
                        "Crawl complete"
                    );
                    return Ok(CrawlOutcome {
                        listings: state.listings,
                        pages_fetched: state.page,
                        declared_total,
                    });
                }

                CrawlStep::Failed(e) => {
                    warn!(
                        page = state.page,
                        stage = if e.is_fetch_error() { "fetch" } else { "validate" },
                        discarded = state.listings.len(),
                        error = %e,
                        "Crawl failed"
                    );
                    return Err(e);
                }
            };
        }
    }

    /// Keeps the raw page in the dump directory, when one is configured. A
    /// failed write is logged and does not stop the crawl.
    fn keep_snapshot(&self, name: &str, page: u32, html: &str) {
        let Some(dir) = &self.cfg.page_dump_dir else {
            return;
        };
        let path = dir.join(snapshot_file_name(name, page));

        match std::fs::create_dir_all(dir).and_then(|_| std::fs::write(&path, html)) {
            Ok(()) => debug!(path = %path.display(), "Page snapshot written"),
            Err(e) => warn!(path = %path.display(), error = %e, "Could not write page snapshot"),
        }
    }

    fn pause(&self) {
        if let Some(delay) = self.cfg.delay.sample() {
            debug!(?delay, "Sleeping before next page");
            std::thread::sleep(delay);
        }
    }
}

fn snapshot_file_name(name: &str, page: u32) -> String {
    format!("{name}_page{page}.html")
}
