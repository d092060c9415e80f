// pipeline.rs
use crate::db::listings::{ensure_listings_table, load};
use crate::db::scrapes::{end_scrape_run, start_scrape_run};
use crate::db::Database;
use crate::domain::normalize::normalize;
use crate::domain::params::SearchCombination;
use crate::errors::AppError;
use crate::scraper::{ListingsScraper, PageFetcher};
use chrono::Utc;
use tracing::{debug, error, info, warn};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub listings_loaded: usize,
}

#[derive(Debug, PartialEq, Eq)]
pub struct CombinationStats {
    pub pages: u32,
    pub listings: usize,
}

/// Crawl, normalize and load one combination. Nothing is written unless all
/// three stages succeed.
pub fn run_combination<F: PageFetcher>(
    db: &Database,
    scraper: &ListingsScraper<F>,
    table: &str,
    combination: &SearchCombination,
) -> Result<CombinationStats, AppError> {
    let outcome = scraper.crawl(combination)?;
    debug!(
        combination = %combination,
        pages = outcome.pages_fetched,
        declared = outcome.declared_total,
        "Crawl matched the declared total"
    );
    let records = normalize(&outcome.listings)?;
    let listings = load(db, table, &records)?;

    Ok(CombinationStats {
        pages: outcome.pages_fetched,
        listings,
    })
}

/// Runs every combination in turn. A failed combination is logged and
/// recorded, then the next one starts.
pub fn run_all<F: PageFetcher>(
    db: &Database,
    scraper: &ListingsScraper<F>,
    table: &str,
    combinations: &[SearchCombination],
) -> Result<RunSummary, AppError> {
    db.with_conn(|conn| ensure_listings_table(conn, table))?;

    let mut summary = RunSummary::default();

    for (idx, combination) in combinations.iter().enumerate() {
        let name = combination.to_string();
        info!(
            combination = %name,
            n = idx + 1,
            of = combinations.len(),
            "Starting combination"
        );

        let run_id = record_start(db, &name);
        let result = run_combination(db, scraper, table, combination);

        let (pages, listings, failure) = match &result {
            Ok(stats) => {
                summary.succeeded += 1;
                summary.listings_loaded += stats.listings;
                info!(combination = %name, pages = stats.pages, listings = stats.listings, "Combination done");
                (Some(stats.pages), Some(stats.listings), None)
            }
            Err(e) => {
                summary.failed += 1;
                error!(combination = %name, error = %e, "Combination failed");
                (None, None, Some(e.to_string()))
            }
        };

        if let Some(run_id) = run_id {
            let ended = db.with_conn(|conn| {
                end_scrape_run(conn, run_id, Utc::now().timestamp(), pages, listings, failure)
            });
            if let Err(e) = ended {
                warn!(combination = %name, error = %e, "Could not record end of scrape run");
            }
        }
    }

    info!(
        succeeded = summary.succeeded,
        failed = summary.failed,
        listings = summary.listings_loaded,
        "Run finished"
    );
    Ok(summary)
}

fn record_start(db: &Database, name: &str) -> Option<i64> {
    match db.with_conn(|conn| start_scrape_run(conn, name, Utc::now().timestamp())) {
        Ok(id) => Some(id),
        Err(e) => {
            warn!(combination = %name, error = %e, "Could not record scrape run");
            None
        }
    }
}
