use crate::config::Config;
use crate::db::{init_db, Database};
use crate::domain::params::{combinations, load_locations};
use crate::errors::AppError;
use crate::scraper::{HttpFetcher, ListingsScraper};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod db;
mod domain;
mod errors;
mod pipeline;
mod scraper;

#[cfg(test)]
mod tests;

fn main() {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "listings_scraper=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run() {
        error!(error = %e, "Run aborted");
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let cfg = Config::from_env()?;

    let locations = load_locations(&cfg.locations_file)?;
    let combos = combinations(
        &cfg.transactions,
        &cfg.property_types,
        &locations,
        &cfg.crawl.default_transaction,
    );
    info!(combinations = combos.len(), "Search space built");

    // The store stays open for the whole run and closes when `db` drops.
    let db = Database::open(&cfg.store)?;
    init_db(&db)?;

    let fetcher = HttpFetcher::new(&cfg.crawl)?;
    let scraper = ListingsScraper::new(fetcher, cfg.crawl.clone())?;

    let summary = pipeline::run_all(&db, &scraper, &cfg.table, &combos)?;
    if summary.failed > 0 {
        info!(failed = summary.failed, "Some combinations failed; see log above");
    }
    Ok(())
}
