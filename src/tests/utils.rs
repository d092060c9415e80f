use crate::config::{CrawlConfig, DelayRange};
use crate::db::connection::{init_db, Database};
use crate::errors::AppError;
use crate::domain::params::Location;
use crate::scraper::{PageFetcher, ScraperError};
use std::cell::RefCell;
use std::time::{SystemTime, UNIX_EPOCH};
use url::Url;

/// Fresh on-disk database with the production schema applied.
pub fn make_db(prefix: &str) -> Database {
    let path = std::env::temp_dir().join(format!(
        "{prefix}_{}.sqlite",
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    let db = Database::open_path(path).expect("Failed to open DB");
    init_db(&db).expect("Failed to initialize DB");
    db
}

#[derive(Debug)]
pub struct ScrapeRun {
    pub combination: String,
    pub finished_at: Option<i64>,
    pub pages_fetched: Option<i64>,
    pub listings_seen: Option<i64>,
    pub success: bool,
    pub error_message: Option<String>,
}

/// Bookkeeping rows, newest first.
pub fn recent_runs(db: &Database) -> Vec<ScrapeRun> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT combination, finished_at, pages_fetched, listings_seen, success, error_message FROM scrape_runs ORDER BY id DESC",
        )?;
        let runs = stmt
            .query_map([], |row| {
                Ok(ScrapeRun {
                    combination: row.get(0)?,
                    finished_at: row.get(1)?,
                    pages_fetched: row.get(2)?,
                    listings_seen: row.get(3)?,
                    success: row.get(4)?,
                    error_message: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok::<_, AppError>(runs)
    })
    .unwrap()
}

pub fn crawl_config() -> CrawlConfig {
    CrawlConfig {
        site_url: "https://www.zapimoveis.com.br".to_string(),
        delay: DelayRange {
            min_secs: 0.0,
            max_secs: 0.0,
        },
        ..CrawlConfig::default()
    }
}

pub fn location(state: &str, code: &str, city: &str) -> Location {
    Location {
        state: state.to_string(),
        state_code: code.to_string(),
        city: city.to_string(),
        latitude: -3.73272,
        longitude: -38.527013,
    }
}

pub fn card(id: u32) -> String {
    format!(
        r#"<li data-cy="rp-property-cd">
  <a href="https://www.zapimoveis.com.br/imovel/aluguel-apartamento-2-quartos-meireles-fortaleza-ce-70m2-id-{id}/">
    <h2 data-cy="rp-cardProperty-location-txt">Apartamento para alugar em Meireles, Fortaleza</h2>
    <p data-cy="rp-cardProperty-street-txt">Rua Silva Paulet, 1200</p>
    <ul>
      <li data-cy="rp-cardProperty-propertyArea-txt">Tamanho do imóvel 70 m²</li>
      <li data-cy="rp-cardProperty-bedroomQuantity-txt">Quantidade de quartos 2</li>
      <li data-cy="rp-cardProperty-bathroomQuantity-txt">Quantidade de banheiros 1</li>
      <li data-cy="rp-cardProperty-parkingSpacesQuantity-txt">Quantidade de vagas de garagem 1</li>
    </ul>
    <div data-cy="rp-cardProperty-price-txt">R$ 1.500/mês • Cond. R$ 300 • IPTU R$ 50</div>
  </a>
</li>"#
    )
}

/// A card that shares the listing marker but carries no link.
pub fn filler_card() -> String {
    r#"<li data-cy="rp-property-cd"><div class="banner">Anuncie seu imóvel</div></li>"#.to_string()
}

#[derive(Clone, Copy)]
pub enum NextButton {
    Enabled,
    Disabled,
    Absent,
}

pub fn page(cards: &[String], declared_total: usize, next: NextButton) -> String {
    let button = match next {
        NextButton::Enabled => r#"<button data-testid="next-page">Próxima página</button>"#,
        NextButton::Disabled => r#"<button data-testid="next-page" disabled>Próxima página</button>"#,
        NextButton::Absent => "",
    };
    format!(
        r#"<!DOCTYPE html>
<html><body>
  <h1 data-cy="rp-title-txt">{declared_total} Apartamentos para alugar em Fortaleza, CE</h1>
  <ul class="results">{}</ul>
  <nav>{button}</nav>
</body></html>"#,
        cards.join("\n")
    )
}

/// Canned pages served in order; `Err(status)` simulates an HTTP failure.
/// A route applies when its needle occurs in the base URL.
pub struct FakeFetcher {
    routes: Vec<(String, Vec<Result<String, u16>>)>,
    pub calls: RefCell<Vec<(String, u32)>>,
}

impl FakeFetcher {
    pub fn new(pages: Vec<Result<String, u16>>) -> Self {
        Self::routed(vec![(String::new(), pages)])
    }

    pub fn routed(routes: Vec<(String, Vec<Result<String, u16>>)>) -> Self {
        Self {
            routes,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn pages_requested(&self) -> Vec<u32> {
        self.calls.borrow().iter().map(|(_, page)| *page).collect()
    }
}

impl PageFetcher for FakeFetcher {
    fn fetch(&self, base_url: &Url, page: u32) -> Result<String, ScraperError> {
        self.calls
            .borrow_mut()
            .push((base_url.to_string(), page));

        let status_error = |status| ScraperError::Status {
            url: base_url.to_string(),
            status,
        };

        let pages = self
            .routes
            .iter()
            .find(|(needle, _)| base_url.as_str().contains(needle.as_str()))
            .map(|(_, pages)| pages)
            .ok_or_else(|| status_error(404))?;

        match pages.get(page as usize - 1) {
            Some(Ok(html)) => Ok(html.clone()),
            Some(Err(status)) => Err(status_error(*status)),
            None => Err(status_error(404)),
        }
    }
}
