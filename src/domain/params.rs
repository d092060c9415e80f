// src/domain/params.rs

use crate::errors::AppError;
use crate::scraper::ScraperError;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use unicode_normalization::UnicodeNormalization;
use url::Url;

/// One row of the locations reference table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Location {
    pub state: String,
    pub state_code: String,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    /// Path segment identifying the city, e.g. "sp+sao-paulo".
    pub fn slug(&self) -> String {
        let city = fold_accents(&self.city.to_lowercase())
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-");
        format!("{}+{}", self.state_code.trim().to_lowercase(), city)
    }

    /// Already-encoded value of the `onde` query parameter. The site wants the
    /// names twice: percent-encoded, then again with accents removed.
    pub fn query(&self) -> String {
        format!(
            "%2C{state_enc}%2C{city_enc}%2C%2C%2C%2C%2Ccity%2CBR%3E{state_plain}%3ENULL%3E{city_plain}%2C{lat}%2C{lon}%2C",
            state_enc = urlencoding::encode(&self.state),
            city_enc = urlencoding::encode(&self.city),
            state_plain = fold_accents(&self.state),
            city_plain = fold_accents(&self.city),
            lat = self.latitude,
            lon = self.longitude,
        )
    }
}

/// Reads location rows from a JSON array file.
pub fn load_locations(path: &Path) -> Result<Vec<Location>, AppError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// One (transaction, property type, location) search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCombination {
    pub transaction: String,
    pub property_type: String,
    pub location_slug: String,
    pub location_query: String,
}

impl SearchCombination {
    pub fn new(transaction: &str, property_type: &str, location: &Location) -> Self {
        Self {
            transaction: transaction.to_string(),
            property_type: property_type.to_string(),
            location_slug: location.slug(),
            location_query: location.query(),
        }
    }

    /// First-page search URL on `site`; the crawler adds the page number.
    pub fn search_url(&self, site: &str) -> Result<Url, ScraperError> {
        let raw = format!(
            "{site}/{transaction}/imoveis/{slug}/?onde={query}&tipos={ptype}&transacao={transaction}",
            site = site.trim_end_matches('/'),
            transaction = self.transaction,
            slug = self.location_slug,
            query = self.location_query,
            ptype = self.property_type,
        );

        Url::parse(&raw).map_err(|e| ScraperError::InvalidUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })
    }
}

impl fmt::Display for SearchCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.transaction, self.property_type, self.location_slug
        )
    }
}

/// Every combination of the given tokens and locations. With no transaction
/// tokens, `default_transaction` is used alone.
pub fn combinations(
    transactions: &[String],
    property_types: &[String],
    locations: &[Location],
    default_transaction: &str,
) -> Vec<SearchCombination> {
    let fallback = [default_transaction.to_string()];
    let transactions = if transactions.is_empty() {
        &fallback[..]
    } else {
        transactions
    };

    let mut out = Vec::with_capacity(transactions.len() * property_types.len() * locations.len());
    for transaction in transactions {
        for property_type in property_types {
            for location in locations {
                out.push(SearchCombination::new(transaction, property_type, location));
            }
        }
    }
    out
}

/// Compatibility-decomposes `s` and keeps only the ASCII part, so accents
/// fall away from their base letters.
fn fold_accents(s: &str) -> String {
    s.nfkd().filter(char::is_ascii).collect()
}
