// config.rs
use rand::Rng;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_SITE_URL: &str = "https://www.zapimoveis.com.br";
const DEFAULT_TRANSACTION: &str = "aluguel";
const DEFAULT_PROPERTY_TYPE: &str = "apartamento_residencial";
const DEFAULT_LOCATIONS_FILE: &str = "reference/locations.json";
const DEFAULT_TABLE: &str = "listings";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_DELAY_SECS: f64 = 600.0;
const MAX_TIMEOUT_SECS: u64 = 600;
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0 Safari/537.36";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),
    #[error("{name} has invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Connection parameters for the listings store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub host: String,
    pub user: String,
    pub password: String,
    pub database: String,
}

/// Uniform pause between page fetches, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayRange {
    pub min_secs: f64,
    pub max_secs: f64,
}

impl DelayRange {
    pub fn sample(&self) -> Option<Duration> {
        if self.max_secs <= 0.0 {
            return None;
        }
        let secs = rand::thread_rng().gen_range(self.min_secs..=self.max_secs);
        Some(Duration::from_secs_f64(secs))
    }
}

impl Default for DelayRange {
    fn default() -> Self {
        Self {
            min_secs: 1.0,
            max_secs: 5.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub site_url: String,
    /// Transaction token used when no transaction list is configured.
    pub default_transaction: String,
    pub delay: DelayRange,
    pub timeout: Duration,
    pub user_agent: String,
    /// Where each fetched results page is kept as raw HTML, if anywhere.
    pub page_dump_dir: Option<PathBuf>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            site_url: DEFAULT_SITE_URL.to_string(),
            default_transaction: DEFAULT_TRANSACTION.to_string(),
            delay: DelayRange::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: USER_AGENT.to_string(),
            page_dump_dir: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreConfig,
    pub crawl: CrawlConfig,
    pub transactions: Vec<String>,
    pub property_types: Vec<String>,
    pub locations_file: PathBuf,
    pub table: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any key lookup, so tests need not touch the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| lookup(name).ok_or(ConfigError::Missing(name));
        let or_default = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let store = StoreConfig {
            host: required("DB_HOST")?,
            user: required("DB_USER")?,
            password: required("DB_PASSWORD")?,
            database: required("DB_NAME")?,
        };

        let delay = DelayRange {
            min_secs: parse_var(&lookup, "LISTINGS_DELAY_MIN_SECS", 1.0)?,
            max_secs: parse_var(&lookup, "LISTINGS_DELAY_MAX_SECS", 5.0)?,
        };
        // NaN and inf fall outside the range too.
        for (name, secs) in [
            ("LISTINGS_DELAY_MIN_SECS", delay.min_secs),
            ("LISTINGS_DELAY_MAX_SECS", delay.max_secs),
        ] {
            if !(0.0..=MAX_DELAY_SECS).contains(&secs) {
                return Err(ConfigError::Invalid {
                    name,
                    value: secs.to_string(),
                });
            }
        }
        if delay.min_secs > delay.max_secs {
            return Err(ConfigError::Invalid {
                name: "LISTINGS_DELAY_MIN_SECS",
                value: delay.min_secs.to_string(),
            });
        }

        let timeout_secs: u64 = parse_var(&lookup, "LISTINGS_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        if !(1..=MAX_TIMEOUT_SECS).contains(&timeout_secs) {
            return Err(ConfigError::Invalid {
                name: "LISTINGS_TIMEOUT_SECS",
                value: timeout_secs.to_string(),
            });
        }

        let crawl = CrawlConfig {
            site_url: or_default("LISTINGS_SITE_URL", DEFAULT_SITE_URL),
            default_transaction: or_default("LISTINGS_DEFAULT_TRANSACTION", DEFAULT_TRANSACTION),
            delay,
            timeout: Duration::from_secs(timeout_secs),
            user_agent: USER_AGENT.to_string(),
            page_dump_dir: lookup("LISTINGS_PAGE_DUMP_DIR")
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from),
        };

        let table = or_default("LISTINGS_TABLE", DEFAULT_TABLE);
        if !is_identifier(&table) {
            return Err(ConfigError::Invalid {
                name: "LISTINGS_TABLE",
                value: table,
            });
        }

        Ok(Self {
            store,
            crawl,
            transactions: split_list(lookup("LISTINGS_TRANSACTIONS")),
            property_types: lookup("LISTINGS_PROPERTY_TYPES")
                .map(|v| split_list(Some(v)))
                .unwrap_or_else(|| vec![DEFAULT_PROPERTY_TYPE.to_string()]),
            locations_file: PathBuf::from(or_default("LISTINGS_LOCATIONS_FILE", DEFAULT_LOCATIONS_FILE)),
            table,
        })
    }
}

fn parse_var<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

fn split_list(value: Option<String>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
