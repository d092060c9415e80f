use crate::config::is_identifier;
use crate::db::connection::Database;
use crate::domain::listing::NormalizedListing;
use crate::errors::AppError;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use tracing::{debug, info};

const SQL_LISTINGS_TABLE: &str = include_str!("../../sql/listings_table.sql");

pub const LISTING_COLUMNS: [&str; 11] = [
    "id",
    "listing_description",
    "region",
    "size_m2",
    "bedrooms",
    "bathrooms",
    "parking_spaces",
    "price",
    "condominium",
    "iptu",
    "link",
];

/// A record the loader can insert: named columns and their values, in the
/// same order.
pub trait Row {
    fn columns(&self) -> Vec<&'static str>;
    fn values(&self) -> Vec<Value>;
}

fn text(value: &Option<String>) -> Value {
    value.clone().map_or(Value::Null, Value::Text)
}

impl Row for NormalizedListing {
    fn columns(&self) -> Vec<&'static str> {
        LISTING_COLUMNS.to_vec()
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.id.clone()),
            Value::Text(self.listing_description.clone()),
            Value::Text(self.region.clone()),
            Value::Integer(i64::from(self.size_m2)),
            Value::Integer(i64::from(self.bedrooms)),
            Value::Integer(i64::from(self.bathrooms)),
            Value::Integer(i64::from(self.parking_spaces)),
            text(&self.price),
            text(&self.condominium),
            text(&self.iptu),
            Value::Text(self.link.clone()),
        ]
    }
}

fn check_table(table: &str) -> Result<(), AppError> {
    if is_identifier(table) {
        Ok(())
    } else {
        Err(AppError::Load(format!("invalid table name {table:?}")))
    }
}

/// Creates the listings table if it does not exist yet.
pub fn ensure_listings_table(conn: &Connection, table: &str) -> Result<(), AppError> {
    check_table(table)?;
    conn.execute_batch(&SQL_LISTINGS_TABLE.replace("{table}", table))?;
    Ok(())
}

/// Inserts all `records` into `table` in one transaction. The column list
/// comes from the first record; every record must supply a value for each of
/// those columns or nothing is written.
pub fn load<R: Row>(db: &Database, table: &str, records: &[R]) -> Result<usize, AppError> {
    let Some(first) = records.first() else {
        debug!(table, "Nothing to load");
        return Ok(0);
    };
    check_table(table)?;

    let columns = first.columns();
    let placeholders = vec!["?"; columns.len()].join(", ");
    let sql = format!(
        "INSERT INTO {table} ({}) VALUES ({placeholders})",
        columns.join(", ")
    );

    db.with_conn(|conn| {
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(&sql)?;
            for (idx, record) in records.iter().enumerate() {
                let values = record.values();
                if values.len() != columns.len() {
                    return Err(AppError::Load(format!(
                        "record {idx} has {} values for {} columns",
                        values.len(),
                        columns.len()
                    )));
                }
                stmt.execute(params_from_iter(values))?;
            }
        }
        tx.commit()?;
        Ok(())
    })?;

    info!(table, rows = records.len(), "Listings loaded");
    Ok(records.len())
}
