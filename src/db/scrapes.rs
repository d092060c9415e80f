use crate::errors::AppError;
use rusqlite::{params, Connection};

pub fn start_scrape_run(conn: &Connection, combination: &str, now: i64) -> Result<i64, AppError> {
    conn.execute(
        "INSERT INTO scrape_runs (combination, started_at, success) VALUES (?, ?, 0)",
        params![combination, now],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn end_scrape_run(
    conn: &Connection,
    run_id: i64,
    now: i64,
    pages: Option<u32>,
    listings: Option<usize>,
    error: Option<String>,
) -> Result<(), AppError> {
    conn.execute(
        "UPDATE scrape_runs SET finished_at = ?, pages_fetched = ?, listings_seen = ?, success = ?, error_message = ? WHERE id = ?",
        params![now, pages, listings.map(|n| n as i64), error.is_none(), error, run_id],
    )?;
    Ok(())
}
