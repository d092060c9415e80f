use rusqlite::Connection;
use std::cell::RefCell;
use std::path::Path;
use tracing::info;

use crate::config::StoreConfig;
use crate::errors::AppError;

const SCHEMA_SQL: &str = include_str!("../../sql/schema.sql");

/// The run's single store connection. Dropping the `Database` closes it.
pub struct Database {
    conn: RefCell<Connection>,
}

impl Database {
    /// Opens the store named by `cfg`. The bundled SQLite backend keeps the
    /// database in the file named by `cfg.database`; host, user and password
    /// are only reported.
    pub fn open(cfg: &StoreConfig) -> Result<Self, AppError> {
        info!(
            host = %cfg.host,
            user = %cfg.user,
            password_set = !cfg.password.is_empty(),
            database = %cfg.database,
            "Opening listings store"
        );
        Self::open_path(&cfg.database)
    }

    pub fn open_path(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let conn = Connection::open(path)?;
        Ok(Self {
            conn: RefCell::new(conn),
        })
    }

    /// Provides a mutable connection to the closure.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut Connection) -> Result<T, AppError>,
    {
        let mut conn = self
            .conn
            .try_borrow_mut()
            .map_err(|_| AppError::Load("store connection already in use".into()))?;
        f(&mut conn)
    }
}

/// Applies the bookkeeping schema. Safe to run on every start.
pub fn init_db(db: &Database) -> Result<(), AppError> {
    db.with_conn(|conn| {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(())
    })?;

    info!("Database schema applied");
    Ok(())
}
