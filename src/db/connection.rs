use crate::config::StoreConfig;
use crate::db::properties::create_table_sql;
use crate::errors::StoreError;
use rusqlite::Connection;

/// Handle to the listings store. Holds only the location; each unit of work
/// opens its own connection and drops it before returning.
#[derive(Debug, Clone)]
pub struct Database {
    path: String,
}

impl Database {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Resolve a store config and make sure the schema exists.
    pub fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        if !config.protocol.eq_ignore_ascii_case("sqlite") {
            return Err(StoreError::UnsupportedProtocol(config.protocol.clone()));
        }
        let db = Self::new(config.database.clone());
        init_db(&db)?;
        Ok(db)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Provides a mutable connection to the closure.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Connection) -> Result<T, StoreError>,
    {
        let mut conn = Connection::open(&self.path)
            .map_err(|e| StoreError::Open(format!("{}: {e}", self.path)))?;
        f(&mut conn)
    }
}

/// Create the `properties` table if it is not there yet.
pub fn init_db(db: &Database) -> Result<(), StoreError> {
    db.with_conn(|conn| {
        conn.execute_batch(&create_table_sql())
            .map_err(|e| StoreError::Schema(e.to_string()))
    })?;

    tracing::debug!(path = db.path(), "schema ready");
    Ok(())
}
