use crate::db::connection::Database;
use crate::domain::NormalizedListing;
use crate::errors::StoreError;
use crate::events::{EventSink, PipelineEvent};
use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, Connection};

pub const TABLE: &str = "properties";

/// One column of the `properties` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub sql_type: &'static str,
    pub nullable: bool,
}

const fn col(name: &'static str, sql_type: &'static str, nullable: bool) -> Column {
    Column {
        name,
        sql_type,
        nullable,
    }
}

/// Every column except the auto-assigned `id`, in insert order.
/// `PropertyRow::insert` binds its values in exactly this order.
pub const PROPERTY_COLUMNS: [Column; 14] = [
    col("title", "TEXT", false),
    col("price_text", "TEXT", true),
    col("location", "TEXT", true),
    col("bedrooms_text", "TEXT", true),
    col("bathrooms_text", "TEXT", true),
    col("size_text", "TEXT", true),
    col("price_numeric", "REAL", true),
    col("bedrooms_numeric", "INTEGER", true),
    col("bathrooms_numeric", "INTEGER", true),
    col("size_sqm", "REAL", true),
    col("location_clean", "TEXT", true),
    col("source", "TEXT", false),
    col("scraped_date", "TEXT", false),
    col("inserted_date", "TEXT", false),
];

pub fn create_table_sql() -> String {
    let columns: Vec<String> = PROPERTY_COLUMNS
        .iter()
        .map(|c| match (c.name, c.nullable) {
            ("inserted_date", _) => format!("{} {} NOT NULL DEFAULT CURRENT_TIMESTAMP", c.name, c.sql_type),
            (name, true) => format!("{name} {}", c.sql_type),
            (name, false) => format!("{name} {} NOT NULL", c.sql_type),
        })
        .collect();

    format!(
        "CREATE TABLE IF NOT EXISTS {TABLE} (\n    id INTEGER PRIMARY KEY AUTOINCREMENT,\n    {}\n);",
        columns.join(",\n    ")
    )
}

fn insert_sql() -> String {
    let names: Vec<&str> = PROPERTY_COLUMNS.iter().map(|c| c.name).collect();
    let placeholders: Vec<String> = (1..=names.len()).map(|i| format!("?{i}")).collect();
    format!(
        "INSERT INTO {TABLE} ({}) VALUES ({})",
        names.join(", "),
        placeholders.join(", ")
    )
}

/// A listing translated to storage values.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyRow<'a> {
    pub listing: &'a NormalizedListing,
    pub inserted_at: NaiveDateTime,
}

impl<'a> PropertyRow<'a> {
    pub fn new(listing: &'a NormalizedListing, inserted_at: NaiveDateTime) -> Self {
        Self {
            listing,
            inserted_at,
        }
    }

    fn insert(&self, stmt: &mut rusqlite::Statement<'_>) -> rusqlite::Result<usize> {
        let l = self.listing;
        stmt.execute(params![
            &l.title,
            &l.price_text,
            &l.location_text,
            &l.bedrooms_text,
            &l.bathrooms_text,
            &l.size_text,
            l.price_numeric,
            l.bedrooms_count,
            l.bathrooms_count,
            l.size_sqm,
            &l.location_clean,
            &l.source,
            l.scraped_at,
            self.inserted_at,
        ])
    }
}

/// A stored row, as read back.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedProperty {
    pub id: i64,
    pub title: String,
    pub price_text: Option<String>,
    pub location_text: Option<String>,
    pub bedrooms_text: Option<String>,
    pub bathrooms_text: Option<String>,
    pub size_text: Option<String>,
    pub price_numeric: Option<f64>,
    pub bedrooms_count: Option<u32>,
    pub bathrooms_count: Option<u32>,
    pub size_sqm: Option<f64>,
    pub location_clean: Option<String>,
    pub source: String,
    pub scraped_at: NaiveDateTime,
    pub inserted_at: NaiveDateTime,
}

fn insert_rows(conn: &Connection, rows: &[PropertyRow<'_>]) -> Result<usize, StoreError> {
    let mut stmt = conn.prepare(&insert_sql())?;
    for row in rows {
        row.insert(&mut stmt)?;
    }
    Ok(rows.len())
}

/// Writes all listings in one transaction. Either every row lands or none do.
pub fn insert_properties(
    db: &Database,
    listings: &[NormalizedListing],
    sink: &dyn EventSink,
) -> Result<usize, StoreError> {
    let now = Utc::now().naive_utc();
    let rows: Vec<PropertyRow<'_>> = listings.iter().map(|l| PropertyRow::new(l, now)).collect();

    db.with_conn(|conn| {
        let tx = conn.transaction()?;

        match insert_rows(&tx, &rows) {
            Ok(inserted) => {
                tx.commit()?;
                sink.emit(&PipelineEvent::RecordsInserted { inserted });
                Ok(inserted)
            }
            Err(e) => {
                if let Err(rb) = tx.rollback() {
                    tracing::error!(error = %rb, "rollback failed");
                }
                sink.emit(&PipelineEvent::InsertRolledBack {
                    attempted: rows.len(),
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    })
}

pub fn count_properties(db: &Database) -> Result<i64, StoreError> {
    db.with_conn(|conn| {
        conn.query_row(&format!("SELECT COUNT(*) FROM {TABLE}"), [], |row| row.get(0))
            .map_err(StoreError::from)
    })
}

/// Most recently inserted rows first.
pub fn recent_properties(db: &Database, limit: usize) -> Result<Vec<PersistedProperty>, StoreError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT
                id, title, price_text, location, bedrooms_text, bathrooms_text, size_text,
                price_numeric, bedrooms_numeric, bathrooms_numeric, size_sqm,
                location_clean, source, scraped_date, inserted_date
            FROM {TABLE}
            ORDER BY id DESC
            LIMIT ?1
            "#
        ))?;

        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(PersistedProperty {
                id: row.get(0)?,
                title: row.get(1)?,
                price_text: row.get(2)?,
                location_text: row.get(3)?,
                bedrooms_text: row.get(4)?,
                bathrooms_text: row.get(5)?,
                size_text: row.get(6)?,
                price_numeric: row.get(7)?,
                bedrooms_count: row.get(8)?,
                bathrooms_count: row.get(9)?,
                size_sqm: row.get(10)?,
                location_clean: row.get(11)?,
                source: row.get(12)?,
                scraped_at: row.get(13)?,
                inserted_at: row.get(14)?,
            })
        })?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    })
}
