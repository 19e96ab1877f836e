// errors.rs
use crate::scraper::ScraperError;
use thiserror::Error;

/// Errors from the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Unsupported store protocol: {0} (only sqlite is supported)")]
    UnsupportedProtocol(String),
    #[error("Open DB failed: {0}")]
    Open(String),
    #[error("Failed to apply schema: {0}")]
    Schema(String),
    #[error("Database error: {0}")]
    Db(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Db(e.to_string())
    }
}

/// Any fault that ends a run. Its `Display` text becomes the summary's `error`.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid page range {start}..={end}")]
    InvalidRange { start: u32, end: u32 },
    #[error(transparent)]
    Scraper(#[from] ScraperError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Run panicked: {0}")]
    Panicked(String),
}
