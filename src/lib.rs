pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod events;
pub mod pipeline;
pub mod scraper;

pub use config::{ListingMarkers, ScrapeConfig, StoreConfig};
pub use pipeline::{run, run_configured, run_with, RunOptions, RunStatus, RunSummary};

#[cfg(test)]
mod tests;
