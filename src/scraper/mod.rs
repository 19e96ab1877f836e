mod extract;
mod models;
mod scraper;
mod scraper_error;

pub use extract::ListingExtractor;
pub use models::{PageOutcome, RawListing};
pub use scraper::{Collector, HttpFetcher, PageSource};
pub use scraper_error::ScraperError;
