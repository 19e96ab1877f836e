use anyhow::{Context, Result};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const BASE_URL: &str = "https://www.buyrentkenya.com/houses-for-sale";

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3";

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const PAGE_DELAY: Duration = Duration::from_secs(1);

/// Tag stored with every row to identify the origin site.
pub const SOURCE_TAG: &str = "buyrentkenya.com";

/// Store connection parameters, as handed over by the scheduler.
#[derive(Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub protocol: String,
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub database: String,
}

impl StoreConfig {
    pub fn sqlite(path: impl Into<String>) -> Self {
        Self {
            protocol: "sqlite".to_string(),
            user: String::new(),
            password: String::new(),
            host: String::new(),
            port: 0,
            database: path.into(),
        }
    }

    /// Load from `STORE_*` environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self> {
        let _ = dotenv();

        Ok(Self {
            protocol: env::var("STORE_PROTOCOL").unwrap_or_else(|_| "sqlite".to_string()),
            user: env::var("STORE_USER").unwrap_or_default(),
            password: env::var("STORE_PASSWORD").unwrap_or_default(),
            host: env::var("STORE_HOST").unwrap_or_default(),
            port: env::var("STORE_PORT")
                .unwrap_or_else(|_| "0".to_string())
                .parse()
                .context("STORE_PORT must be a valid port number")?,
            database: env::var("STORE_DATABASE")
                .unwrap_or_else(|_| "listings.sqlite3".to_string()),
        })
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("protocol", &self.protocol)
            .field("user", &self.user)
            .field("password", &"***")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .finish()
    }
}

/// Inclusive page range for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeConfig {
    pub start_page: u32,
    pub end_page: u32,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            start_page: 1,
            end_page: 4,
        }
    }
}

impl ScrapeConfig {
    pub fn new(start_page: u32, end_page: u32) -> Self {
        Self {
            start_page,
            end_page,
        }
    }

    /// Load from `SCRAPE_START_PAGE` / `SCRAPE_END_PAGE`, falling back to 1..=4.
    pub fn from_env() -> Result<Self> {
        let _ = dotenv();
        let defaults = Self::default();

        Ok(Self {
            start_page: match env::var("SCRAPE_START_PAGE") {
                Ok(v) => v.parse().context("SCRAPE_START_PAGE must be a number")?,
                Err(_) => defaults.start_page,
            },
            end_page: match env::var("SCRAPE_END_PAGE") {
                Ok(v) => v.parse().context("SCRAPE_END_PAGE must be a number")?,
                Err(_) => defaults.end_page,
            },
        })
    }

    pub fn is_valid(&self) -> bool {
        self.start_page <= self.end_page
    }
}

/// CSS selectors and badge keywords that locate fields in the origin site's markup.
/// These track the site's current class names and will need updating when it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingMarkers {
    pub listing: String,
    pub title: String,
    pub price: String,
    pub location: String,
    pub badge_list: String,
    pub badge: String,
    pub bedroom_keyword: String,
    pub bathroom_keyword: String,
    pub area_keyword: String,
}

impl Default for ListingMarkers {
    fn default() -> Self {
        Self {
            listing: "div.listing-card".to_string(),
            title: "h2".to_string(),
            price: "p.text-xl.font-bold.leading-7.text-grey-900".to_string(),
            location: "p.ml-1.truncate.text-sm.font-normal.capitalize.text-grey-650"
                .to_string(),
            badge_list: "div.scrollable-list".to_string(),
            badge: "div.swiper-slide".to_string(),
            bedroom_keyword: "Bedroom".to_string(),
            bathroom_keyword: "Bathroom".to_string(),
            area_keyword: "m²".to_string(),
        }
    }
}

impl ListingMarkers {
    /// Read a JSON marker file; fields it leaves out keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read marker file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Invalid marker file {}", path.display()))
    }

    /// Markers from the file named by `LISTING_MARKERS`, or the defaults when unset.
    pub fn from_env() -> Result<Self> {
        let _ = dotenv();

        match env::var("LISTING_MARKERS") {
            Ok(path) if !path.is_empty() => Self::from_file(path),
            _ => Ok(Self::default()),
        }
    }
}
