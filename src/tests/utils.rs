use crate::config::StoreConfig;
use crate::db::{init_db, Database};
use crate::scraper::{PageOutcome, PageSource};
use std::cell::RefCell;
use std::collections::HashMap;
use tempfile::TempDir;

/// A throwaway SQLite store; the directory is removed when this is dropped.
pub struct TestStore {
    _dir: TempDir,
    pub config: StoreConfig,
}

impl TestStore {
    pub fn db(&self) -> Database {
        Database::new(self.config.database.clone())
    }
}

/// Initialize a fresh test DB with the production schema
pub fn init_test_store() -> TestStore {
    let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir failed: {e}"));
    let path = dir.path().join("listings.sqlite3");
    let config = StoreConfig::sqlite(path.to_string_lossy().to_string());

    init_db(&Database::new(config.database.clone()))
        .unwrap_or_else(|e| panic!("Database initialization failed: {e}"));

    TestStore { _dir: dir, config }
}

/// Serves canned pages and remembers which ones were asked for.
#[derive(Default)]
pub struct StaticPages {
    pages: HashMap<u32, PageOutcome>,
    requested: RefCell<Vec<u32>>,
}

impl StaticPages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: u32, html: String) -> Self {
        self.pages.insert(page, PageOutcome::Fetched(html));
        self
    }

    pub fn unavailable(mut self, page: u32, reason: &str) -> Self {
        self.pages
            .insert(page, PageOutcome::Unavailable(reason.to_string()));
        self
    }

    pub fn requested(&self) -> Vec<u32> {
        self.requested.borrow().clone()
    }
}

impl PageSource for StaticPages {
    fn fetch_page(&self, page: u32) -> PageOutcome {
        self.requested.borrow_mut().push(page);
        self.pages
            .get(&page)
            .cloned()
            .unwrap_or_else(|| PageOutcome::Unavailable("HTTP status 404".to_string()))
    }
}

/// Markup for one listing card, shaped like the live site's.
pub fn listing_card(title: &str, price: &str, location: &str, badges: &[&str]) -> String {
    let slides: String = badges
        .iter()
        .map(|b| format!(r#"<div class="swiper-slide">{b}</div>"#))
        .collect();

    format!(
        r#"<div class="listing-card">
             <h2>{title}</h2>
             <p class="text-xl font-bold leading-7 text-grey-900">{price}</p>
             <p class="ml-1 truncate text-sm font-normal capitalize text-grey-650">{location}</p>
             <div class="scrollable-list">{slides}</div>
           </div>"#
    )
}

pub fn index_page(cards: &[String]) -> String {
    format!("<html><body><main>{}</main></body></html>", cards.join("\n"))
}
