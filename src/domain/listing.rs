// src/domain/listing.rs

use crate::config::SOURCE_TAG;
use crate::domain::normalize::{
    normalize_area, normalize_count, normalize_location, normalize_price,
};
use crate::events::{EventSink, PipelineEvent};
use crate::scraper::RawListing;
use chrono::NaiveDateTime;
use serde::Serialize;

/// Stored in place of a title when the listing had no heading.
pub const UNTITLED: &str = "Untitled";

/// A listing with typed values, keeping the raw text it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedListing {
    pub title: String,

    // Raw text, kept for audit
    pub price_text: Option<String>,
    pub location_text: Option<String>,
    pub bedrooms_text: Option<String>,
    pub bathrooms_text: Option<String>,
    pub size_text: Option<String>,

    pub price_numeric: Option<f64>,
    pub bedrooms_count: Option<u32>,
    pub bathrooms_count: Option<u32>,
    pub size_sqm: Option<f64>,
    pub location_clean: String,

    pub source: String,
    pub scraped_at: NaiveDateTime,
}

impl NormalizedListing {
    pub fn from_raw(raw: RawListing, scraped_at: NaiveDateTime) -> Self {
        NormalizedListing {
            price_numeric: normalize_price(raw.price_text.as_deref()),
            bedrooms_count: normalize_count(raw.bedrooms_text.as_deref()),
            bathrooms_count: normalize_count(raw.bathrooms_text.as_deref()),
            size_sqm: normalize_area(raw.size_text.as_deref()),
            location_clean: normalize_location(raw.location_text.as_deref()),
            title: raw.title.unwrap_or_else(|| UNTITLED.to_string()),
            price_text: raw.price_text,
            location_text: raw.location_text,
            bedrooms_text: raw.bedrooms_text,
            bathrooms_text: raw.bathrooms_text,
            size_text: raw.size_text,
            source: SOURCE_TAG.to_string(),
            scraped_at,
        }
    }

    /// Price and bedroom count are required for a listing to be stored.
    pub fn is_complete(&self) -> bool {
        self.price_numeric.is_some() && self.bedrooms_count.is_some()
    }
}

/// Output of the cleaning stage.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanReport {
    pub listings: Vec<NormalizedListing>,
    pub scraped: usize,
    pub cleaned: usize,
}

/// Normalizes every raw listing and drops the incomplete ones.
pub fn clean_listings(
    raw: Vec<RawListing>,
    scraped_at: NaiveDateTime,
    sink: &dyn EventSink,
) -> CleanReport {
    let scraped = raw.len();

    let listings: Vec<NormalizedListing> = raw
        .into_iter()
        .map(|r| NormalizedListing::from_raw(r, scraped_at))
        .filter(NormalizedListing::is_complete)
        .collect();

    let cleaned = listings.len();
    sink.emit(&PipelineEvent::RecordsCleaned {
        scraped,
        cleaned,
        dropped: scraped - cleaned,
    });

    CleanReport {
        listings,
        scraped,
        cleaned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MemorySink;
    use chrono::Utc;

    fn raw(price: Option<&str>, bedrooms: Option<&str>) -> RawListing {
        RawListing {
            title: Some("House".to_string()),
            price_text: price.map(String::from),
            location_text: Some("lavington".to_string()),
            bedrooms_text: bedrooms.map(String::from),
            bathrooms_text: Some("2 Bathrooms".to_string()),
            size_text: None,
        }
    }

    #[test]
    fn drops_only_listings_missing_price_or_bedrooms() {
        let mut input = Vec::new();
        for _ in 0..6 {
            input.push(raw(Some("KSh 1,000"), Some("2 Bedrooms")));
        }
        for _ in 0..3 {
            input.push(raw(Some("N/A"), Some("2 Bedrooms")));
        }
        input.push(raw(Some("KSh 2,000"), None));

        let sink = MemorySink::new();
        let report = clean_listings(input, Utc::now().naive_utc(), &sink);

        assert_eq!(report.scraped, 10);
        assert_eq!(report.cleaned, 6);
        assert_eq!(report.listings.len(), 6);
        assert_eq!(
            sink.events(),
            vec![PipelineEvent::RecordsCleaned {
                scraped: 10,
                cleaned: 6,
                dropped: 4
            }]
        );
    }

    #[test]
    fn all_listings_share_the_run_timestamp() {
        let at = Utc::now().naive_utc();
        let input = vec![
            raw(Some("KSh 1"), Some("Studio")),
            raw(Some("KSh 2"), Some("1 Bedroom")),
        ];
        let report = clean_listings(input, at, &MemorySink::new());
        assert!(report.listings.iter().all(|l| l.scraped_at == at));
        assert!(report.listings.iter().all(|l| l.source == SOURCE_TAG));
        assert_eq!(report.listings[0].bedrooms_count, Some(0));
    }

    #[test]
    fn from_raw_keeps_raw_text_and_fills_defaults() {
        let listing = NormalizedListing::from_raw(
            RawListing {
                price_text: Some("KSh 8,500,000".to_string()),
                size_text: Some("200m²".to_string()),
                ..RawListing::default()
            },
            Utc::now().naive_utc(),
        );
        assert_eq!(listing.title, UNTITLED);
        assert_eq!(listing.price_text.as_deref(), Some("KSh 8,500,000"));
        assert_eq!(listing.price_numeric, Some(8_500_000.0));
        assert_eq!(listing.size_sqm, Some(200.0));
        assert_eq!(listing.location_clean, "Unknown");
        assert!(!listing.is_complete());
    }
}
