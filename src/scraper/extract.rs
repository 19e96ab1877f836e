use crate::config::ListingMarkers;
use crate::scraper::models::RawListing;
use crate::scraper::ScraperError;
use scraper::{ElementRef, Html, Selector};

/// Pulls raw listing fields out of an index page using a compiled marker set.
#[derive(Debug, Clone)]
pub struct ListingExtractor {
    listing: Selector,
    title: Selector,
    price: Selector,
    location: Selector,
    badge_list: Selector,
    badge: Selector,
    bedroom_keyword: String,
    bathroom_keyword: String,
    area_keyword: String,
}

fn parse_selector(selector: &str) -> Result<Selector, ScraperError> {
    Selector::parse(selector).map_err(|e| ScraperError::Selector {
        selector: selector.to_string(),
        msg: e.to_string(),
    })
}

/// Stripped text of every descendant text node, concatenated.
fn element_text(el: ElementRef<'_>) -> String {
    el.text().map(str::trim).filter(|s| !s.is_empty()).collect()
}

impl ListingExtractor {
    pub fn new(markers: &ListingMarkers) -> Result<Self, ScraperError> {
        Ok(Self {
            listing: parse_selector(&markers.listing)?,
            title: parse_selector(&markers.title)?,
            price: parse_selector(&markers.price)?,
            location: parse_selector(&markers.location)?,
            badge_list: parse_selector(&markers.badge_list)?,
            badge: parse_selector(&markers.badge)?,
            bedroom_keyword: markers.bedroom_keyword.clone(),
            bathroom_keyword: markers.bathroom_keyword.clone(),
            area_keyword: markers.area_keyword.clone(),
        })
    }

    /// Every listing fragment on the page, in document order.
    pub fn extract_page(&self, html: &str) -> Vec<RawListing> {
        let document = Html::parse_document(html);
        document
            .select(&self.listing)
            .map(|fragment| self.extract_listing(fragment))
            .collect()
    }

    pub fn extract_listing(&self, fragment: ElementRef<'_>) -> RawListing {
        let first_text = |selector: &Selector| fragment.select(selector).next().map(element_text);

        let mut raw = RawListing {
            title: first_text(&self.title),
            price_text: first_text(&self.price),
            location_text: first_text(&self.location),
            ..RawListing::default()
        };

        if let Some(list) = fragment.select(&self.badge_list).next() {
            for badge in list.select(&self.badge) {
                let text = element_text(badge);
                if text.contains(&self.bedroom_keyword) {
                    raw.bedrooms_text = Some(text);
                } else if text.contains(&self.bathroom_keyword) {
                    raw.bathrooms_text = Some(text);
                } else if text.contains(&self.area_keyword) {
                    raw.size_text = Some(text);
                }
            }
        }

        raw
    }
}
