use serde::Serialize;

// listing-card
//  ├── h2                      -> title
//  ├── p (price classes)       -> price_text
//  ├── p (location classes)    -> location_text
//  └── div.scrollable-list
//       └── div.swiper-slide   -> "3 Bedrooms" | "2 Bathrooms" | "200 m²"

/// One listing as found on the page, before any type conversion.
/// `None` means the marker for that field was absent from the fragment.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawListing {
    pub title: Option<String>,
    pub price_text: Option<String>,
    pub location_text: Option<String>,
    pub bedrooms_text: Option<String>,
    pub bathrooms_text: Option<String>,
    pub size_text: Option<String>,
}

/// Result of a single page request. An unavailable page is skipped, not fatal.
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    Fetched(String),
    Unavailable(String),
}
