pub mod listing;
pub mod normalize;

pub use listing::{clean_listings, CleanReport, NormalizedListing};
