// src/domain/normalize.rs
//
// Text-to-value conversions for scraped fields. All of these are total:
// anything that cannot be read becomes `None` (or "Unknown" for locations).

use regex::Regex;
use std::sync::OnceLock;

pub const CURRENCY_PREFIX: &str = "KSh";
pub const AREA_SUFFIXES: [&str; 2] = ["m²", "m2"];
pub const UNKNOWN_LOCATION: &str = "Unknown";

const LOCATION_PLACEHOLDERS: [&str; 2] = ["N/A", "No location"];

fn digits() -> Option<&'static Regex> {
    static DIGITS: OnceLock<Option<Regex>> = OnceLock::new();
    DIGITS.get_or_init(|| Regex::new(r"[0-9]+").ok()).as_ref()
}

fn parse_decimal(text: &str) -> Option<f64> {
    text.trim()
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// "KSh 12,500,000" -> 12500000.0
pub fn normalize_price(text: Option<&str>) -> Option<f64> {
    let text = text?.trim();
    let amount = text.strip_prefix(CURRENCY_PREFIX).unwrap_or(text);
    parse_decimal(amount)
}

/// "3 Bedrooms" -> 3, "Studio" -> 0.
/// Only ASCII digits count, and a run too large for `u32` is unreadable.
pub fn normalize_count(text: Option<&str>) -> Option<u32> {
    let text = text?;
    if text.to_lowercase().contains("studio") {
        return Some(0);
    }
    digits()?.find(text)?.as_str().parse().ok()
}

/// "1,200 m²" -> 1200.0
pub fn normalize_area(text: Option<&str>) -> Option<f64> {
    let text = text?.trim();
    let number = AREA_SUFFIXES
        .iter()
        .find_map(|suffix| text.strip_suffix(*suffix))
        .unwrap_or(text);
    parse_decimal(number)
}

pub fn normalize_location(text: Option<&str>) -> String {
    match text.map(str::trim) {
        Some(t) if !t.is_empty() && !LOCATION_PLACEHOLDERS.contains(&t) => title_case(t),
        _ => UNKNOWN_LOCATION.to_string(),
    }
}

/// Upper-cases the first letter of every run of letters, lower-cases the rest.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}
