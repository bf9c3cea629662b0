//! Static field extraction from a captured product page
//!
//! Each field carries an ordered fallback list of selectors; the first
//! match wins. Extraction never fails: a field nothing matches stays
//! `None` and ends up as an empty cell.

use crate::scrape::record::ProductRecord;
use scraper::{ElementRef, Html, Selector};

const IMAGE_SELECTORS: &[&str] = &["#landingImage", "#imgTagWrapperId img"];
const TITLE_SELECTORS: &[&str] = &["#productTitle"];
const AVG_REVIEW_SELECTORS: &[&str] = &[
    "#acrPopover a span",
    "span[data-hook='rating-out-of-text']",
];
const REVIEW_COUNT_SELECTORS: &[&str] = &["#acrCustomerReviewText"];
const PRIME_SELECTORS: &[&str] = &["#abb-message"];
const PRICE_SELECTORS: &[&str] = &[
    "#corePriceDisplay_desktop_feature_div .a-price .a-offscreen",
    "#corePriceDisplay_desktop_feature_div .a-price-whole",
    ".a-price .a-offscreen",
];
const DELIVERY_SELECTORS: &[&str] = &[
    "#mir-layout-DELIVERY_BLOCK-slot-PRIMARY_DELIVERY_MESSAGE_LARGE span",
    "#deliveryBlockMessage span",
];
const AVAILABILITY_SELECTORS: &[&str] = &["#availability span", "#availability"];
const SPECIFICATIONS_SELECTORS: &[&str] = &["#productDetails_feature_div", "#prodDetails"];

/// Prefixes a price cell must start with; discount badges like "-22%" fail
/// this and fall through to the next selector.
const CURRENCY_PREFIXES: &[char] = &['€', '$', '£'];

/// Extract a product record from the page HTML.
pub fn extract_record(html: &str, url: &str) -> ProductRecord {
    let document = Html::parse_document(html);

    let mut record = ProductRecord::new(url);
    record.image = first_attr(&document, IMAGE_SELECTORS, "src");
    record.title = first_text(&document, TITLE_SELECTORS);
    record.avg_review = first_text(&document, AVG_REVIEW_SELECTORS);
    record.review_count = first_text(&document, REVIEW_COUNT_SELECTORS);
    record.has_prime = first_text(&document, PRIME_SELECTORS);
    record.price = first_price(&document, PRICE_SELECTORS);
    record.delivery = first_text(&document, DELIVERY_SELECTORS);
    record.availability = first_text(&document, AVAILABILITY_SELECTORS);
    record.specifications = first_text(&document, SPECIFICATIONS_SELECTORS);
    record
}

fn collapsed_text(element: ElementRef<'_>) -> Option<String> {
    let text: String = element.text().collect::<Vec<_>>().join(" ");
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn first_text(document: &Html, selectors: &[&str]) -> Option<String> {
    for raw in selectors {
        let Ok(selector) = Selector::parse(raw) else {
            continue;
        };
        if let Some(text) = document.select(&selector).next().and_then(collapsed_text) {
            return Some(text);
        }
    }
    None
}

fn first_attr(document: &Html, selectors: &[&str], attr: &str) -> Option<String> {
    for raw in selectors {
        let Ok(selector) = Selector::parse(raw) else {
            continue;
        };
        if let Some(value) = document
            .select(&selector)
            .next()
            .and_then(|el| el.value().attr(attr))
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
        {
            return Some(value);
        }
    }
    None
}

fn first_price(document: &Html, selectors: &[&str]) -> Option<String> {
    for raw in selectors {
        let Ok(selector) = Selector::parse(raw) else {
            continue;
        };
        if let Some(text) = document
            .select(&selector)
            .next()
            .and_then(collapsed_text)
            .filter(|t| t.starts_with(CURRENCY_PREFIXES))
        {
            return Some(text);
        }
    }
    None
}
