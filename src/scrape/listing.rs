//! Result-listing traversal: cookie banner, keyword search, link
//! collection, pagination

use crate::browser::BrowserSession;
use crate::error::Result;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// The storefront search box.
pub const SEARCH_BOX: &str = "#twotabsearchtextbox";

/// Product anchors on a result listing.
const PRODUCT_LINK_SELECTOR: &str = "a.a-link-normal[href*='/dp/']";

const COOKIE_SELECTORS: &[&str] = &["#sp-cc-accept", "#sp-cc-accept input"];
const COOKIE_LABELS: &[&str] = &[
    "Accepteer",
    "Alle cookies accepteren",
    "Akkoord",
    "Accepteren",
    "Accept all",
    "Accept",
    "Agree",
];

const NEXT_PAGE_SELECTORS: &[&str] = &[
    "a.s-pagination-next",
    "a.s-pagination-item.s-pagination-next",
];
const NEXT_PAGE_LABELS: &[&str] = &["Volgende", "Next"];

/// Dismiss the cookie-consent banner if one is shown. Never fails; a page
/// without a banner is the common case.
pub async fn accept_cookies(session: &BrowserSession) {
    for selector in COOKIE_SELECTORS {
        if session.click(selector).await.is_ok() {
            info!("cookie banner accepted via {}", selector);
            return;
        }
    }

    // Fall back to matching consent buttons by label.
    match session.evaluate(cookie_click_script()).await {
        Ok(serde_json::Value::String(label)) => {
            info!("cookie banner accepted via label {:?}", label)
        }
        _ => debug!("no cookie banner found"),
    }
}

fn cookie_click_script() -> String {
    let labels = serde_json::to_string(COOKIE_LABELS).unwrap_or_else(|_| "[]".to_string());
    format!(
        r#"(() => {{
            const labels = {labels};
            const candidates = document.querySelectorAll("button, input[type='submit'], a");
            for (const el of candidates) {{
                const text = (el.innerText || el.value || "").trim();
                if (labels.some(l => text === l || text.startsWith(l))) {{
                    el.click();
                    return text;
                }}
            }}
            return null;
        }})()"#
    )
}

/// Type a keyword into the search box and submit it.
pub async fn search(session: &BrowserSession, keyword: &str, timeout: Duration) -> Result<()> {
    session.wait_for(SEARCH_BOX, timeout).await?;
    session.type_text(SEARCH_BOX, keyword).await?;
    session.press_key(SEARCH_BOX, "Enter").await?;
    Ok(())
}

/// Collect product links from the current listing, scrolling between rounds
/// to let more tiles load. Stops when a round finds nothing new, the round
/// cap is hit, or the limit is reached.
pub async fn collect_links(
    session: &BrowserSession,
    base: &Url,
    max_scroll_rounds: usize,
    limit: Option<usize>,
    delay: Duration,
) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for round in 0..max_scroll_rounds {
        let html = session.content().await?;
        let mut added = 0;
        for link in extract_product_links(&html, base) {
            if seen.insert(link.clone()) {
                links.push(link);
                added += 1;
            }
        }
        debug!("scroll round {}: {} links total", round + 1, links.len());

        if let Some(limit) = limit {
            if links.len() >= limit {
                break;
            }
        }
        if added == 0 {
            break;
        }

        session.evaluate("window.scrollBy(0, 600)").await?;
        tokio::time::sleep(delay).await;
    }

    if let Some(limit) = limit {
        links.truncate(limit);
    }
    Ok(links)
}

/// Pull product links out of listing HTML, normalized and deduplicated.
pub fn extract_product_links(html: &str, base: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse(PRODUCT_LINK_SELECTOR) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if let Some(url) = normalize_product_url(href, base) {
            if seen.insert(url.clone()) {
                links.push(url);
            }
        }
    }
    links
}

/// Absolutize a product href against the storefront origin and strip the
/// tracking query. Links without a `/dp/` path segment are not products.
pub fn normalize_product_url(href: &str, base: &Url) -> Option<String> {
    let mut url = base.join(href).ok()?;
    if !url.path().contains("/dp/") {
        return None;
    }
    url.set_query(None);
    url.set_fragment(None);
    Some(url.to_string())
}

/// Find the pagination "next" link in listing HTML: the dedicated
/// pagination anchor first, then any anchor labeled like a next button.
pub fn find_next_page_url(html: &str, base: &Url) -> Option<String> {
    let document = Html::parse_document(html);

    for raw in NEXT_PAGE_SELECTORS {
        let Ok(selector) = Selector::parse(raw) else {
            continue;
        };
        if let Some(url) = document
            .select(&selector)
            .next()
            .and_then(|el| el.value().attr("href"))
            .and_then(|href| base.join(href).ok())
        {
            return Some(url.to_string());
        }
    }

    let Ok(anchors) = Selector::parse("a[href]") else {
        return None;
    };
    for element in document.select(&anchors) {
        let text: String = element.text().collect();
        let text = text.trim();
        if NEXT_PAGE_LABELS.iter().any(|label| text == *label) {
            if let Some(url) = element
                .value()
                .attr("href")
                .and_then(|href| base.join(href).ok())
            {
                return Some(url.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://shop.test").unwrap()
    }

    #[test]
    fn normalizes_relative_links_and_strips_queries() {
        let url = normalize_product_url("/Some-Product/dp/B0TEST123?ref=sr_1_1", &base());
        assert_eq!(url.as_deref(), Some("https://shop.test/Some-Product/dp/B0TEST123"));
    }

    #[test]
    fn keeps_absolute_links_on_other_hosts() {
        let url = normalize_product_url("https://cdn.shop.test/x/dp/B0ZZZ", &base());
        assert_eq!(url.as_deref(), Some("https://cdn.shop.test/x/dp/B0ZZZ"));
    }

    #[test]
    fn rejects_non_product_links() {
        assert!(normalize_product_url("/help/contact", &base()).is_none());
        assert!(normalize_product_url("javascript:void(0)", &base()).is_none());
    }

    #[test]
    fn extracts_and_deduplicates_product_links() {
        let html = r#"
            <div>
              <a class="a-link-normal" href="/A/dp/B01?ref=1">one</a>
              <a class="a-link-normal" href="/A/dp/B01?ref=2">one again</a>
              <a class="a-link-normal" href="/B/dp/B02">two</a>
              <a class="a-link-normal" href="/help">not a product</a>
              <a href="/C/dp/B03">missing class</a>
            </div>
        "#;
        let links = extract_product_links(html, &base());
        assert_eq!(
            links,
            vec![
                "https://shop.test/A/dp/B01".to_string(),
                "https://shop.test/B/dp/B02".to_string(),
            ]
        );
    }

    #[test]
    fn finds_next_page_via_pagination_anchor() {
        let html = r#"<a class="s-pagination-next a-link-normal" href="/s?k=cup&page=2">Volgende</a>"#;
        let url = find_next_page_url(html, &base());
        assert_eq!(url.as_deref(), Some("https://shop.test/s?k=cup&page=2"));
    }

    #[test]
    fn finds_next_page_via_label_fallback() {
        let html = r#"<a href="/s?page=3">Next</a>"#;
        let url = find_next_page_url(html, &base());
        assert_eq!(url.as_deref(), Some("https://shop.test/s?page=3"));
    }

    #[test]
    fn no_next_page_returns_none() {
        let html = r#"<a href="/s?page=3">Previous</a>"#;
        assert!(find_next_page_url(html, &base()).is_none());
    }

    #[test]
    fn cookie_script_embeds_labels() {
        let script = cookie_click_script();
        assert!(script.contains("Accepteer"));
        assert!(script.contains("querySelectorAll"));
    }
}
