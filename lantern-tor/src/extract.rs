//! HTML title and link extraction
//!
//! Pulls the page title and the same-origin internal links out of a
//! fetched document. Malformed hrefs are skipped per-link; extraction
//! never fails.

use std::collections::HashSet;

use lantern_core::{canonicalize, same_origin, ONION_SUFFIX};
use scraper::{Html, Selector};
use url::Url;

/// Trimmed text of the first `<title>` element, if any
pub fn extract_title(html: &str) -> Option<String> {
    if html.is_empty() {
        return None;
    }

    let document = Html::parse_document(html);
    let selector = Selector::parse("title").unwrap();

    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|title| !title.is_empty())
}

/// Extract canonical same-origin .onion links, deduplicated in document order
pub fn extract_internal_links(html: &str, page_url: &Url) -> Vec<String> {
    if html.is_empty() {
        return Vec::new();
    }

    let document = Html::parse_document(html);
    let selector = Selector::parse("a[href]").unwrap();

    let mut seen: HashSet<String> = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&selector) {
        let href = match element.value().attr("href") {
            Some(h) => h,
            None => continue,
        };

        // Resolves relative paths, protocol-relative, and fragment-only
        // links; anything unparsable is skipped.
        let resolved = match page_url.join(href) {
            Ok(url) => url,
            Err(_) => continue,
        };

        if !same_origin(page_url, &resolved) {
            continue;
        }
        let host = match resolved.host_str() {
            Some(h) => h,
            None => continue,
        };
        if !host.ends_with(ONION_SUFFIX) {
            continue;
        }

        let canonical = canonicalize(&resolved);
        if seen.insert(canonical.clone()) {
            links.push(canonical);
        }
    }

    links
}
