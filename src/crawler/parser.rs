//! HTML parser for extracting links and product data
//!
//! This module handles parsing HTML content to extract:
//! - Same-origin relative links to follow (from `<a href>` tags)
//! - Product records from product pages
//!
//! Parsing is synchronous and the parsed document never outlives the call,
//! so nothing here is held across an `.await`.

use crate::state::ProductRecord;
use crate::url::{is_crawlable_href, name_from_slug, product_key, product_slug};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedPage {
    /// Crawlable relative links in document order, without duplicates
    pub links: Vec<String>,

    /// Product id and record, when the page is a product page
    pub product: Option<(String, ProductRecord)>,
}

/// Parses a fetched page
///
/// # Arguments
///
/// * `html` - The HTML content
/// * `target` - The relative path the page was fetched from
///
/// # Example
///
/// ```
/// use oda_crawler::crawler::parse_page;
///
/// let html = r#"<html><body><a href="/no/products/1-milk/">Milk</a></body></html>"#;
/// let parsed = parse_page(html, "/no");
/// assert_eq!(parsed.links, vec!["/no/products/1-milk/"]);
/// assert!(parsed.product.is_none());
/// ```
pub fn parse_page(html: &str, target: &str) -> ParsedPage {
    let document = Html::parse_document(html);

    let product = product_key(target).map(|id| {
        let record = extract_product(&document, target, &id);
        (id, record)
    });

    ParsedPage {
        links: extract_links(&document),
        product,
    }
}

/// Extracts every crawlable `href` from the document
fn extract_links(document: &Html) -> Vec<String> {
    let mut links = Vec::new();
    let mut seen = HashSet::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if let Some(href) = element.value().attr("href") {
                let href = href.trim();
                if is_crawlable_href(href) && seen.insert(href) {
                    links.push(href.to_string());
                }
            }
        }
    }

    links
}

/// Extracts a product record from a product page
///
/// Missing fields stay `None`. A missing name falls back to the product slug
/// taken from `target`, and to the bare id if the slug carries no name.
pub fn extract_product(document: &Html, target: &str, id: &str) -> ProductRecord {
    let name = select_text(document, r#"[itemprop="name"]"#).unwrap_or_else(|| {
        let fallback = product_slug(target).map(name_from_slug).unwrap_or_default();
        if fallback.trim().is_empty() {
            id.to_string()
        } else {
            fallback
        }
    });

    let price = select_attr(document, ".price", "content").and_then(|v| parse_leading_int(&v));

    ProductRecord {
        name,
        price,
        brand: select_text(document, r#"[itemprop="brand"]"#),
        unit_price: select_text(document, ".unit-price"),
        description: select_text(document, r#"[itemprop="description"]"#),
    }
}

fn select_first<'a>(document: &'a Html, selector: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(selector).ok()?;
    document.select(&selector).next()
}

/// Cleaned text of the first element matching `selector`
fn select_text(document: &Html, selector: &str) -> Option<String> {
    select_first(document, selector)
        .map(|element| clean_text(&element.text().collect::<String>()))
        .filter(|s| !s.is_empty())
}

fn select_attr(document: &Html, selector: &str, attr: &str) -> Option<String> {
    select_first(document, selector)
        .and_then(|element| element.value().attr(attr))
        .map(str::to_string)
}

/// Trims and collapses every whitespace run (newlines included) to one space
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parses the leading integer of a string, ignoring whatever follows
///
/// `"45"` and `"45.90"` both give `45`; text with no leading digits gives `None`.
pub fn parse_leading_int(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let value: i64 = digits[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}
