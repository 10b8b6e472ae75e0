//! Crawl target helpers
//!
//! A crawl target is the raw relative path found in an `href`. Identity is the
//! exact string, so no normalization happens here beyond trimming.

use url::Url;

/// Returns true if an `href` is a same-origin relative path worth crawling
///
/// Only paths starting with a single `/` qualify. Protocol-relative hrefs
/// (`//host/path`) point at another origin and are rejected.
///
/// # Examples
///
/// ```
/// use oda_crawler::url::is_crawlable_href;
///
/// assert!(is_crawlable_href("/no/products/"));
/// assert!(!is_crawlable_href("https://oda.com/no/"));
/// assert!(!is_crawlable_href("//cdn.oda.com/img.png"));
/// ```
pub fn is_crawlable_href(href: &str) -> bool {
    href.starts_with('/') && !href.starts_with("//")
}

/// Resolves a crawl target against the configured origin
///
/// # Arguments
///
/// * `base` - The origin URL (e.g. `https://oda.com`)
/// * `target` - A same-origin relative path
///
/// # Returns
///
/// * `Ok(Url)` - The absolute URL to request
/// * `Err(url::ParseError)` - The target could not be joined onto the origin
pub fn resolve_target(base: &Url, target: &str) -> Result<Url, url::ParseError> {
    base.join(target)
}
