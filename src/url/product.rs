//! Product page detection

const PRODUCTS_SEGMENT: &str = "products/";

/// Locates the first `products/<digits>` occurrence and returns the text after `products/`
fn product_tail(path: &str) -> Option<&str> {
    let mut search_from = 0;
    while let Some(offset) = path[search_from..].find(PRODUCTS_SEGMENT) {
        let tail_start = search_from + offset + PRODUCTS_SEGMENT.len();
        let tail = &path[tail_start..];
        if tail.starts_with(|c: char| c.is_ascii_digit()) {
            return Some(tail);
        }
        search_from = tail_start;
    }
    None
}

/// Extracts the numeric product id from a product page path
///
/// A path is a product page when it contains `products/` directly followed
/// by at least one digit. The id is that run of digits.
///
/// # Examples
///
/// ```
/// use oda_crawler::url::product_key;
///
/// assert_eq!(product_key("/no/products/3215-tine-organic-milk/"), Some("3215".to_string()));
/// assert_eq!(product_key("/no/categories/20-dairy/"), None);
/// ```
pub fn product_key(path: &str) -> Option<String> {
    let tail = product_tail(path)?;
    let digits: String = tail.chars().take_while(|c| c.is_ascii_digit()).collect();
    Some(digits)
}

/// Returns the `<id>-<slug>` path segment of a product page
pub fn product_slug(path: &str) -> Option<&str> {
    let tail = product_tail(path)?;
    let end = tail.find(['/', '?', '#']).unwrap_or(tail.len());
    Some(&tail[..end])
}

/// Derives a human readable name from a product slug
///
/// Everything up to and including the first `-` is dropped and the remaining
/// separators become spaces. A slug without separators is returned unchanged.
pub fn name_from_slug(slug: &str) -> String {
    let rest = match slug.find('-') {
        Some(idx) => &slug[idx + 1..],
        None => slug,
    };
    rest.replace('-', " ")
}
