//! URL handling module
//!
//! Helpers for deciding which hrefs are crawl targets, turning targets into
//! absolute URLs, and recognizing product pages.

mod product;
mod target;

// Re-export main functions
pub use product::{name_from_slug, product_key, product_slug};
pub use target::{is_crawlable_href, resolve_target};
