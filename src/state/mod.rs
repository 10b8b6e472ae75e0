//! Shared crawl state
//!
//! This module holds everything crawl branches write to concurrently.
//!
//! # Components
//!
//! - `VisitedSet`: targets already claimed by a branch (check-and-insert is atomic)
//! - `ProductRecord`: one extracted product
//! - `ResultStore`: owns the visited set, broken links and product map, and
//!   produces the final `CrawlSnapshot`

mod product;
mod store;
mod visited;

// Re-export main types
pub use product::ProductRecord;
pub use store::{CrawlSnapshot, ResultStore};
pub use visited::VisitedSet;
