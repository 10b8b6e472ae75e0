use crate::state::{ProductRecord, VisitedSet};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, PoisonError};

/// Point-in-time copy of everything a crawl produced
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CrawlSnapshot {
    /// Product records keyed by product id
    pub products: BTreeMap<String, ProductRecord>,

    /// Targets that resolved to HTTP 404, sorted
    pub broken_links: Vec<String>,
}

/// Shared crawl state: visited targets, broken links and product records
///
/// One store is created per run and handed to every component that needs it.
/// All mutations are single inserts or overwrites, each under its own lock.
#[derive(Debug, Default)]
pub struct ResultStore {
    visited: VisitedSet,
    broken_links: Mutex<BTreeSet<String>>,
    products: Mutex<BTreeMap<String, ProductRecord>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The set of targets already scheduled or crawled
    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    /// Records a target that returned 404
    pub fn record_broken_link(&self, target: &str) {
        self.broken_links
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(target.to_string());
    }

    pub fn is_broken(&self, target: &str) -> bool {
        self.broken_links
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(target)
    }

    /// Stores a product record, replacing any earlier record with the same id
    pub fn upsert_product(&self, id: &str, record: ProductRecord) {
        self.products
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.to_string(), record);
    }

    pub fn product(&self, id: &str) -> Option<ProductRecord> {
        self.products
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    pub fn product_count(&self) -> usize {
        self.products
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn broken_link_count(&self) -> usize {
        self.broken_links
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Copies out the products and broken links
    ///
    /// Meant to be called once every crawl branch has settled; no consistency
    /// is promised between the two collections while a crawl is running.
    pub fn snapshot(&self) -> CrawlSnapshot {
        let products = self
            .products
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let broken_links = self
            .broken_links
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect();

        CrawlSnapshot {
            products,
            broken_links,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broken_links_are_deduplicated_and_sorted() {
        let store = ResultStore::new();
        store.record_broken_link("/products/999");
        store.record_broken_link("/a");
        store.record_broken_link("/products/999");

        let snapshot = store.snapshot();
        assert_eq!(snapshot.broken_links, vec!["/a", "/products/999"]);
        assert!(store.is_broken("/a"));
    }

    #[test]
    fn test_upsert_overwrites_same_id() {
        let store = ResultStore::new();
        store.upsert_product("1", ProductRecord::named("first"));
        store.upsert_product("1", ProductRecord::named("second"));

        assert_eq!(store.product_count(), 1);
        assert_eq!(store.product("1").unwrap().name, "second");
    }

    #[test]
    fn test_identical_upsert_is_idempotent() {
        let store = ResultStore::new();
        let record = ProductRecord {
            name: "Organic Milk".to_string(),
            price: Some(45),
            brand: Some("Tine".to_string()),
            unit_price: None,
            description: None,
        };

        store.upsert_product("42", record.clone());
        let first = store.snapshot();
        store.upsert_product("42", record);
        let second = store.snapshot();

        assert_eq!(first, second);
    }

    #[test]
    fn test_snapshot_serializes() {
        let store = ResultStore::new();
        store.record_broken_link("/gone");
        let json = serde_json::to_string(&store.snapshot()).unwrap();
        assert_eq!(json, r#"{"products":{},"broken_links":["/gone"]}"#);
    }
}
