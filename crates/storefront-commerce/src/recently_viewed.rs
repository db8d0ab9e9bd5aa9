//! Recently viewed products.
//!
//! A most-recent-first list kept in storage under `recentlyViewed`. Every
//! operation reads and rewrites the whole list. Storage failures never reach
//! the caller: they are logged and the list reads as empty.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use storefront_store::{keys, StoreError, StoredRecord, TypedStore};

use crate::catalog::Product;
use crate::ids::ProductId;

/// Stored list length cap.
pub const MAX_RECENTLY_VIEWED: usize = 20;

/// Default number of entries a "recently viewed" strip shows.
pub const DEFAULT_DISPLAY_LIMIT: usize = 10;

/// A product snapshot taken when it was viewed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentlyViewedEntry {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub image: String,
    pub new_price: f64,
    #[serde(default)]
    pub old_price: Option<f64>,
    #[serde(default)]
    pub category: String,
    /// Epoch milliseconds.
    #[serde(rename = "viewedAt")]
    pub viewed_at: i64,
}

impl RecentlyViewedEntry {
    fn from_product(product: &Product, viewed_at: i64) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            image: product.image.clone(),
            new_price: product.new_price,
            old_price: product.old_price,
            category: product.category.clone(),
            viewed_at,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
struct RecentlyViewedList(Vec<RecentlyViewedEntry>);

impl StoredRecord for RecentlyViewedList {
    const KEY: &'static str = keys::RECENTLY_VIEWED;
    const VERSION: u32 = 1;

    fn migrate(from: u32, data: Value) -> Result<Value, StoreError> {
        match from {
            // The unversioned list has the same entry shape.
            0 => Ok(data),
            _ => Err(StoreError::UnsupportedVersion {
                key: Self::KEY,
                found: from,
                expected: Self::VERSION,
            }),
        }
    }
}

/// Tracker for recently viewed products.
#[derive(Debug, Clone)]
pub struct RecentlyViewed {
    store: TypedStore,
    max_entries: usize,
}

impl RecentlyViewed {
    /// Create a tracker with the default cap.
    pub fn new(store: TypedStore) -> Self {
        Self {
            store,
            max_entries: MAX_RECENTLY_VIEWED,
        }
    }

    /// Override the stored length cap.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries.max(1);
        self
    }

    fn load(&self) -> Vec<RecentlyViewedEntry> {
        match self.store.load::<RecentlyViewedList>() {
            Ok(list) => list.map(|l| l.0).unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "recently viewed list unreadable; treating as empty");
                Vec::new()
            }
        }
    }

    fn save(&self, entries: Vec<RecentlyViewedEntry>) {
        if let Err(e) = self.store.save(&RecentlyViewedList(entries)) {
            tracing::warn!(error = %e, "failed to persist recently viewed list");
        }
    }

    /// Record a product view: move it to the front and trim to the cap.
    pub fn add(&self, product: &Product) {
        self.add_at(product, Utc::now().timestamp_millis());
    }

    fn add_at(&self, product: &Product, viewed_at: i64) {
        let mut entries = self.load();
        entries.retain(|e| e.id != product.id);
        entries.insert(0, RecentlyViewedEntry::from_product(product, viewed_at));
        entries.truncate(self.max_entries);
        tracing::debug!(product_id = %product.id, len = entries.len(), "recorded product view");
        self.save(entries);
    }

    /// Up to `limit` most recent entries.
    pub fn get(&self, limit: usize) -> Vec<RecentlyViewedEntry> {
        let mut entries = self.load();
        entries.truncate(limit);
        entries
    }

    /// Every stored entry.
    pub fn all(&self) -> Vec<RecentlyViewedEntry> {
        self.load()
    }

    /// Drop one product from the list. Returns whether it was present.
    pub fn remove(&self, id: &ProductId) -> bool {
        let mut entries = self.load();
        let before = entries.len();
        entries.retain(|e| &e.id != id);
        let removed = entries.len() != before;
        if removed {
            self.save(entries);
        }
        removed
    }

    /// Forget every entry.
    pub fn clear(&self) {
        if let Err(e) = self.store.remove::<RecentlyViewedList>() {
            tracing::warn!(error = %e, "failed to clear recently viewed list");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use storefront_store::{KeyValueStore, MemoryStore};

    fn product(id: u64) -> Product {
        Product {
            id: ProductId::from(id),
            name: format!("Product {}", id),
            image: format!("https://cdn.test/{}.png", id),
            old_price: Some(100.0),
            new_price: 80.0,
            category: "men".to_string(),
            tags: vec![],
            rating: None,
            stock: None,
        }
    }

    fn tracker() -> (Arc<MemoryStore>, RecentlyViewed) {
        let backend = Arc::new(MemoryStore::new());
        let store = TypedStore::new(backend.clone());
        (backend, RecentlyViewed::new(store))
    }

    fn ids(entries: &[RecentlyViewedEntry]) -> Vec<String> {
        entries.iter().map(|e| e.id.to_string()).collect()
    }

    #[test]
    fn test_add_then_get_one() {
        let (_, rv) = tracker();
        rv.add(&product(7));

        let entries = rv.get(1);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id.as_str(), "7");
        assert_eq!(entries[0].name, "Product 7");
        assert_eq!(entries[0].new_price, 80.0);
    }

    #[test]
    fn test_re_adding_moves_to_front_without_duplicate() {
        let (_, rv) = tracker();
        rv.add_at(&product(1), 1);
        rv.add_at(&product(2), 2);
        rv.add_at(&product(3), 3);
        rv.add_at(&product(1), 4);

        let entries = rv.all();
        assert_eq!(ids(&entries), vec!["1", "3", "2"]);
        assert_eq!(entries[0].viewed_at, 4);
    }

    #[test]
    fn test_length_capped_at_twenty() {
        let (_, rv) = tracker();
        for id in 0..30 {
            rv.add(&product(id));
        }
        let entries = rv.all();
        assert_eq!(entries.len(), MAX_RECENTLY_VIEWED);
        assert_eq!(entries[0].id.as_str(), "29");
        assert_eq!(entries[19].id.as_str(), "10");
    }

    #[test]
    fn test_get_respects_limit() {
        let (_, rv) = tracker();
        for id in 0..5 {
            rv.add(&product(id));
        }
        assert_eq!(ids(&rv.get(3)), vec!["4", "3", "2"]);
        assert_eq!(rv.get(50).len(), 5);
    }

    #[test]
    fn test_remove_and_clear() {
        let (backend, rv) = tracker();
        rv.add(&product(1));
        rv.add(&product(2));

        assert!(rv.remove(&ProductId::from(1u64)));
        assert!(!rv.remove(&ProductId::from(1u64)));
        assert_eq!(ids(&rv.all()), vec!["2"]);

        rv.clear();
        assert!(rv.all().is_empty());
        assert!(backend.get(keys::RECENTLY_VIEWED).unwrap().is_none());
    }

    #[test]
    fn test_corrupt_storage_reads_as_empty_and_recovers() {
        let (backend, rv) = tracker();
        backend.set(keys::RECENTLY_VIEWED, "{not json").unwrap();

        assert!(rv.get(10).is_empty());
        rv.add(&product(5));
        assert_eq!(ids(&rv.all()), vec!["5"]);
    }

    #[test]
    fn test_reads_unversioned_list() {
        let (backend, rv) = tracker();
        backend
            .set(
                keys::RECENTLY_VIEWED,
                r#"[{"id":3,"name":"Old","image":"o.png","new_price":10,"old_price":12,"category":"kid","viewedAt":1700000000000}]"#,
            )
            .unwrap();

        let entries = rv.all();
        assert_eq!(ids(&entries), vec!["3"]);
        assert_eq!(entries[0].viewed_at, 1_700_000_000_000);
    }

    #[test]
    fn test_custom_cap() {
        let (_, rv) = tracker();
        let rv = rv.with_max_entries(2);
        for id in 0..4 {
            rv.add(&product(id));
        }
        assert_eq!(ids(&rv.all()), vec!["3", "2"]);
    }
}
