//! Cart item remembered while the shopper logs in.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use storefront_commerce::ids::ProductId;
use storefront_store::{keys, StoreError, StoredRecord, TypedStore};

/// A product the shopper tried to add before logging in.
///
/// Older pages stored just the product id, as a number or a string; those
/// read back with a quantity of one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingCartItem {
    #[serde(rename = "productId")]
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

impl PendingCartItem {
    pub fn new(product_id: ProductId, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
            size: None,
        }
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }
}

fn one() -> u32 {
    1
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPending {
    Item {
        #[serde(rename = "productId")]
        product_id: ProductId,
        #[serde(default = "one")]
        quantity: u32,
        #[serde(default)]
        size: Option<String>,
    },
    Bare(ProductId),
}

impl<'de> Deserialize<'de> for PendingCartItem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawPending::deserialize(deserializer)? {
            RawPending::Item {
                product_id,
                quantity,
                size,
            } => PendingCartItem {
                product_id,
                quantity: quantity.max(1),
                size,
            },
            RawPending::Bare(product_id) => PendingCartItem::new(product_id, 1),
        })
    }
}

impl StoredRecord for PendingCartItem {
    const KEY: &'static str = keys::PENDING_CART_ITEM;
    const VERSION: u32 = 1;

    fn migrate(from: u32, data: Value) -> Result<Value, StoreError> {
        match from {
            0 => Ok(data),
            _ => Err(StoreError::UnsupportedVersion {
                key: Self::KEY,
                found: from,
                expected: Self::VERSION,
            }),
        }
    }
}

/// Single-slot storage for a [`PendingCartItem`].
#[derive(Debug, Clone)]
pub struct PendingCart {
    store: TypedStore,
}

impl PendingCart {
    pub fn new(store: TypedStore) -> Self {
        Self { store }
    }

    /// Remember an item, replacing any earlier one.
    pub fn stash(&self, item: &PendingCartItem) -> Result<(), StoreError> {
        self.store.save(item)?;
        tracing::debug!(product_id = %item.product_id, quantity = item.quantity, "pending cart item stored");
        Ok(())
    }

    /// Remove and return the stored item. It is gone afterwards even if it
    /// could not be read.
    pub fn take(&self) -> Option<PendingCartItem> {
        match self.store.take::<PendingCartItem>() {
            Ok(item) => item,
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable pending cart item");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use storefront_store::{KeyValueStore, MemoryStore};

    fn pending() -> (Arc<MemoryStore>, PendingCart) {
        let backend = Arc::new(MemoryStore::new());
        (backend.clone(), PendingCart::new(TypedStore::new(backend)))
    }

    #[test]
    fn test_structured_item() {
        let (backend, pending) = pending();
        backend
            .set(keys::PENDING_CART_ITEM, r#"{"productId":"42","quantity":2}"#)
            .unwrap();
        assert_eq!(
            pending.take(),
            Some(PendingCartItem::new(ProductId::new("42"), 2))
        );
    }

    #[test]
    fn test_bare_id_forms() {
        let (backend, pending) = pending();
        for raw in [r#""42""#, "42"] {
            backend.set(keys::PENDING_CART_ITEM, raw).unwrap();
            assert_eq!(
                pending.take(),
                Some(PendingCartItem::new(ProductId::new("42"), 1)),
                "raw value {}",
                raw
            );
        }
    }

    #[test]
    fn test_taken_once() {
        let (_, pending) = pending();
        pending
            .stash(&PendingCartItem::new(ProductId::new("7"), 3).with_size("M"))
            .unwrap();

        let item = pending.take().unwrap();
        assert_eq!(item.size.as_deref(), Some("M"));
        assert!(pending.take().is_none());
    }

    #[test]
    fn test_unreadable_item_is_dropped() {
        let (backend, pending) = pending();
        backend.set(keys::PENDING_CART_ITEM, r#"{"quantity":2}"#).unwrap();
        assert!(pending.take().is_none());
        assert!(backend.get(keys::PENDING_CART_ITEM).unwrap().is_none());
    }
}
