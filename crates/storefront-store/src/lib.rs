//! Typed key-value storage for the storefront client.
//!
//! Mirrors the browser's local storage: string keys, string values, synchronous
//! access. [`TypedStore`] layers versioned JSON records on top so that a change
//! in a stored shape goes through an explicit migration instead of failing to
//! parse.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use storefront_store::{MemoryStore, StoredRecord, TypedStore};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Prefs {
//!     currency: String,
//! }
//!
//! impl StoredRecord for Prefs {
//!     const KEY: &'static str = "prefs";
//!     const VERSION: u32 = 1;
//! }
//!
//! let store = TypedStore::new(Arc::new(MemoryStore::new()));
//! store.save(&Prefs { currency: "USD".into() })?;
//! let prefs: Option<Prefs> = store.load()?;
//! ```

mod error;
mod kv;
mod typed;

pub use error::StoreError;
pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use typed::{StoredRecord, TypedStore};

/// Storage keys shared with the web storefront.
pub mod keys {
    /// Most-recent-first list of viewed products.
    pub const RECENTLY_VIEWED: &str = "recentlyViewed";
    /// Bearer token of the current session.
    pub const AUTH_TOKEN: &str = "auth-token";
    /// JSON user record of the current session.
    pub const USER: &str = "user";
    /// `"true"` while a session exists.
    pub const IS_LOGGED_IN: &str = "isLoggedIn";
    /// Cart addition queued before login, consumed once.
    pub const PENDING_CART_ITEM: &str = "pendingCartItem";
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{KeyValueStore, MemoryStore, StoreError, StoredRecord, TypedStore};
}
