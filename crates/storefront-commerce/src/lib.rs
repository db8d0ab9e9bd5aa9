//! Storefront domain logic for the client.
//!
//! - **Catalog**: products as served by the backend, filtering and sorting
//! - **Recently viewed**: a capped, most-recent-first history in local storage
//! - **Reviews**: review list and statistics panel, votes, deletion, posting
//! - **Cart**: validated add-to-cart with explicit partial-failure reporting
//! - **Tracking**: fire-and-forget interaction events
//!
//! # Example
//!
//! ```rust,ignore
//! use storefront_commerce::prelude::*;
//!
//! let recent = RecentlyViewed::new(store);
//! recent.add(&product);
//!
//! let flow = CartFlow::new(Arc::new(HttpCartApi::new(client)), events);
//! let report = flow.add_to_cart(&product, Some("M"), 2, None).await?;
//! println!("added {} of {}", report.added, report.requested);
//! ```

pub mod error;
pub mod ids;

pub mod cart;
pub mod catalog;
pub mod recently_viewed;
pub mod reviews;
pub mod tracking;
pub mod view_state;

pub use error::CommerceError;
pub use ids::*;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::*;

    // Catalog
    pub use crate::catalog::{filter_products, format_price, Filter, Product, ProductSort};

    // Recently viewed
    pub use crate::recently_viewed::{RecentlyViewed, RecentlyViewedEntry};

    // Reviews
    pub use crate::reviews::{
        HttpReviewApi, NewReview, RatingBar, Review, ReviewApi, ReviewPanel, ReviewSort,
        ReviewStats, VoteType,
    };

    // Cart
    pub use crate::cart::{AddToCartButton, AddToCartReport, CartApi, CartFlow, HttpCartApi};

    // Tracking
    pub use crate::tracking::{EventType, InteractionTracker};
}
