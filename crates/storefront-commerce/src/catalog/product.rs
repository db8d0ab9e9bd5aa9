//! Product type.

use crate::ids::ProductId;
use serde::{Deserialize, Serialize};

/// Quantity ceiling when a product does not report its stock.
pub const DEFAULT_MAX_QUANTITY: u32 = 10;

/// A product as served by the catalog API. Read-only on the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Primary image URL.
    #[serde(default)]
    pub image: String,
    /// Price before discount, if discounted.
    #[serde(default)]
    pub old_price: Option<f64>,
    /// Current price.
    pub new_price: f64,
    /// Category slug (e.g. "men", "women", "kid").
    #[serde(default)]
    pub category: String,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Average rating (0-5).
    #[serde(default)]
    pub rating: Option<f64>,
    /// Units in stock, when the backend reports it.
    #[serde(default)]
    pub stock: Option<u32>,
}

impl Product {
    /// Upper bound for the quantity selector.
    ///
    /// A missing or zero stock count falls back to `default`.
    pub fn max_quantity(&self, default: u32) -> u32 {
        self.stock.filter(|s| *s > 0).unwrap_or(default)
    }

    /// Whether the product can be added to the cart.
    pub fn is_in_stock(&self) -> bool {
        self.stock.map_or(true, |s| s > 0)
    }

    /// Whole-percent discount off the old price, if any.
    pub fn discount_percent(&self) -> Option<u8> {
        let old = self.old_price?;
        if old <= 0.0 || old <= self.new_price {
            return None;
        }
        Some((((old - self.new_price) / old) * 100.0).round() as u8)
    }

    /// Check whether the product has a tag (case-insensitive).
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Formatted current price.
    pub fn price_display(&self) -> String {
        format_price(self.new_price)
    }
}

/// Format a price as dollars.
pub fn format_price(amount: f64) -> String {
    format!("${:.2}", amount)
}
