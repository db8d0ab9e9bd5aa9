//! Product list filtering and sorting.

use crate::catalog::Product;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A product list filter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Filter {
    /// Filter by category (case-insensitive).
    Category(String),
    /// Filter by tag.
    Tag(String),
    /// Filter by any of several tags (OR).
    Tags(Vec<String>),
    /// Filter by price range (inclusive).
    PriceRange { min: Option<f64>, max: Option<f64> },
    /// Only show in-stock items.
    InStock,
    /// Filter by minimum rating.
    Rating { min: f64 },
    /// Case-insensitive search in name, category and tags.
    Text(String),
}

impl Filter {
    /// Create a category filter.
    pub fn category(category: impl Into<String>) -> Self {
        Filter::Category(category.into())
    }

    /// Create a tag filter.
    pub fn tag(tag: impl Into<String>) -> Self {
        Filter::Tag(tag.into())
    }

    /// Create a price range filter.
    pub fn price_range(min: Option<f64>, max: Option<f64>) -> Self {
        Filter::PriceRange { min, max }
    }

    /// Create a text search filter.
    pub fn text(query: impl Into<String>) -> Self {
        Filter::Text(query.into())
    }

    /// Check whether a product passes this filter.
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            Filter::Category(category) => product.category.eq_ignore_ascii_case(category),
            Filter::Tag(tag) => product.has_tag(tag),
            Filter::Tags(tags) => tags.iter().any(|t| product.has_tag(t)),
            Filter::PriceRange { min, max } => {
                min.map_or(true, |m| product.new_price >= m)
                    && max.map_or(true, |m| product.new_price <= m)
            }
            Filter::InStock => product.is_in_stock(),
            Filter::Rating { min } => product.rating.map_or(false, |r| r >= *min),
            Filter::Text(query) => {
                let query = query.trim().to_lowercase();
                if query.is_empty() {
                    return true;
                }
                product.name.to_lowercase().contains(&query)
                    || product.category.to_lowercase().contains(&query)
                    || product.tags.iter().any(|t| t.to_lowercase().contains(&query))
            }
        }
    }
}

/// Sort orders for product lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    /// Keep the order the backend returned.
    #[default]
    Featured,
    PriceAsc,
    PriceDesc,
    /// Highest rated first; unrated last.
    Rating,
    Name,
}

impl ProductSort {
    fn compare(&self, a: &Product, b: &Product) -> Ordering {
        match self {
            ProductSort::Featured => Ordering::Equal,
            ProductSort::PriceAsc => a.new_price.total_cmp(&b.new_price),
            ProductSort::PriceDesc => b.new_price.total_cmp(&a.new_price),
            ProductSort::Rating => {
                let ra = a.rating.unwrap_or(f64::NEG_INFINITY);
                let rb = b.rating.unwrap_or(f64::NEG_INFINITY);
                rb.total_cmp(&ra)
            }
            ProductSort::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        }
    }
}

/// Apply all `filters` (AND) and then `sort`. Sorting is stable.
pub fn filter_products<'a>(
    products: &'a [Product],
    filters: &[Filter],
    sort: ProductSort,
) -> Vec<&'a Product> {
    let mut matched: Vec<&Product> = products
        .iter()
        .filter(|p| filters.iter().all(|f| f.matches(p)))
        .collect();
    matched.sort_by(|a, b| sort.compare(a, b));
    matched
}
