//! Product catalog module.
//!
//! Contains the product type as served by the backend and list filtering.

mod filter;
mod product;

pub use filter::{filter_products, Filter, ProductSort};
pub use product::{format_price, Product, DEFAULT_MAX_QUANTITY};
