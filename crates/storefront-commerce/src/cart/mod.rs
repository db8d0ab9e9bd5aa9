//! Add-to-cart flow.
//!
//! The cart itself lives on the server; the client only posts additions.

mod api;
mod button;
mod flow;

pub use api::{AddToCartRequest, AddToCartResponse, CartApi, HttpCartApi};
pub use button::{AddToCartButton, ButtonState, DEFAULT_CONFIRMATION};
pub use flow::{AddToCartReport, CartFlow};
