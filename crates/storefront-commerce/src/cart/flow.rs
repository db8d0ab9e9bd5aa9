//! Add-to-cart orchestration.

use std::sync::Arc;

use storefront_events::EventBus;

use super::api::{AddToCartRequest, CartApi};
use crate::catalog::{Product, DEFAULT_MAX_QUANTITY};
use crate::error::CommerceError;
use crate::ids::{ProductId, UserId};

/// Outcome of a completed add-to-cart run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddToCartReport {
    pub requested: u32,
    pub added: u32,
    /// At least one unit went into a guest cart.
    pub guest: bool,
}

/// Validates and submits cart additions.
///
/// Without batch support each unit is a separate request, sent one after
/// another. The first failure stops the run; units already added stay in the
/// cart and the error reports how many there were.
pub struct CartFlow {
    api: Arc<dyn CartApi>,
    events: EventBus,
    default_max_quantity: u32,
    batch_add: bool,
}

impl std::fmt::Debug for CartFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartFlow")
            .field("default_max_quantity", &self.default_max_quantity)
            .field("batch_add", &self.batch_add)
            .finish_non_exhaustive()
    }
}

impl CartFlow {
    pub fn new(api: Arc<dyn CartApi>, events: EventBus) -> Self {
        Self {
            api,
            events,
            default_max_quantity: DEFAULT_MAX_QUANTITY,
            batch_add: false,
        }
    }

    /// Quantity ceiling for products without a stock count.
    pub fn with_default_max_quantity(mut self, max: u32) -> Self {
        self.default_max_quantity = max.max(1);
        self
    }

    /// Quantity ceiling for products without a stock count.
    pub fn default_max_quantity(&self) -> u32 {
        self.default_max_quantity
    }

    /// Send the whole quantity in one request.
    pub fn with_batch_add(mut self, batch_add: bool) -> Self {
        self.batch_add = batch_add;
        self
    }

    /// Check the selection a shopper made on a product page.
    pub fn validate(
        &self,
        product: &Product,
        size: Option<&str>,
        quantity: i64,
    ) -> Result<u32, CommerceError> {
        if size.map_or(true, |s| s.trim().is_empty()) {
            return Err(CommerceError::SizeRequired);
        }
        if quantity < 1 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }
        let max = product.max_quantity(self.default_max_quantity);
        if quantity > i64::from(max) {
            return Err(CommerceError::QuantityExceedsLimit(quantity, i64::from(max)));
        }
        Ok(quantity as u32)
    }

    /// Validate a product-page selection and add it to the cart.
    pub async fn add_to_cart(
        &self,
        product: &Product,
        size: Option<&str>,
        quantity: i64,
        user: Option<&UserId>,
    ) -> Result<AddToCartReport, CommerceError> {
        let quantity = match self.validate(product, size, quantity) {
            Ok(q) => q,
            Err(e) => {
                self.events.error(e.user_message());
                return Err(e);
            }
        };
        self.add_units(&product.id, size, quantity, user).await
    }

    /// Add `quantity` units of a product. Publishes a toast either way.
    pub async fn add_units(
        &self,
        product_id: &ProductId,
        size: Option<&str>,
        quantity: u32,
        user: Option<&UserId>,
    ) -> Result<AddToCartReport, CommerceError> {
        if quantity == 0 {
            return Err(CommerceError::InvalidQuantity(0));
        }

        let result = if self.batch_add {
            self.send(product_id, size, quantity, user)
                .await
                .map(|guest| AddToCartReport {
                    requested: quantity,
                    added: quantity,
                    guest,
                })
                .map_err(|message| CommerceError::PartialAdd {
                    added: 0,
                    requested: quantity,
                    message,
                })
        } else {
            self.add_sequentially(product_id, size, quantity, user).await
        };

        match &result {
            Ok(report) => {
                tracing::info!(%product_id, added = report.added, guest = report.guest, "added to cart");
                self.events.success(added_message(report.added));
            }
            Err(CommerceError::PartialAdd {
                added,
                requested,
                message,
            }) => {
                tracing::warn!(%product_id, added, requested, %message, "add to cart stopped");
                self.events.error(message.clone());
            }
            Err(e) => {
                self.events.error(e.user_message());
            }
        }
        result
    }

    async fn add_sequentially(
        &self,
        product_id: &ProductId,
        size: Option<&str>,
        quantity: u32,
        user: Option<&UserId>,
    ) -> Result<AddToCartReport, CommerceError> {
        let mut report = AddToCartReport {
            requested: quantity,
            added: 0,
            guest: false,
        };
        for _ in 0..quantity {
            match self.send(product_id, size, 1, user).await {
                Ok(guest) => {
                    report.added += 1;
                    report.guest |= guest;
                }
                Err(message) => {
                    return Err(CommerceError::PartialAdd {
                        added: report.added,
                        requested: quantity,
                        message,
                    })
                }
            }
        }
        Ok(report)
    }

    /// One request. `Ok(is_guest)` or the message to show.
    async fn send(
        &self,
        product_id: &ProductId,
        size: Option<&str>,
        quantity: u32,
        user: Option<&UserId>,
    ) -> Result<bool, String> {
        let request = AddToCartRequest {
            product_id: product_id.clone(),
            size: size.map(str::to_string),
            quantity,
            user_id: user.cloned(),
        };
        match self.api.add(&request).await {
            Ok(response) if response.success => Ok(response.is_guest),
            Ok(response) => Err(response
                .message
                .unwrap_or_else(|| "Failed to add item to cart".to_string())),
            Err(e) => Err(e.user_message()),
        }
    }
}

fn added_message(count: u32) -> String {
    if count == 1 {
        "Item added to cart".to_string()
    } else {
        format!("{} items added to cart", count)
    }
}
