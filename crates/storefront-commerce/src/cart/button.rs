//! Add-to-cart button state.

use std::sync::Arc;
use std::time::Duration;

use storefront_events::Clock;

use super::flow::{AddToCartReport, CartFlow};
use crate::catalog::Product;
use crate::error::CommerceError;
use crate::ids::UserId;

/// How long the "added" confirmation stays up.
pub const DEFAULT_CONFIRMATION: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Idle,
    /// A request is in flight; clicks are ignored.
    Adding,
    /// Confirmation shown until the clock reaches `until`.
    Added { until: Duration },
}

/// Button that drives a [`CartFlow`] and shows a brief confirmation.
///
/// The confirmation reverts lazily: reading the state after the deadline
/// yields `Idle`, so no timer task is needed.
pub struct AddToCartButton {
    clock: Arc<dyn Clock>,
    confirmation: Duration,
    state: ButtonState,
}

impl std::fmt::Debug for AddToCartButton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddToCartButton")
            .field("confirmation", &self.confirmation)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl AddToCartButton {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            confirmation: DEFAULT_CONFIRMATION,
            state: ButtonState::Idle,
        }
    }

    pub fn with_confirmation(mut self, confirmation: Duration) -> Self {
        self.confirmation = confirmation;
        self
    }

    /// Current state, with an expired confirmation reported as idle.
    pub fn state(&self) -> ButtonState {
        match self.state {
            ButtonState::Added { until } if self.clock.now() >= until => ButtonState::Idle,
            state => state,
        }
    }

    pub fn label(&self) -> &'static str {
        match self.state() {
            ButtonState::Idle => "Add to Cart",
            ButtonState::Adding => "Adding...",
            ButtonState::Added { .. } => "Added!",
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.state() != ButtonState::Adding
    }

    /// Run the add-to-cart flow for the current selection.
    pub async fn click(
        &mut self,
        flow: &CartFlow,
        product: &Product,
        size: Option<&str>,
        quantity: i64,
        user: Option<&UserId>,
    ) -> Result<AddToCartReport, CommerceError> {
        self.state = ButtonState::Adding;
        let result = flow.add_to_cart(product, size, quantity, user).await;
        self.state = match result {
            Ok(_) => ButtonState::Added {
                until: self.clock.now() + self.confirmation,
            },
            Err(_) => ButtonState::Idle,
        };
        result
    }
}
