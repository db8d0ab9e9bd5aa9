//! Application root for the storefront client.
//!
//! Loads [`StorefrontConfig`], sets up logging and wires the store, HTTP
//! client, event bus and flows into a single [`Storefront`].

pub mod app;
pub mod config;
pub mod logging;

pub use app::{Storefront, StorefrontBuilder};
pub use config::{generate_default_config, StorefrontConfig};
pub use logging::init_logging;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{init_logging, Storefront, StorefrontConfig};
    pub use storefront_auth::prelude::*;
    pub use storefront_commerce::prelude::*;
    pub use storefront_events::prelude::*;
}
