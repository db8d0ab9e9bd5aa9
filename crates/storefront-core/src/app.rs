//! Storefront application root.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::json;
use storefront_auth::{
    AuthFlow, HttpAuthApi, PendingCart, PendingCartItem, RedirectPolicy, SessionStore, UserRecord,
};
use storefront_commerce::cart::{AddToCartButton, AddToCartReport, CartFlow, HttpCartApi};
use storefront_commerce::catalog::Product;
use storefront_commerce::recently_viewed::{RecentlyViewed, RecentlyViewedEntry};
use storefront_commerce::reviews::{HttpReviewApi, ReviewApi, ReviewPanel};
use storefront_commerce::tracking::{EventType, InteractionTracker};
use storefront_commerce::{CommerceError, ProductId};
use storefront_events::{Clock, EventBus, ToastBus, ToastCenter, TokioClock};
use storefront_fetch::{FetchClient, ReqwestTransport, Transport};
use storefront_store::{FileStore, KeyValueStore, TypedStore};
use tokio::task::JoinHandle;

use crate::config::StorefrontConfig;

/// Builder for a [`Storefront`].
///
/// # Example
///
/// ```rust,ignore
/// let shop = Storefront::builder(config)
///     .with_store(Arc::new(MemoryStore::new()))
///     .build()?;
/// let _driver = shop.spawn_toast_driver();
/// ```
pub struct StorefrontBuilder {
    config: StorefrontConfig,
    store: Option<Arc<dyn KeyValueStore>>,
    transport: Option<Arc<dyn Transport>>,
    clock: Option<Arc<dyn Clock>>,
}

impl StorefrontBuilder {
    /// Use this key-value store instead of the configured file.
    pub fn with_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Use this transport instead of `reqwest`.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Use this clock for toasts and button confirmations.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Wire everything together.
    pub fn build(self) -> Result<Storefront> {
        let config = self.config;

        let backend: Arc<dyn KeyValueStore> = match self.store {
            Some(store) => store,
            None => {
                let path = config.storage.path();
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create storage directory: {}", parent.display())
                    })?;
                }
                Arc::new(
                    FileStore::open(&path)
                        .with_context(|| format!("Failed to open storage: {}", path.display()))?,
                )
            }
        };
        let store = TypedStore::new(backend);

        let transport = self.transport.unwrap_or_else(|| {
            Arc::new(ReqwestTransport::new().with_timeout(config.api.timeout()))
        });
        let clock = self.clock.unwrap_or_else(|| Arc::new(TokioClock::new()));

        let sessions = SessionStore::new(store.clone());
        let client = FetchClient::with_transport(transport)
            .with_base_url(config.api.base_url.clone())
            .with_default_header("Accept", "application/json")
            .with_token_provider(Arc::new(sessions.clone()));

        let events = EventBus::default();
        let toasts = ToastCenter::new(
            ToastBus::new(clock.clone())
                .with_default_duration(Duration::from_millis(config.toasts.default_duration_ms))
                .with_grace(Duration::from_millis(config.toasts.grace_ms)),
        );

        let recently_viewed =
            RecentlyViewed::new(store.clone()).with_max_entries(config.recently_viewed.max_entries);

        let cart = Arc::new(
            CartFlow::new(Arc::new(HttpCartApi::new(client.clone())), events.clone())
                .with_default_max_quantity(config.cart.default_max_quantity)
                .with_batch_add(config.cart.batch_add),
        );

        let pending = PendingCart::new(store.clone());
        let auth = AuthFlow::new(
            Arc::new(HttpAuthApi::new(client.clone())),
            sessions.clone(),
            pending.clone(),
            cart.clone(),
            events.clone(),
        )
        .with_redirects(RedirectPolicy::new(
            config.auth.role_redirects.clone(),
            config.auth.default_redirect.clone(),
        ));

        tracing::debug!(base_url = %config.api.base_url, "storefront ready");

        Ok(Storefront {
            reviews: Arc::new(HttpReviewApi::new(client.clone())),
            tracker: InteractionTracker::new(client.clone()),
            config,
            client,
            events,
            toasts,
            clock,
            recently_viewed,
            sessions,
            pending,
            cart,
            auth,
        })
    }
}

/// The storefront client: one per application.
pub struct Storefront {
    config: StorefrontConfig,
    client: FetchClient,
    events: EventBus,
    toasts: ToastCenter,
    clock: Arc<dyn Clock>,
    recently_viewed: RecentlyViewed,
    sessions: SessionStore,
    pending: PendingCart,
    cart: Arc<CartFlow>,
    auth: AuthFlow,
    reviews: Arc<dyn ReviewApi>,
    tracker: InteractionTracker,
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("config", &self.config)
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}

impl Storefront {
    /// Start building from a configuration.
    pub fn builder(config: StorefrontConfig) -> StorefrontBuilder {
        StorefrontBuilder {
            config,
            store: None,
            transport: None,
            clock: None,
        }
    }

    pub fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    pub fn client(&self) -> &FetchClient {
        &self.client
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn toasts(&self) -> &ToastCenter {
        &self.toasts
    }

    pub fn recently_viewed(&self) -> &RecentlyViewed {
        &self.recently_viewed
    }

    pub fn cart(&self) -> &CartFlow {
        &self.cart
    }

    pub fn auth(&self) -> &AuthFlow {
        &self.auth
    }

    pub fn tracker(&self) -> &InteractionTracker {
        &self.tracker
    }

    /// The logged-in user, if any.
    pub fn current_user(&self) -> Option<UserRecord> {
        self.sessions.session().map(|s| s.user)
    }

    /// Run the toast driver on the current runtime.
    pub fn spawn_toast_driver(&self) -> JoinHandle<()> {
        tokio::spawn(self.toasts.clone().run(self.events.subscribe()))
    }

    /// Recently viewed entries, capped at the configured display limit.
    pub fn recent_products(&self) -> Vec<RecentlyViewedEntry> {
        self.recently_viewed
            .get(self.config.recently_viewed.display_limit)
    }

    /// Record that a product page was opened.
    pub async fn view_product(&self, product: &Product) {
        self.recently_viewed.add(product);
        let user = self.current_user();
        self.tracker
            .track(
                &product.id,
                user.as_ref().map(|u| &u.user_id),
                EventType::View,
                json!({ "category": product.category }),
            )
            .await;
    }

    /// A review panel for the current user.
    pub fn review_panel(&self) -> ReviewPanel {
        ReviewPanel::new(self.reviews.clone(), self.events.clone())
            .with_user(self.current_user().map(|u| u.user_id))
    }

    /// An add-to-cart button using the configured confirmation time.
    pub fn add_to_cart_button(&self) -> AddToCartButton {
        AddToCartButton::new(self.clock.clone())
            .with_confirmation(Duration::from_millis(self.config.cart.confirmation_ms))
    }

    /// Add a product to the cart as the current user (or as a guest).
    pub async fn add_to_cart(
        &self,
        product: &Product,
        size: Option<&str>,
        quantity: i64,
    ) -> Result<AddToCartReport, CommerceError> {
        let user = self.current_user();
        let user_id = user.as_ref().map(|u| &u.user_id);
        let report = self.cart.add_to_cart(product, size, quantity, user_id).await?;
        self.tracker
            .track(
                &product.id,
                user_id,
                EventType::AddToCart,
                json!({ "quantity": report.added, "size": size }),
            )
            .await;
        Ok(report)
    }

    /// Remember a product to add once the shopper has logged in.
    pub fn remember_for_login(&self, product_id: ProductId, quantity: u32, size: Option<&str>) {
        let mut item = PendingCartItem::new(product_id, quantity.max(1));
        if let Some(size) = size {
            item = item.with_size(size);
        }
        if let Err(e) = self.pending.stash(&item) {
            tracing::warn!(error = %e, "failed to remember cart item for login");
        }
    }
}
