//! Cart API client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use storefront_fetch::FetchClient;

use crate::error::CommerceError;
use crate::ids::{ProductId, UserId};

/// Body of `POST /cart/add`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddToCartRequest {
    #[serde(rename = "productId")]
    pub product_id: ProductId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    pub quantity: u32,
    #[serde(rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
}

/// Reply from `POST /cart/add`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AddToCartResponse {
    pub success: bool,
    /// The item went into an anonymous cart. Still a success.
    #[serde(rename = "isGuest", default)]
    pub is_guest: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Backend cart endpoint.
#[async_trait]
pub trait CartApi: Send + Sync {
    async fn add(&self, request: &AddToCartRequest) -> Result<AddToCartResponse, CommerceError>;
}

/// [`CartApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpCartApi {
    client: FetchClient,
}

impl HttpCartApi {
    pub fn new(client: FetchClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CartApi for HttpCartApi {
    async fn add(&self, request: &AddToCartRequest) -> Result<AddToCartResponse, CommerceError> {
        let response = self
            .client
            .post("/cart/add")
            .json(request)?
            .send_json::<AddToCartResponse>()
            .await?;
        Ok(response)
    }
}
