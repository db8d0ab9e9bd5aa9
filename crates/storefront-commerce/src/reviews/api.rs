//! Reviews API client.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use storefront_fetch::{encode_component, ClientRequestBuilder, FetchClient};

use super::model::{NewReview, Review, ReviewSort, ReviewStats, VoteType};
use crate::error::CommerceError;
use crate::ids::{ProductId, ReviewId, UserId};

/// Page size sent with list requests.
pub const DEFAULT_REVIEW_LIMIT: u32 = 20;

/// Backend reviews endpoints.
#[async_trait]
pub trait ReviewApi: Send + Sync {
    /// Reviews for a product, sorted by the server.
    async fn list(
        &self,
        product_id: &ProductId,
        sort: ReviewSort,
        limit: u32,
    ) -> Result<Vec<Review>, CommerceError>;

    /// Aggregate statistics for a product.
    async fn stats(&self, product_id: &ProductId) -> Result<ReviewStats, CommerceError>;

    /// Post a new review.
    async fn create(&self, review: &NewReview) -> Result<(), CommerceError>;

    /// Record a helpfulness vote.
    async fn vote(&self, review_id: &ReviewId, vote: VoteType) -> Result<(), CommerceError>;

    /// Delete a review on behalf of its author.
    async fn delete(&self, review_id: &ReviewId, user_id: &UserId) -> Result<(), CommerceError>;
}

/// Response wrapper used by the reviews endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    #[serde(default)]
    pub success: Option<bool>,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// Turn an explicit `success: false` into an error.
    pub fn into_data(self) -> Result<Option<T>, CommerceError> {
        if self.success == Some(false) {
            return Err(CommerceError::Api(
                self.message
                    .unwrap_or_else(|| "Request failed".to_string()),
            ));
        }
        Ok(self.data)
    }
}

/// [`ReviewApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpReviewApi {
    client: FetchClient,
}

impl HttpReviewApi {
    pub fn new(client: FetchClient) -> Self {
        Self { client }
    }

    async fn expect_ok(builder: ClientRequestBuilder) -> Result<(), CommerceError> {
        Self::read::<serde_json::Value>(builder).await.map(|_| ())
    }

    async fn read<T: DeserializeOwned>(
        builder: ClientRequestBuilder,
    ) -> Result<Option<T>, CommerceError> {
        let envelope: Envelope<T> = builder.send_json().await?;
        envelope.into_data()
    }
}

#[async_trait]
impl ReviewApi for HttpReviewApi {
    async fn list(
        &self,
        product_id: &ProductId,
        sort: ReviewSort,
        limit: u32,
    ) -> Result<Vec<Review>, CommerceError> {
        let url = format!("/reviews/{}", encode_component(product_id.as_str()));
        let builder = self
            .client
            .get(url)
            .query("sortBy", sort.as_query())
            .query("limit", limit);
        let reviews = Self::read::<Vec<Review>>(builder).await?.unwrap_or_default();
        tracing::debug!(%product_id, count = reviews.len(), "loaded reviews");
        Ok(reviews)
    }

    async fn stats(&self, product_id: &ProductId) -> Result<ReviewStats, CommerceError> {
        let url = format!("/reviews/{}/stats", encode_component(product_id.as_str()));
        Ok(Self::read::<ReviewStats>(self.client.get(url))
            .await?
            .unwrap_or_default())
    }

    async fn create(&self, review: &NewReview) -> Result<(), CommerceError> {
        Self::expect_ok(self.client.post("/reviews").json(review)?).await?;
        tracing::info!(product_id = %review.product_id, rating = review.rating, "review posted");
        Ok(())
    }

    async fn vote(&self, review_id: &ReviewId, vote: VoteType) -> Result<(), CommerceError> {
        let url = format!("/reviews/{}/vote", encode_component(review_id.as_str()));
        Self::expect_ok(self.client.post(url).json(&json!({ "voteType": vote }))?).await
    }

    async fn delete(&self, review_id: &ReviewId, user_id: &UserId) -> Result<(), CommerceError> {
        let url = format!("/reviews/{}", encode_component(review_id.as_str()));
        Self::expect_ok(self.client.delete(url).json(&json!({ "userId": user_id }))?).await?;
        tracing::info!(%review_id, "review deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use storefront_fetch::mock::MockTransport;
    use storefront_fetch::Method;

    fn api(mock: &Arc<MockTransport>) -> HttpReviewApi {
        HttpReviewApi::new(FetchClient::with_transport(mock.clone()).with_base_url("http://api.test"))
    }

    #[tokio::test]
    async fn test_list_sends_sort_and_limit() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(
            Method::Get,
            "/reviews/42",
            200,
            json!({"success": true, "data": [
                {"_id": "r1", "userId": "u1", "rating": 5, "comment": "Great"}
            ]}),
        );

        let reviews = api(&mock)
            .list(&ProductId::new("42"), ReviewSort::HighestRating, 20)
            .await
            .unwrap();

        assert_eq!(reviews.len(), 1);
        let request = mock.last(Method::Get, "/reviews/42").unwrap();
        assert_eq!(request.query_param("sortBy"), Some("highest"));
        assert_eq!(request.query_param("limit"), Some("20"));
    }

    #[tokio::test]
    async fn test_unsuccessful_envelope_surfaces_message() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(
            Method::Post,
            "/reviews/r1/vote",
            200,
            json!({"success": false, "message": "Already voted"}),
        );

        let err = api(&mock)
            .vote(&ReviewId::new("r1"), VoteType::Upvote)
            .await
            .unwrap_err();
        assert!(matches!(err, CommerceError::Api(ref m) if m == "Already voted"));
    }

    #[test]
    fn test_envelope_data_is_optional_for_any_payload() {
        let envelope: Envelope<Review> = serde_json::from_value(json!({"success": true})).unwrap();
        assert!(envelope.into_data().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stats_without_data_are_empty() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(Method::Get, "/reviews/3/stats", 200, json!({"success": true}));

        let stats = api(&mock).stats(&ProductId::new("3")).await.unwrap();
        assert_eq!(stats.total_reviews, 0);
        assert_eq!(stats.percentage(5), 0.0);
    }

    #[tokio::test]
    async fn test_http_error_maps_to_fetch_error() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(Method::Get, "/reviews/7/stats", 500, json!({"message": "boom"}));

        let err = api(&mock).stats(&ProductId::new("7")).await.unwrap_err();
        assert_eq!(err.user_message(), "boom");
    }

    #[tokio::test]
    async fn test_delete_sends_user_id() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(Method::Delete, "/reviews/r9", 200, json!({"success": true}));

        api(&mock)
            .delete(&ReviewId::new("r9"), &UserId::new("u3"))
            .await
            .unwrap();

        let request = mock.last(Method::Delete, "/reviews/r9").unwrap();
        assert_eq!(request.body_json().unwrap(), json!({"userId": "u3"}));
    }
}
