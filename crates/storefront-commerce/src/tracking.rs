//! Product interaction tracking for recommendations.

use std::fmt;

use serde::Serialize;
use serde_json::{json, Value};
use storefront_fetch::FetchClient;

use crate::ids::{ProductId, UserId};

/// Kind of interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    View,
    AddToCart,
    Wishlist,
    Purchase,
    Review,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::View => "view",
            EventType::AddToCart => "add_to_cart",
            EventType::Wishlist => "wishlist",
            EventType::Purchase => "purchase",
            EventType::Review => "review",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fire-and-forget interaction reporter.
#[derive(Debug, Clone)]
pub struct InteractionTracker {
    client: FetchClient,
}

impl InteractionTracker {
    pub fn new(client: FetchClient) -> Self {
        Self { client }
    }

    /// Report an interaction. Failures are logged and swallowed.
    pub async fn track(
        &self,
        product_id: &ProductId,
        user_id: Option<&UserId>,
        event_type: EventType,
        metadata: Value,
    ) {
        let body = json!({
            "productId": product_id,
            "userId": user_id,
            "eventType": event_type,
            "metadata": metadata,
        });
        let result = match self.client.post("/interactions/track").json(&body) {
            Ok(builder) => builder
                .send()
                .await
                .and_then(|response| response.error_for_status()),
            Err(e) => Err(e),
        };
        match result {
            Ok(_) => tracing::debug!(%product_id, %event_type, "interaction tracked"),
            Err(e) => tracing::warn!(%product_id, %event_type, error = %e, "failed to track interaction"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use storefront_fetch::mock::MockTransport;
    use storefront_fetch::{FetchError, Method};

    #[tokio::test]
    async fn test_track_posts_event() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(Method::Post, "/interactions/track", 200, json!({"success": true}));
        let tracker = InteractionTracker::new(
            FetchClient::with_transport(mock.clone()).with_base_url("http://api.test"),
        );

        tracker
            .track(
                &ProductId::new("9"),
                Some(&UserId::new("u1")),
                EventType::AddToCart,
                json!({"quantity": 2}),
            )
            .await;

        let body = mock
            .last(Method::Post, "/interactions/track")
            .and_then(|r| r.body_json())
            .unwrap();
        assert_eq!(body["eventType"], "add_to_cart");
        assert_eq!(body["productId"], "9");
        assert_eq!(body["metadata"]["quantity"], 2);
    }

    #[tokio::test]
    async fn test_track_swallows_failures() {
        let mock = Arc::new(MockTransport::new());
        mock.fail(Method::Post, "/interactions/track", FetchError::Timeout);
        let tracker = InteractionTracker::new(FetchClient::with_transport(mock.clone()));

        tracker
            .track(&ProductId::new("9"), None, EventType::View, Value::Null)
            .await;
        assert_eq!(mock.count(Method::Post, "/interactions/track"), 1);
    }
}
