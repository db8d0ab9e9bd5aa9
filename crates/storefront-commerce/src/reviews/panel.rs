//! Review panel view model.
//!
//! Holds the review list and statistics for one product. Every change of
//! product, sort order or refresh signal re-fetches both from the server;
//! votes and deletions re-fetch instead of patching local state.

use std::future::Future;
use std::sync::Arc;

use storefront_events::{AppEvent, EventBus};

use super::api::{ReviewApi, DEFAULT_REVIEW_LIMIT};
use super::model::{NewReview, RatingBar, Review, ReviewSort, ReviewStats, VoteType};
use crate::error::CommerceError;
use crate::ids::{ProductId, ReviewId, UserId};
use crate::view_state::{ViewHandle, ViewState};

/// Observable state of a [`ReviewPanel`].
#[derive(Debug, Clone, Default)]
pub struct ReviewPanelState {
    pub product_id: Option<ProductId>,
    pub sort: ReviewSort,
    /// Bumped to force a re-fetch with unchanged parameters.
    pub refresh: u64,
    pub current_user: Option<UserId>,
    pub reviews: Vec<Review>,
    pub stats: Option<ReviewStats>,
    pub loading: bool,
    /// Last list failure, ready for display.
    pub error: Option<String>,
    list_generation: u64,
    stats_generation: u64,
}

enum Fetch {
    Everything,
    ListOnly,
}

/// Review list, statistics and actions for a product page.
pub struct ReviewPanel {
    api: Arc<dyn ReviewApi>,
    events: EventBus,
    state: ViewState<ReviewPanelState>,
    limit: u32,
}

impl std::fmt::Debug for ReviewPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewPanel")
            .field("state", &self.state)
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}

impl ReviewPanel {
    pub fn new(api: Arc<dyn ReviewApi>, events: EventBus) -> Self {
        Self {
            api,
            events,
            state: ViewState::new(ReviewPanelState::default()),
            limit: DEFAULT_REVIEW_LIMIT,
        }
    }

    /// Override the page size.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit.max(1);
        self
    }

    /// Set the logged-in user, if any.
    pub fn with_user(self, user: Option<UserId>) -> Self {
        self.state.update(|s| s.current_user = user);
        self
    }

    /// Current state.
    pub fn state(&self) -> ReviewPanelState {
        self.state.snapshot()
    }

    /// Weak handle onto the panel state.
    pub fn handle(&self) -> ViewHandle<ReviewPanelState> {
        self.state.handle()
    }

    /// Show reviews for `product_id` and fetch them.
    pub async fn set_product(&self, product_id: ProductId) {
        self.state.update(|s| {
            s.product_id = Some(product_id);
            s.reviews.clear();
            s.stats = None;
        });
        self.refresh().await;
    }

    /// Change the server-side sort order and re-fetch.
    pub async fn set_sort(&self, sort: ReviewSort) {
        self.state.update(|s| s.sort = sort);
        self.refresh().await;
    }

    /// Signal an external change and re-fetch.
    pub async fn bump_refresh(&self) {
        self.state.update(|s| s.refresh += 1);
        self.refresh().await;
    }

    /// Fetch list and statistics for the current parameters.
    pub async fn refresh(&self) {
        self.refresh_task().await
    }

    /// A detached refresh that only holds a weak handle on the panel.
    ///
    /// Results are dropped if the panel is gone or a newer fetch started
    /// before this one finished.
    pub fn refresh_task(&self) -> impl Future<Output = ()> + Send + 'static {
        self.fetch_task(Fetch::Everything)
    }

    fn fetch_task(&self, what: Fetch) -> impl Future<Output = ()> + Send + 'static {
        let api = self.api.clone();
        let handle = self.state.handle();
        let limit = self.limit;
        let with_stats = matches!(what, Fetch::Everything);
        let params = self.state.update(|s| {
            s.list_generation += 1;
            if with_stats {
                s.stats_generation += 1;
            }
            match &s.product_id {
                Some(id) => {
                    s.loading = true;
                    s.error = None;
                    Some((id.clone(), s.sort, s.list_generation, s.stats_generation))
                }
                None => None,
            }
        });

        async move {
            let Some((product_id, sort, list_generation, stats_generation)) = params else {
                return;
            };

            let (list, stats) = if with_stats {
                let (list, stats) = futures::join!(
                    api.list(&product_id, sort, limit),
                    api.stats(&product_id)
                );
                (list, Some(stats))
            } else {
                (api.list(&product_id, sort, limit).await, None)
            };

            let applied = handle.update(|s| {
                if s.list_generation == list_generation {
                    s.loading = false;
                    match list {
                        Ok(reviews) => s.reviews = reviews,
                        Err(e) => {
                            tracing::warn!(%product_id, error = %e, "failed to load reviews");
                            s.error = Some(e.user_message());
                        }
                    }
                } else {
                    tracing::debug!(%product_id, "discarding stale review list");
                }
                // Stats are only superseded by another stats fetch.
                match stats {
                    Some(_) if s.stats_generation != stats_generation => {
                        tracing::debug!(%product_id, "discarding stale review stats");
                    }
                    Some(Ok(stats)) => s.stats = Some(stats),
                    Some(Err(e)) => {
                        tracing::warn!(%product_id, error = %e, "failed to load review stats");
                    }
                    None => {}
                }
            });
            if applied.is_none() {
                tracing::debug!(%product_id, "review panel dropped before results arrived");
            }
        }
    }

    /// Vote on a review, then reload the list.
    pub async fn vote(&self, review_id: &ReviewId, vote: VoteType) -> Result<(), CommerceError> {
        if let Err(e) = self.api.vote(review_id, vote).await {
            tracing::warn!(%review_id, error = %e, "vote failed");
            self.events.error(e.user_message());
            return Err(e);
        }
        tracing::debug!(%review_id, ?vote, "vote recorded");
        self.fetch_task(Fetch::ListOnly).await;
        Ok(())
    }

    /// Delete one of the current user's reviews, then reload.
    pub async fn delete(&self, review_id: &ReviewId) -> Result<(), CommerceError> {
        let (user, review) = self.state.read(|s| {
            (
                s.current_user.clone(),
                s.reviews.iter().find(|r| &r.id == review_id).cloned(),
            )
        });
        let user = user.ok_or(CommerceError::NotAuthenticated)?;
        let review = review.ok_or_else(|| CommerceError::ReviewNotFound(review_id.to_string()))?;
        if !review.is_author(&user) {
            return Err(CommerceError::NotAuthorized(
                "you can only delete your own reviews".to_string(),
            ));
        }

        if let Err(e) = self.api.delete(review_id, &user).await {
            tracing::warn!(%review_id, error = %e, "delete failed");
            self.events.error(e.user_message());
            return Err(e);
        }
        self.events.success("Review deleted");
        self.refresh().await;
        Ok(())
    }

    /// Post a review for the current product as the current user.
    pub async fn submit(&self, rating: u8, comment: &str) -> Result<(), CommerceError> {
        let (user, product) = self
            .state
            .read(|s| (s.current_user.clone(), s.product_id.clone()));
        let user = user.ok_or(CommerceError::NotAuthenticated)?;
        let product = product.ok_or_else(|| {
            CommerceError::ValidationError("No product selected".to_string())
        })?;

        let review = NewReview::new(product, user, rating, comment.trim());
        review.validate()?;

        if let Err(e) = self.api.create(&review).await {
            self.events.error(e.user_message());
            return Err(e);
        }
        self.events.success("Thanks for your review!");
        self.bump_refresh().await;
        Ok(())
    }

    /// React to an application event.
    pub async fn on_event(&self, event: &AppEvent) {
        match event {
            AppEvent::ReviewsChanged { product_id } => {
                let current = self
                    .state
                    .read(|s| s.product_id.as_ref().map(|p| p.as_str() == product_id.as_str()));
                if current == Some(true) {
                    self.bump_refresh().await;
                }
            }
            AppEvent::UserLoggedIn(notice) => {
                self.state
                    .update(|s| s.current_user = Some(UserId::new(notice.user_id.clone())));
            }
            AppEvent::UserLoggedOut => {
                self.state.update(|s| s.current_user = None);
            }
            AppEvent::ShowToast(_) => {}
        }
    }

    /// Histogram rows, 5 stars first.
    pub fn bars(&self) -> Vec<RatingBar> {
        self.state
            .read(|s| s.stats.as_ref().map(ReviewStats::bars))
            .unwrap_or_else(|| ReviewStats::default().bars())
    }

    /// Whether the current user may delete `review`.
    pub fn can_delete(&self, review: &Review) -> bool {
        self.state.read(|s| {
            s.current_user
                .as_ref()
                .map_or(false, |user| review.is_author(user))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reviews::HttpReviewApi;
    use serde_json::json;
    use storefront_fetch::mock::MockTransport;
    use storefront_fetch::{FetchClient, Method};

    fn panel(mock: &Arc<MockTransport>) -> ReviewPanel {
        let client = FetchClient::with_transport(mock.clone()).with_base_url("http://api.test");
        ReviewPanel::new(Arc::new(HttpReviewApi::new(client)), EventBus::default())
    }

    fn review(id: &str, user: &str) -> serde_json::Value {
        json!({"_id": id, "userId": user, "rating": 4, "comment": "ok"})
    }

    #[tokio::test]
    async fn test_no_fetch_without_product() {
        let mock = Arc::new(MockTransport::new());
        panel(&mock).refresh().await;
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_results_for_dropped_panel_are_discarded() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(Method::Get, "/reviews/1", 200, json!({"data": [review("r1", "u1")]}));
        mock.respond(Method::Get, "/reviews/1/stats", 200, json!({"data": {"totalReviews": 1}}));

        let panel = panel(&mock);
        panel.state.update(|s| s.product_id = Some(ProductId::new("1")));
        let handle = panel.handle();
        let task = panel.refresh_task();
        drop(panel);

        task.await;
        assert_eq!(mock.count(Method::Get, "/reviews/1"), 1);
        assert!(!handle.is_mounted());
    }

    #[tokio::test]
    async fn test_stale_results_are_ignored() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(Method::Get, "/reviews/1", 200, json!({"data": [review("first", "u1")]}));
        mock.respond(Method::Get, "/reviews/1", 200, json!({"data": [review("second", "u1")]}));
        mock.respond(Method::Get, "/reviews/1/stats", 200, json!({"data": {"totalReviews": 1}}));

        let panel = panel(&mock);
        panel.state.update(|s| s.product_id = Some(ProductId::new("1")));
        let older = panel.refresh_task();
        let newer = panel.refresh_task();

        newer.await;
        older.await;

        let state = panel.state();
        assert_eq!(state.reviews.len(), 1);
        assert_eq!(state.reviews[0].id.as_str(), "first");
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_vote_during_load_keeps_stats() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(Method::Get, "/reviews/1", 200, json!({"data": [review("r1", "u2")]}));
        mock.respond(
            Method::Get,
            "/reviews/1/stats",
            200,
            json!({"data": {"averageRating": 5.0, "totalReviews": 1, "ratingDistribution": {"5": 1}}}),
        );
        mock.respond(Method::Post, "/reviews/r1/vote", 200, json!({"success": true}));

        let panel = panel(&mock);
        panel.state.update(|s| s.product_id = Some(ProductId::new("1")));
        let load = panel.refresh_task();
        panel.vote(&ReviewId::new("r1"), VoteType::Upvote).await.unwrap();
        load.await;

        let state = panel.state();
        assert_eq!(state.stats.map(|s| s.total_reviews), Some(1));
        assert_eq!(state.reviews.len(), 1);
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_list_failure_keeps_stats() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(Method::Get, "/reviews/5", 500, json!({"message": "db down"}));
        mock.respond(
            Method::Get,
            "/reviews/5/stats",
            200,
            json!({"data": {"averageRating": 4.0, "totalReviews": 2, "ratingDistribution": {"4": 2}}}),
        );

        let panel = panel(&mock);
        panel.set_product(ProductId::new("5")).await;

        let state = panel.state();
        assert_eq!(state.error.as_deref(), Some("db down"));
        assert_eq!(state.stats.map(|s| s.total_reviews), Some(2));
        assert_eq!(panel.bars()[1].percent, 100.0);
    }

    #[tokio::test]
    async fn test_login_events_set_current_user() {
        let mock = Arc::new(MockTransport::new());
        let panel = panel(&mock);
        panel
            .on_event(&AppEvent::UserLoggedIn(storefront_events::LoginNotice {
                user_id: "u1".to_string(),
                username: "ann".to_string(),
                role: "user".to_string(),
            }))
            .await;
        assert_eq!(panel.state().current_user, Some(UserId::new("u1")));

        panel.on_event(&AppEvent::UserLoggedOut).await;
        assert_eq!(panel.state().current_user, None);
    }
}
