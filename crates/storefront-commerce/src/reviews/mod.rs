//! Product reviews: wire model, API client and the review panel view model.

mod api;
mod model;
mod panel;

pub use api::{HttpReviewApi, ReviewApi, DEFAULT_REVIEW_LIMIT};
pub use model::{
    NewReview, RatingBar, RatingDistribution, Review, ReviewSort, ReviewStats, VoteType,
};
pub use panel::{ReviewPanel, ReviewPanelState};
