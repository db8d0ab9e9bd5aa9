//! Review types as served by the reviews API.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CommerceError;
use crate::ids::{ProductId, ReviewId, UserId};

/// A single review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: ReviewId,
    #[serde(rename = "userId")]
    pub user_id: UserId,
    #[serde(default)]
    pub username: Option<String>,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub upvotes: u32,
    #[serde(default)]
    pub downvotes: u32,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Review {
    /// Name shown next to the review.
    pub fn author(&self) -> &str {
        self.username.as_deref().unwrap_or("Anonymous")
    }

    /// Whether `user` wrote this review.
    pub fn is_author(&self, user: &UserId) -> bool {
        &self.user_id == user
    }
}

/// Review counts per star value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RatingDistribution(BTreeMap<String, u32>);

impl RatingDistribution {
    /// Build from `(stars, count)` pairs.
    pub fn from_counts(counts: impl IntoIterator<Item = (u8, u32)>) -> Self {
        Self(
            counts
                .into_iter()
                .map(|(stars, n)| (stars.to_string(), n))
                .collect(),
        )
    }

    /// Number of reviews with `stars`. Missing keys count as zero.
    pub fn count(&self, stars: u8) -> u32 {
        self.0.get(&stars.to_string()).copied().unwrap_or(0)
    }
}

/// Aggregate statistics for a product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewStats {
    #[serde(rename = "averageRating", default)]
    pub average_rating: f64,
    #[serde(rename = "totalReviews", default)]
    pub total_reviews: u32,
    #[serde(rename = "ratingDistribution", default)]
    pub rating_distribution: RatingDistribution,
}

/// One row of the rating histogram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingBar {
    pub stars: u8,
    pub count: u32,
    /// 0 to 100.
    pub percent: f64,
}

impl ReviewStats {
    /// Share of reviews with `stars`, as a percentage.
    pub fn percentage(&self, stars: u8) -> f64 {
        if self.total_reviews == 0 {
            return 0.0;
        }
        f64::from(self.rating_distribution.count(stars)) / f64::from(self.total_reviews) * 100.0
    }

    /// Histogram rows from 5 stars down to 1.
    pub fn bars(&self) -> Vec<RatingBar> {
        (1..=5u8)
            .rev()
            .map(|stars| RatingBar {
                stars,
                count: self.rating_distribution.count(stars),
                percent: self.percentage(stars),
            })
            .collect()
    }
}

/// Server-side sort order for the review list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ReviewSort {
    #[default]
    #[serde(rename = "helpful")]
    MostHelpful,
    #[serde(rename = "recent")]
    MostRecent,
    #[serde(rename = "highest")]
    HighestRating,
    #[serde(rename = "lowest")]
    LowestRating,
}

impl ReviewSort {
    /// Value of the `sortBy` query parameter.
    pub fn as_query(&self) -> &'static str {
        match self {
            ReviewSort::MostHelpful => "helpful",
            ReviewSort::MostRecent => "recent",
            ReviewSort::HighestRating => "highest",
            ReviewSort::LowestRating => "lowest",
        }
    }
}

impl fmt::Display for ReviewSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query())
    }
}

impl FromStr for ReviewSort {
    type Err = CommerceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "helpful" | "most-helpful" => Ok(ReviewSort::MostHelpful),
            "recent" | "most-recent" => Ok(ReviewSort::MostRecent),
            "highest" | "highest-rating" => Ok(ReviewSort::HighestRating),
            "lowest" | "lowest-rating" => Ok(ReviewSort::LowestRating),
            other => Err(CommerceError::ValidationError(format!(
                "unknown review sort '{}'",
                other
            ))),
        }
    }
}

/// Direction of a helpfulness vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    Upvote,
    Downvote,
}

impl FromStr for VoteType {
    type Err = CommerceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" | "upvote" => Ok(VoteType::Upvote),
            "down" | "downvote" => Ok(VoteType::Downvote),
            other => Err(CommerceError::ValidationError(format!(
                "unknown vote type '{}'",
                other
            ))),
        }
    }
}

/// A review about to be posted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewReview {
    #[serde(rename = "productId")]
    pub product_id: ProductId,
    #[serde(rename = "userId")]
    pub user_id: UserId,
    pub rating: u8,
    pub comment: String,
}

impl NewReview {
    pub fn new(
        product_id: ProductId,
        user_id: UserId,
        rating: u8,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            product_id,
            user_id,
            rating,
            comment: comment.into(),
        }
    }

    /// Check rating range and comment presence.
    pub fn validate(&self) -> Result<(), CommerceError> {
        if !(1..=5).contains(&self.rating) {
            return Err(CommerceError::ValidationError(
                "Rating must be between 1 and 5".to_string(),
            ));
        }
        if self.comment.trim().is_empty() {
            return Err(CommerceError::ValidationError(
                "Please write a comment".to_string(),
            ));
        }
        Ok(())
    }
}
