//! Shop reviews.

use chrono::{DateTime, Utc};
use serde::Serialize;

use coffeeshop_core::{Rating, ReviewId, ShopId, UserId};

/// A review left by a user for a shop.
#[derive(Debug, Clone, Serialize)]
pub struct Review {
    pub id: ReviewId,
    pub rating: Rating,
    /// Never `Some("")`: empty comments are stored as `None`.
    pub comment: Option<String>,
    pub shop_id: ShopId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl Review {
    /// Whether the review carries a comment worth displaying.
    #[must_use]
    pub fn has_comment(&self) -> bool {
        self.comment.as_deref().is_some_and(|c| !c.trim().is_empty())
    }
}

/// A validated review submission, ready to insert.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub shop_id: ShopId,
    pub rating: Rating,
    pub comment: Option<String>,
}
