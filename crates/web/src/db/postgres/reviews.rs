//! Review queries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::instrument;

use coffeeshop_core::{Rating, ReviewId, ShopId, UserId};

use super::{PgStore, map_foreign_key_violation};
use crate::db::{RepositoryError, ReviewRepository};
use crate::models::{NewReview, Review};

#[derive(Debug, sqlx::FromRow)]
struct ReviewRow {
    id: i32,
    rating: i32,
    comment: Option<String>,
    shop_id: i32,
    user_id: i32,
    created_at: DateTime<Utc>,
}

impl TryFrom<ReviewRow> for Review {
    type Error = RepositoryError;

    fn try_from(row: ReviewRow) -> Result<Self, Self::Error> {
        let rating = Rating::new(row.rating).map_err(|e| {
            RepositoryError::DataCorruption(format!("review {}: {e}", row.id))
        })?;

        Ok(Self {
            id: ReviewId::new(row.id),
            rating,
            comment: row.comment,
            shop_id: ShopId::new(row.shop_id),
            user_id: UserId::new(row.user_id),
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl ReviewRepository for PgStore {
    #[instrument(skip(self))]
    async fn reviews_for_shop(&self, shop_id: ShopId) -> Result<Vec<Review>, RepositoryError> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            r"
            SELECT id, rating, comment, shop_id, user_id, created_at
            FROM coffeeshop.reviews
            WHERE shop_id = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(shop_id)
        .fetch_all(self.pool())
        .await?;

        rows.into_iter().map(Review::try_from).collect()
    }

    #[instrument(skip(self, review), fields(shop_id = %review.shop_id))]
    async fn create_review(
        &self,
        author: UserId,
        review: &NewReview,
    ) -> Result<Review, RepositoryError> {
        let row = sqlx::query_as::<_, ReviewRow>(
            r"
            INSERT INTO coffeeshop.reviews (rating, comment, shop_id, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, rating, comment, shop_id, user_id, created_at
            ",
        )
        .bind(review.rating.value())
        .bind(review.comment.as_deref())
        .bind(review.shop_id)
        .bind(author)
        .fetch_one(self.pool())
        .await
        .map_err(map_foreign_key_violation)?;

        row.try_into()
    }
}
