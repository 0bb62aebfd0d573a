//! Review creation.

use tracing::instrument;

use coffeeshop_core::{FieldErrors, ShopId, UserId};

use super::ServiceError;
use crate::db::{RepositoryError, ReviewRepository, ShopRepository, Store};
use crate::forms::ReviewSubmission;
use crate::models::{Review, Shop};

const UNKNOWN_SHOP: &str = "That shop does not exist.";

/// Review service.
pub struct ReviewService<'a> {
    store: &'a dyn Store,
}

impl<'a> ReviewService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Resolve the shop a review form is for.
    ///
    /// Returns `Ok(None)` when the parameter is present but names no shop;
    /// the page then explains that the shop was not found.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::MissingParameter` if `shop_id` was not supplied.
    #[instrument(skip(self))]
    pub async fn target(&self, shop_id: Option<&str>) -> Result<Option<Shop>, ServiceError> {
        let raw = shop_id.ok_or(ServiceError::MissingParameter("shop_id"))?;

        let Ok(id) = raw.parse::<ShopId>() else {
            return Ok(None);
        };

        Ok(self.store.shop_by_id(id).await?)
    }

    /// Validate a submission and record the review, written by `actor`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Invalid` if validation fails or the shop does
    /// not exist. Nothing is written in either case.
    #[instrument(skip(self, submission), fields(actor = %actor))]
    pub async fn submit(
        &self,
        actor: UserId,
        submission: &ReviewSubmission,
    ) -> Result<Review, ServiceError> {
        let review = submission.validate().map_err(ServiceError::Invalid)?;

        if self.store.shop_by_id(review.shop_id).await?.is_none() {
            return Err(unknown_shop());
        }

        let review = self
            .store
            .create_review(actor, &review)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => unknown_shop(),
                other => ServiceError::Repository(other),
            })?;

        tracing::info!(
            review_id = %review.id,
            shop_id = %review.shop_id,
            rating = review.rating.value(),
            "Created review"
        );

        Ok(review)
    }
}

fn unknown_shop() -> ServiceError {
    ServiceError::Invalid(FieldErrors::single("shop_id", UNKNOWN_SHOP))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use coffeeshop_core::{Email, Latitude, Longitude};

    use super::*;
    use crate::db::{MemoryStore, ReviewRepository, ShopRepository, UserRepository};
    use crate::models::NewShop;

    async fn seeded() -> (MemoryStore, UserId, ShopId) {
        let store = MemoryStore::new();
        let user = store
            .create_user(&Email::parse("reviewer@example.com").unwrap(), "hash")
            .await
            .unwrap()
            .id;
        let shop = NewShop {
            name: "Green Cup".to_string(),
            address: "456 Red St".to_string(),
            url: None,
            latitude: Latitude::parse("51.5").unwrap(),
            longitude: Longitude::parse("-0.12").unwrap(),
        };
        let shop = store.create_shop(user, &shop, None).await.unwrap().id;
        (store, user, shop)
    }

    fn submission(shop_id: ShopId, rating: &str, comment: &str) -> ReviewSubmission {
        ReviewSubmission {
            shop_id: shop_id.to_string(),
            rating: rating.to_string(),
            comment: comment.to_string(),
        }
    }

    #[tokio::test]
    async fn test_target_requires_shop_id() {
        let (store, _, _) = seeded().await;
        let err = ReviewService::new(&store).target(None).await.unwrap_err();
        assert!(matches!(err, ServiceError::MissingParameter("shop_id")));
    }

    #[tokio::test]
    async fn test_target_unknown_shop_is_none() {
        let (store, _, shop_id) = seeded().await;
        let service = ReviewService::new(&store);

        assert!(service.target(Some("999")).await.unwrap().is_none());
        assert!(service.target(Some("abc")).await.unwrap().is_none());
        assert_eq!(
            service
                .target(Some(&shop_id.to_string()))
                .await
                .unwrap()
                .map(|s| s.id),
            Some(shop_id)
        );
    }

    #[tokio::test]
    async fn test_submit_links_shop_and_actor() {
        let (store, user, shop_id) = seeded().await;

        let review = ReviewService::new(&store)
            .submit(user, &submission(shop_id, "5", "Best pour-over in town"))
            .await
            .unwrap();

        assert_eq!(review.shop_id, shop_id);
        assert_eq!(review.user_id, user);
        assert_eq!(store.reviews_for_shop(shop_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_submit_empty_comment_is_absent() {
        let (store, user, shop_id) = seeded().await;

        let review = ReviewService::new(&store)
            .submit(user, &submission(shop_id, "3", ""))
            .await
            .unwrap();

        assert_eq!(review.comment, None);
    }

    #[tokio::test]
    async fn test_submit_unknown_shop_is_invalid() {
        let (store, user, _) = seeded().await;

        let err = ReviewService::new(&store)
            .submit(user, &submission(ShopId::new(999), "4", "ghost shop"))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Invalid(ref e) if e.get("shop_id") == [UNKNOWN_SHOP]));
        assert_eq!(store.review_count().await, 0);
    }

    #[tokio::test]
    async fn test_submit_rating_out_of_range() {
        let (store, user, shop_id) = seeded().await;

        let err = ReviewService::new(&store)
            .submit(user, &submission(shop_id, "6", ""))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Invalid(ref e) if e.has("rating")));
        assert_eq!(store.review_count().await, 0);
    }
}
