//! Shop details and shop creation.

use tracing::instrument;

use coffeeshop_core::{ShopId, UserId};

use super::ServiceError;
use crate::db::{ReviewRepository, ShopRepository, Store};
use crate::forms::{PhotoUpload, ShopSubmission};
use crate::models::{PhotoRef, Review, Shop};
use crate::storage::PhotoStorage;

/// Everything the shop detail page shows.
#[derive(Debug, Clone)]
pub struct ShopDetails {
    pub shop: Shop,
    /// Mean of all review ratings, `None` without reviews.
    pub avg_rating: Option<f64>,
    pub review_count: usize,
    /// Reviews that carry a comment, newest first.
    pub review_comments: Vec<Review>,
}

/// Shop service.
pub struct ShopService<'a> {
    store: &'a dyn Store,
    photos: &'a dyn PhotoStorage,
}

impl<'a> ShopService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store, photos: &'a dyn PhotoStorage) -> Self {
        Self { store, photos }
    }

    /// Load a shop with its average rating and commented reviews.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if no shop has this ID.
    #[instrument(skip(self))]
    pub async fn details(&self, id: ShopId) -> Result<ShopDetails, ServiceError> {
        let rated = self
            .store
            .shop_with_rating(id)
            .await?
            .ok_or(ServiceError::NotFound)?;

        let reviews = self.store.reviews_for_shop(id).await?;
        let review_count = reviews.len();
        let review_comments = reviews.into_iter().filter(Review::has_comment).collect();

        Ok(ShopDetails {
            shop: rated.shop,
            avg_rating: rated.avg_rating,
            review_count,
            review_comments,
        })
    }

    /// Validate a submission and create the shop, owned by `actor`.
    ///
    /// The photo, if any, is stored before the insert and discarded again if
    /// the insert fails.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Invalid` if validation fails (nothing is written),
    /// `ServiceError::Storage` if the photo cannot be stored, or
    /// `ServiceError::Repository` if the insert fails.
    #[instrument(skip(self, submission), fields(actor = %actor))]
    pub async fn create(
        &self,
        actor: UserId,
        submission: &ShopSubmission,
    ) -> Result<Shop, ServiceError> {
        let valid = submission.validate().map_err(ServiceError::Invalid)?;

        let photo = match valid.photo {
            Some(upload) => Some(self.store_photo(upload).await?),
            None => None,
        };

        match self
            .store
            .create_shop(actor, &valid.shop, photo.as_ref())
            .await
        {
            Ok(shop) => {
                tracing::info!(shop_id = %shop.id, name = %shop.name, "Created shop");
                Ok(shop)
            }
            Err(e) => {
                if let Some(photo) = &photo
                    && let Err(discard_err) = self.photos.discard(photo).await
                {
                    tracing::warn!(
                        photo = photo.as_str(),
                        error = %discard_err,
                        "Failed to discard photo of unsaved shop"
                    );
                }
                Err(e.into())
            }
        }
    }

    async fn store_photo(&self, upload: PhotoUpload) -> Result<PhotoRef, ServiceError> {
        let filename = upload.safe_filename();
        let photo = self.photos.store(&filename, upload.data).await?;
        tracing::debug!(photo = photo.as_str(), "Stored shop photo");
        Ok(photo)
    }
}
