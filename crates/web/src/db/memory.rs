//! In-memory store used by the test suites.
//!
//! Mirrors the semantics of [`PgStore`](super::PgStore): store-assigned IDs,
//! case-insensitive substring search, per-shop averages and foreign keys.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use coffeeshop_core::{Email, ReviewId, ShopId, UserId};

use super::{RepositoryError, ReviewRepository, ShopRepository, Store, UserRepository};
use crate::models::{NewReview, NewShop, PhotoRef, RatedShop, Review, Shop, User};

#[derive(Default)]
struct Tables {
    users: Vec<(User, String)>,
    shops: Vec<Shop>,
    reviews: Vec<Review>,
}

/// A `Store` that keeps every table in a `Vec`.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of shop rows.
    pub async fn shop_count(&self) -> usize {
        self.tables.read().await.shops.len()
    }

    /// Number of review rows across all shops.
    pub async fn review_count(&self) -> usize {
        self.tables.read().await.reviews.len()
    }
}

fn next_id(len: usize) -> Result<i32, RepositoryError> {
    i32::try_from(len + 1).map_err(|_| RepositoryError::Conflict("id space exhausted".to_owned()))
}

#[async_trait]
impl ShopRepository for MemoryStore {
    async fn shop_by_id(&self, id: ShopId) -> Result<Option<Shop>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.shops.iter().find(|s| s.id == id).cloned())
    }

    async fn shop_with_rating(&self, id: ShopId) -> Result<Option<RatedShop>, RepositoryError> {
        let tables = self.tables.read().await;
        let Some(shop) = tables.shops.iter().find(|s| s.id == id).cloned() else {
            return Ok(None);
        };

        let (sum, count) = tables
            .reviews
            .iter()
            .filter(|r| r.shop_id == id)
            .fold((0_i64, 0_u32), |(sum, count), r| {
                (sum + i64::from(r.rating.value()), count + 1)
            });

        #[allow(clippy::cast_precision_loss)]
        let avg_rating = (count > 0).then(|| sum as f64 / f64::from(count));

        Ok(Some(RatedShop { shop, avg_rating }))
    }

    async fn search_shops(&self, term: &str) -> Result<Vec<Shop>, RepositoryError> {
        let needle = term.to_lowercase();
        let tables = self.tables.read().await;

        let mut shops: Vec<Shop> = tables
            .shops
            .iter()
            .filter(|s| {
                s.name.to_lowercase().contains(&needle)
                    || s.address.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        shops.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        Ok(shops)
    }

    async fn create_shop(
        &self,
        owner: UserId,
        shop: &NewShop,
        photo: Option<&PhotoRef>,
    ) -> Result<Shop, RepositoryError> {
        let mut tables = self.tables.write().await;
        if !tables.users.iter().any(|(u, _)| u.id == owner) {
            return Err(RepositoryError::NotFound);
        }

        let row = Shop {
            id: ShopId::new(next_id(tables.shops.len())?),
            name: shop.name.clone(),
            address: shop.address.clone(),
            url: shop.url.clone(),
            photo: photo.cloned(),
            latitude: shop.latitude.degrees(),
            longitude: shop.longitude.degrees(),
            user_id: owner,
            created_at: Utc::now(),
        };
        tables.shops.push(row.clone());

        Ok(row)
    }
}

#[async_trait]
impl ReviewRepository for MemoryStore {
    async fn reviews_for_shop(&self, shop_id: ShopId) -> Result<Vec<Review>, RepositoryError> {
        let tables = self.tables.read().await;
        // Newest first: rows are appended in insertion order.
        Ok(tables
            .reviews
            .iter()
            .rev()
            .filter(|r| r.shop_id == shop_id)
            .cloned()
            .collect())
    }

    async fn create_review(
        &self,
        author: UserId,
        review: &NewReview,
    ) -> Result<Review, RepositoryError> {
        let mut tables = self.tables.write().await;
        if !tables.shops.iter().any(|s| s.id == review.shop_id) {
            return Err(RepositoryError::NotFound);
        }

        let row = Review {
            id: ReviewId::new(next_id(tables.reviews.len())?),
            rating: review.rating,
            comment: review.comment.clone(),
            shop_id: review.shop_id,
            user_id: author,
            created_at: Utc::now(),
        };
        tables.reviews.push(row.clone());

        Ok(row)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(
        &self,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|(u, _)| &u.email == email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let user = User {
            id: UserId::new(next_id(tables.users.len())?),
            email: email.clone(),
            created_at: Utc::now(),
        };
        tables.users.push((user.clone(), password_hash.to_owned()));

        Ok(user)
    }

    async fn password_hash_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|(u, _)| &u.email == email).cloned())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use coffeeshop_core::{Latitude, Longitude, Rating};

    use super::*;

    async fn seed_user(store: &MemoryStore) -> UserId {
        let email = Email::parse("owner@example.com").unwrap();
        store.create_user(&email, "hash").await.unwrap().id
    }

    fn new_shop(name: &str, address: &str) -> NewShop {
        NewShop {
            name: name.to_string(),
            address: address.to_string(),
            url: None,
            latitude: Latitude::parse("0").unwrap(),
            longitude: Longitude::parse("0").unwrap(),
        }
    }

    #[tokio::test]
    async fn test_average_absent_without_reviews() {
        let store = MemoryStore::new();
        let owner = seed_user(&store).await;
        let shop = store
            .create_shop(owner, &new_shop("Blue Bottle", "1 Main St"), None)
            .await
            .unwrap();

        let rated = store.shop_with_rating(shop.id).await.unwrap().unwrap();
        assert_eq!(rated.avg_rating, None);
    }

    #[tokio::test]
    async fn test_average_only_counts_own_reviews() {
        let store = MemoryStore::new();
        let owner = seed_user(&store).await;
        let a = store
            .create_shop(owner, &new_shop("A", "a"), None)
            .await
            .unwrap();
        let b = store
            .create_shop(owner, &new_shop("B", "b"), None)
            .await
            .unwrap();

        for (shop_id, rating) in [(a.id, 5), (a.id, 2), (b.id, 1)] {
            let review = NewReview {
                shop_id,
                rating: Rating::new(rating).unwrap(),
                comment: None,
            };
            store.create_review(owner, &review).await.unwrap();
        }

        let rated = store.shop_with_rating(a.id).await.unwrap().unwrap();
        assert!((rated.avg_rating.unwrap() - 3.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_review_for_missing_shop_is_rejected() {
        let store = MemoryStore::new();
        let owner = seed_user(&store).await;
        let review = NewReview {
            shop_id: ShopId::new(99),
            rating: Rating::new(3).unwrap(),
            comment: None,
        };

        let err = store.create_review(owner, &review).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
        assert_eq!(store.review_count().await, 0);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        seed_user(&store).await;
        let email = Email::parse("OWNER@example.com").unwrap();
        let err = store.create_user(&email, "other").await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }
}
