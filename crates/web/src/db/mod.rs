//! Data access for the coffee shop site.
//!
//! # Database: `coffeeshop`
//!
//! ## Tables
//!
//! - `coffeeshop.users` - Accounts (email + argon2 password hash)
//! - `coffeeshop.shops` - Shop listings, owned by the submitting user
//! - `coffeeshop.reviews` - Ratings and comments, many per shop
//! - `tower_sessions.session` - Tower-sessions storage
//!
//! # Migrations
//!
//! Migrations are stored in `crates/web/migrations/` and run via:
//! ```bash
//! cargo run -p coffeeshop-cli -- migrate
//! ```
//!
//! # Stores
//!
//! Handlers and services only see the [`Store`] trait object held by
//! [`AppState`](crate::state::AppState). [`PgStore`] is the production
//! implementation; [`MemoryStore`] backs the test suites.

pub mod memory;
pub mod postgres;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use coffeeshop_core::{Email, ShopId, UserId};

use crate::models::{NewReview, NewShop, PhotoRef, RatedShop, Review, Shop, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// A referenced row does not exist.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Shop queries.
#[async_trait]
pub trait ShopRepository: Send + Sync {
    /// Fetch a shop by ID.
    async fn shop_by_id(&self, id: ShopId) -> Result<Option<Shop>, RepositoryError>;

    /// Fetch a shop together with the average rating of its reviews.
    ///
    /// The average is computed by the store, never by loading every review.
    /// A shop without reviews has `avg_rating == None`.
    async fn shop_with_rating(&self, id: ShopId) -> Result<Option<RatedShop>, RepositoryError>;

    /// Shops whose name or address contains `term`, ignoring case.
    async fn search_shops(&self, term: &str) -> Result<Vec<Shop>, RepositoryError>;

    /// Insert a shop owned by `owner`.
    async fn create_shop(
        &self,
        owner: UserId,
        shop: &NewShop,
        photo: Option<&PhotoRef>,
    ) -> Result<Shop, RepositoryError>;
}

/// Review queries.
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// All reviews for a shop, newest first.
    async fn reviews_for_shop(&self, shop_id: ShopId) -> Result<Vec<Review>, RepositoryError>;

    /// Insert a review written by `author`.
    ///
    /// Returns `RepositoryError::NotFound` if the shop does not exist.
    async fn create_review(
        &self,
        author: UserId,
        review: &NewReview,
    ) -> Result<Review, RepositoryError>;
}

/// Account queries.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user.
    ///
    /// Returns `RepositoryError::Conflict` if the email is taken.
    async fn create_user(
        &self,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, RepositoryError>;

    /// Look up a user and their password hash by email.
    async fn password_hash_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError>;
}

/// Everything the site needs from its data store.
#[async_trait]
pub trait Store: ShopRepository + ReviewRepository + UserRepository {
    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
