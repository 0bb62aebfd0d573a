//! Domain models for the coffee shop site.
//!
//! These are validated domain objects, separate from the database row types
//! in [`crate::db`].

pub mod review;
pub mod session;
pub mod shop;
pub mod user;

pub use review::{NewReview, Review};
pub use session::{CurrentUser, keys as session_keys};
pub use shop::{NewShop, PhotoRef, RatedShop, Shop};
pub use user::User;
