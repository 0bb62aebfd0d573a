//! Business logic services.
//!
//! # Services
//!
//! - `shops` - Shop details with aggregate rating, shop creation
//! - `search` - Name/address substring search
//! - `reviews` - Review form target lookup and review creation
//! - `auth` - Password registration and login
//!
//! Services borrow the store and photo storage held by
//! [`AppState`](crate::state::AppState) and receive the acting user as an
//! explicit [`UserId`](coffeeshop_core::UserId) parameter.

pub mod auth;
pub mod reviews;
pub mod search;
pub mod shops;

use thiserror::Error;

use coffeeshop_core::FieldErrors;

use crate::db::RepositoryError;
use crate::storage::StorageError;

pub use auth::{AuthError, AuthService};
pub use reviews::ReviewService;
pub use search::search_shops;
pub use shops::{ShopDetails, ShopService};

/// Errors returned by the shop and review services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The requested record does not exist.
    #[error("not found")]
    NotFound,

    /// The submission failed validation. Nothing was written.
    #[error("validation failed: {0}")]
    Invalid(FieldErrors),

    /// A required request parameter was absent.
    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
