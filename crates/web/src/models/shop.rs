//! Shop listings.

use chrono::{DateTime, Utc};
use serde::Serialize;

use coffeeshop_core::{Latitude, Longitude, ShopId, UserId};

/// Reference to a stored photo, as returned by the photo storage.
///
/// The value is the stored file name, relative to the upload directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PhotoRef(String);

impl PhotoRef {
    #[must_use]
    pub const fn new(name: String) -> Self {
        Self(name)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Public URL the photo is served from.
    #[must_use]
    pub fn url(&self) -> String {
        format!("/uploads/{}", self.0)
    }
}

/// A coffee shop listing.
#[derive(Debug, Clone, Serialize)]
pub struct Shop {
    pub id: ShopId,
    pub name: String,
    pub address: String,
    pub url: Option<String>,
    pub photo: Option<PhotoRef>,
    pub latitude: f64,
    pub longitude: f64,
    /// The user who submitted the listing.
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// A shop joined with the average of its review ratings.
#[derive(Debug, Clone)]
pub struct RatedShop {
    pub shop: Shop,
    /// `None` when the shop has no reviews.
    pub avg_rating: Option<f64>,
}

/// A validated shop submission, ready to insert.
#[derive(Debug, Clone)]
pub struct NewShop {
    pub name: String,
    pub address: String,
    pub url: Option<String>,
    pub latitude: Latitude,
    pub longitude: Longitude,
}
