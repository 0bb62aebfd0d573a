//! Shop queries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::instrument;

use coffeeshop_core::{ShopId, UserId};

use super::{PgStore, contains_pattern, map_foreign_key_violation};
use crate::db::{RepositoryError, ShopRepository};
use crate::models::{NewShop, PhotoRef, RatedShop, Shop};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ShopRow {
    id: i32,
    name: String,
    address: String,
    url: Option<String>,
    photo: Option<String>,
    latitude: f64,
    longitude: f64,
    user_id: i32,
    created_at: DateTime<Utc>,
}

impl From<ShopRow> for Shop {
    fn from(row: ShopRow) -> Self {
        Self {
            id: ShopId::new(row.id),
            name: row.name,
            address: row.address,
            url: row.url,
            photo: row.photo.map(PhotoRef::new),
            latitude: row.latitude,
            longitude: row.longitude,
            user_id: UserId::new(row.user_id),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RatedShopRow {
    #[sqlx(flatten)]
    shop: ShopRow,
    avg_rating: Option<f64>,
}

const SHOP_COLUMNS: &str =
    "s.id, s.name, s.address, s.url, s.photo, s.latitude, s.longitude, s.user_id, s.created_at";

#[async_trait]
impl ShopRepository for PgStore {
    #[instrument(skip(self))]
    async fn shop_by_id(&self, id: ShopId) -> Result<Option<Shop>, RepositoryError> {
        let row = sqlx::query_as::<_, ShopRow>(&format!(
            "SELECT {SHOP_COLUMNS} FROM coffeeshop.shops s WHERE s.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(Shop::from))
    }

    #[instrument(skip(self))]
    async fn shop_with_rating(&self, id: ShopId) -> Result<Option<RatedShop>, RepositoryError> {
        // Average per shop as a derived table, left-joined so that a shop with
        // no reviews still comes back with a NULL average.
        let row = sqlx::query_as::<_, RatedShopRow>(&format!(
            r"
            SELECT {SHOP_COLUMNS}, r.avg_rating
            FROM coffeeshop.shops s
            LEFT JOIN (
                SELECT shop_id, AVG(rating)::float8 AS avg_rating
                FROM coffeeshop.reviews
                GROUP BY shop_id
            ) r ON r.shop_id = s.id
            WHERE s.id = $1
            "
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(|r| RatedShop {
            shop: r.shop.into(),
            avg_rating: r.avg_rating,
        }))
    }

    #[instrument(skip(self))]
    async fn search_shops(&self, term: &str) -> Result<Vec<Shop>, RepositoryError> {
        let pattern = contains_pattern(term);
        let rows = sqlx::query_as::<_, ShopRow>(&format!(
            r"
            SELECT {SHOP_COLUMNS}
            FROM coffeeshop.shops s
            WHERE s.name ILIKE $1 OR s.address ILIKE $1
            ORDER BY s.name, s.id
            "
        ))
        .bind(&pattern)
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(Shop::from).collect())
    }

    #[instrument(skip(self, shop, photo), fields(name = %shop.name))]
    async fn create_shop(
        &self,
        owner: UserId,
        shop: &NewShop,
        photo: Option<&PhotoRef>,
    ) -> Result<Shop, RepositoryError> {
        let row = sqlx::query_as::<_, ShopRow>(
            r"
            INSERT INTO coffeeshop.shops
                (name, address, url, photo, latitude, longitude, user_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, name, address, url, photo, latitude, longitude, user_id, created_at
            ",
        )
        .bind(&shop.name)
        .bind(&shop.address)
        .bind(shop.url.as_deref())
        .bind(photo.map(PhotoRef::as_str))
        .bind(shop.latitude.degrees())
        .bind(shop.longitude.degrees())
        .bind(owner)
        .fetch_one(self.pool())
        .await
        .map_err(map_foreign_key_violation)?;

        Ok(row.into())
    }
}
