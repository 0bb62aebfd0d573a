//! Shop search.

use tracing::instrument;

use super::ServiceError;
use crate::db::{ShopRepository, Store};
use crate::models::Shop;

/// Search shops by name or address.
///
/// `None` means no search was requested and is distinct from a search that
/// matched nothing. An empty term matches every shop.
///
/// # Errors
///
/// Returns `ServiceError::Repository` if the query fails.
#[instrument(skip(store))]
pub async fn search_shops(
    store: &dyn Store,
    q: Option<&str>,
) -> Result<Option<Vec<Shop>>, ServiceError> {
    let Some(term) = q else {
        return Ok(None);
    };

    let shops = store.search_shops(term).await?;
    tracing::debug!(results = shops.len(), "Shop search complete");

    Ok(Some(shops))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use coffeeshop_core::{Email, Latitude, Longitude};

    use super::*;
    use crate::db::{MemoryStore, ShopRepository, UserRepository};
    use crate::models::NewShop;

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        let owner = store
            .create_user(&Email::parse("owner@example.com").unwrap(), "hash")
            .await
            .unwrap()
            .id;

        for (name, address) in [
            ("Blue Bottle", "1 Market St"),
            ("Corner Cafe", "123 Blue Ave"),
            ("Green Cup", "456 Red St"),
        ] {
            let shop = NewShop {
                name: name.to_string(),
                address: address.to_string(),
                url: None,
                latitude: Latitude::parse("1").unwrap(),
                longitude: Longitude::parse("2").unwrap(),
            };
            store.create_shop(owner, &shop, None).await.unwrap();
        }
        store
    }

    fn names(shops: &[Shop]) -> Vec<&str> {
        shops.iter().map(|s| s.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_no_query_is_not_searched() {
        let store = seeded().await;
        assert!(search_shops(&store, None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_matches_name_or_address() {
        let store = seeded().await;
        let shops = search_shops(&store, Some("blue")).await.unwrap().unwrap();
        assert_eq!(names(&shops), ["Blue Bottle", "Corner Cafe"]);
    }

    #[tokio::test]
    async fn test_no_match_is_empty_not_none() {
        let store = seeded().await;
        let shops = search_shops(&store, Some("espresso")).await.unwrap();
        assert_eq!(shops.map(|s| s.len()), Some(0));
    }

    #[tokio::test]
    async fn test_empty_query_matches_everything() {
        let store = seeded().await;
        let shops = search_shops(&store, Some("")).await.unwrap().unwrap();
        assert_eq!(shops.len(), 3);
    }
}
