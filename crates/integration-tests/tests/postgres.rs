//! `PgStore` against a real database.
//!
//! ```bash
//! COFFEESHOP_DATABASE_URL=postgres://... cargo test -p coffeeshop-integration-tests --test postgres -- --ignored
//! ```

#![allow(clippy::unwrap_used)]

use std::time::{SystemTime, UNIX_EPOCH};

use secrecy::SecretString;

use coffeeshop_core::{Email, Latitude, Longitude, Rating, ShopId, UserId};
use coffeeshop_web::db::{
    PgStore, RepositoryError, ReviewRepository, ShopRepository, Store, UserRepository,
    create_pool,
};
use coffeeshop_web::models::{NewReview, NewShop, PhotoRef};

async fn store() -> PgStore {
    let url = std::env::var("COFFEESHOP_DATABASE_URL")
        .expect("COFFEESHOP_DATABASE_URL must be set for PostgreSQL tests");
    let pool = create_pool(&SecretString::from(url)).await.unwrap();
    sqlx::migrate!("../web/migrations").run(&pool).await.unwrap();
    PgStore::new(pool)
}

/// A suffix unique to this test run so parallel tests never collide.
fn unique(label: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{label}-{}-{nanos}", std::process::id())
}

async fn user(store: &PgStore) -> UserId {
    let email = Email::parse(&format!("{}@example.com", unique("pg"))).unwrap();
    store.create_user(&email, "hash").await.unwrap().id
}

fn new_shop(name: &str) -> NewShop {
    NewShop {
        name: name.to_owned(),
        address: "1 Test Ave".to_owned(),
        url: Some("https://example.com".to_owned()),
        latitude: Latitude::parse("37.7749").unwrap(),
        longitude: Longitude::parse("-122.4194").unwrap(),
    }
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (COFFEESHOP_DATABASE_URL)"]
async fn test_ping() {
    store().await.ping().await.unwrap();
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (COFFEESHOP_DATABASE_URL)"]
async fn test_users_are_unique_by_email() {
    let store = store().await;
    let email = Email::parse(&format!("{}@example.com", unique("dup"))).unwrap();

    let created = store.create_user(&email, "hash").await.unwrap();
    let err = store.create_user(&email, "other").await.unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));

    let (found, hash) = store.password_hash_by_email(&email).await.unwrap().unwrap();
    assert_eq!(found.id, created.id);
    assert_eq!(hash, "hash");
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (COFFEESHOP_DATABASE_URL)"]
async fn test_shop_rating_and_reviews() {
    let store = store().await;
    let owner = user(&store).await;
    let name = unique("Blue Bottle");

    let photo = PhotoRef::new("front.png".to_owned());
    let shop = store
        .create_shop(owner, &new_shop(&name), Some(&photo))
        .await
        .unwrap();
    assert_eq!(shop.photo.as_ref(), Some(&photo));

    let rated = store.shop_with_rating(shop.id).await.unwrap().unwrap();
    assert_eq!(rated.avg_rating, None);

    for (rating, comment) in [(5, Some("Great")), (2, None)] {
        let review = NewReview {
            shop_id: shop.id,
            rating: Rating::new(rating).unwrap(),
            comment: comment.map(str::to_owned),
        };
        store.create_review(owner, &review).await.unwrap();
    }

    let rated = store.shop_with_rating(shop.id).await.unwrap().unwrap();
    assert!((rated.avg_rating.unwrap() - 3.5).abs() < 1e-9);

    let reviews = store.reviews_for_shop(shop.id).await.unwrap();
    assert_eq!(reviews.len(), 2);
    assert_eq!(reviews[0].comment, None);
    assert_eq!(reviews[1].comment.as_deref(), Some("Great"));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (COFFEESHOP_DATABASE_URL)"]
async fn test_search_is_case_insensitive_and_literal() {
    let store = store().await;
    let owner = user(&store).await;
    let name = unique("Percent_Cafe");

    let shop = store.create_shop(owner, &new_shop(&name), None).await.unwrap();

    let found = store.search_shops(&name.to_uppercase()).await.unwrap();
    assert!(found.iter().any(|s| s.id == shop.id));

    let wildcard = store.search_shops(&name.replace('_', "%")).await.unwrap();
    assert!(wildcard.iter().all(|s| s.id != shop.id));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (COFFEESHOP_DATABASE_URL)"]
async fn test_foreign_keys_map_to_not_found() {
    let store = store().await;

    let err = store
        .create_shop(UserId::new(i32::MAX), &new_shop(&unique("Orphan")), None)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound));

    let owner = user(&store).await;
    let review = NewReview {
        shop_id: ShopId::new(i32::MAX),
        rating: Rating::new(3).unwrap(),
        comment: None,
    };
    let err = store.create_review(owner, &review).await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound));
}
