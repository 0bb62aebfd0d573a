//! Shop detail, search and submission through the full router.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;

use coffeeshop_core::{Rating, ShopId};
use coffeeshop_integration_tests::{Multipart, TestApp, shop_form};
use coffeeshop_web::db::{ReviewRepository, ShopRepository, UserRepository};
use coffeeshop_web::models::NewReview;

async fn add_review(app: &TestApp, shop_id: ShopId, rating: i32, comment: Option<&str>) {
    let author = app
        .store
        .password_hash_by_email(&coffeeshop_core::Email::parse("seed@example.com").unwrap())
        .await
        .unwrap()
        .unwrap()
        .0
        .id;
    let review = NewReview {
        shop_id,
        rating: Rating::new(rating).unwrap(),
        comment: comment.map(str::to_owned),
    };
    app.store.create_review(author, &review).await.unwrap();
}

// =============================================================================
// Detail Page
// =============================================================================

#[tokio::test]
async fn test_detail_without_reviews_has_no_rating() {
    let app = TestApp::new();
    let id = app.seed_shop("Blue Bottle", "1 Market St").await;

    let response = app.get(&format!("/shop/{id}"), None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Blue Bottle"));
    assert!(response.body.contains("No ratings yet"));
    assert!(response.body.contains("No comments yet."));
}

#[tokio::test]
async fn test_detail_shows_mean_rating_and_only_commented_reviews() {
    let app = TestApp::new();
    let id = app.seed_shop("Blue Bottle", "1 Market St").await;
    let other = app.seed_shop("Green Cup", "456 Red St").await;

    add_review(&app, id, 5, Some("Silky flat white")).await;
    add_review(&app, id, 2, None).await;
    add_review(&app, other, 1, Some("Burnt beans")).await;

    let response = app.get(&format!("/shop/{id}"), None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Rated 3.5 / 5 from 2 reviews"));
    assert!(response.body.contains("Silky flat white"));
    assert!(!response.body.contains("Burnt beans"));
    assert_eq!(response.body.matches("<li>").count(), 1);
}

#[tokio::test]
async fn test_detail_unknown_or_non_numeric_id_is_404() {
    let app = TestApp::new();
    app.seed_shop("Blue Bottle", "1 Market St").await;

    assert_eq!(app.get("/shop/999", None).await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.get("/shop/abc", None).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_not_found_page_keeps_logged_in_navigation() {
    let app = TestApp::new();
    let cookie = app.register("regular@example.com").await;

    let response = app.get("/shop/999", Some(&cookie)).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.body.contains("Shop 999 not found."));
    assert!(response.body.contains("regular@example.com"));
    assert!(response.body.contains("Log out"));

    let anonymous = app.get("/shop/999", None).await;
    assert!(anonymous.body.contains("Log in"));
    assert!(!anonymous.body.contains("Log out"));
}

#[tokio::test]
async fn test_error_page_shows_request_id() {
    let app = TestApp::new();

    let response = app.get("/shop/999", None).await;

    let request_id = response.headers["x-request-id"].to_str().unwrap();
    assert!(response.body.contains(&format!("<code>{request_id}</code>")));
}

// =============================================================================
// Search
// =============================================================================

#[tokio::test]
async fn test_search_without_query_shows_form_only() {
    let app = TestApp::new();
    app.seed_shop("Blue Bottle", "1 Market St").await;

    let response = app.get("/shop/search", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("name=\"q\""));
    assert!(!response.body.contains("class=\"results\""));
    assert!(!response.body.contains("No shops match"));
}

#[tokio::test]
async fn test_search_matches_name_or_address() {
    let app = TestApp::new();
    app.seed_shop("Blue Bottle", "1 Market St").await;
    app.seed_shop("Corner Cafe", "123 Blue Ave").await;
    app.seed_shop("Green Cup", "456 Red St").await;

    let response = app.get("/shop/search?q=Blue", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Blue Bottle"));
    assert!(response.body.contains("123 Blue Ave"));
    assert!(!response.body.contains("Green Cup"));
}

#[tokio::test]
async fn test_search_without_matches_is_empty_result() {
    let app = TestApp::new();
    app.seed_shop("Blue Bottle", "1 Market St").await;

    let response = app.get("/shop/search?q=espresso", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("No shops match"));
}

#[tokio::test]
async fn test_root_redirects_to_search() {
    let app = TestApp::new();
    let response = app.get("/", None).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), "/shop/search");
}

// =============================================================================
// Submission
// =============================================================================

#[tokio::test]
async fn test_create_shop_redirects_to_new_shop() {
    let app = TestApp::new();
    let cookie = app.register("owner@example.com").await;

    let response = app
        .post_multipart(
            "/shop/add",
            shop_form("Blue Bottle", "123 Blue Ave"),
            Some(&cookie),
        )
        .await;

    assert_eq!(response.status, StatusCode::SEE_OTHER, "{}", response.body);
    assert_eq!(response.location(), "/shop/1");
    assert_eq!(app.store.shop_count().await, 1);

    let shop = app.store.shop_by_id(ShopId::new(1)).await.unwrap().unwrap();
    assert_eq!(shop.name, "Blue Bottle");
    assert_eq!(shop.url, None);
    let owner = app
        .store
        .password_hash_by_email(&coffeeshop_core::Email::parse("owner@example.com").unwrap())
        .await
        .unwrap()
        .unwrap()
        .0;
    assert_eq!(shop.user_id, owner.id);
}

#[tokio::test]
async fn test_create_shop_with_bad_latitude_rerenders_form() {
    let app = TestApp::new();
    let cookie = app.register("owner@example.com").await;

    let form = Multipart::new()
        .text("name", "Blue Bottle")
        .text("address", "123 Blue Ave")
        .text("latitude", "north")
        .text("longitude", "-122.4194");
    let response = app.post_multipart("/shop/add", form, Some(&cookie)).await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("Latitude must be a number"));
    assert!(response.body.contains("value=\"Blue Bottle\""));
    assert_eq!(app.store.shop_count().await, 0);
}

#[tokio::test]
async fn test_create_shop_sanitizes_photo_name() {
    let app = TestApp::new();
    let cookie = app.register("owner@example.com").await;

    let form = shop_form("Blue Bottle", "123 Blue Ave").file(
        "photo",
        "../../etc/front door.png",
        "image/png",
        b"\x89PNG\r\n",
    );
    let response = app.post_multipart("/shop/add", form, Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER, "{}", response.body);

    let names = app.photos.names().await;
    assert_eq!(names, ["1-etc_front_door.png"]);
    assert_eq!(
        app.photos.get("1-etc_front_door.png").await.unwrap().as_ref(),
        b"\x89PNG\r\n"
    );

    let page = app.get(response.location(), None).await;
    assert!(page.body.contains("src=\"/uploads/1-etc_front_door.png\""));
}

#[tokio::test]
async fn test_create_shop_rejects_unsupported_photo() {
    let app = TestApp::new();
    let cookie = app.register("owner@example.com").await;

    let form = shop_form("Blue Bottle", "123 Blue Ave").file(
        "photo",
        "menu.exe",
        "application/octet-stream",
        b"MZ",
    );
    let response = app.post_multipart("/shop/add", form, Some(&cookie)).await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(app.photos.names().await.is_empty());
    assert_eq!(app.store.shop_count().await, 0);
}

#[tokio::test]
async fn test_create_shop_requires_login() {
    let app = TestApp::new();

    let response = app
        .post_multipart("/shop/add", shop_form("Blue Bottle", "123 Blue Ave"), None)
        .await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), "/auth/login?next=%2Fshop%2Fadd");
    assert_eq!(app.store.shop_count().await, 0);
}

#[tokio::test]
async fn test_new_shop_form_requires_login() {
    let app = TestApp::new();

    let response = app.get("/shop/add", None).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);

    let cookie = app.register("owner@example.com").await;
    let response = app.get("/shop/add", Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("enctype=\"multipart/form-data\""));
}
