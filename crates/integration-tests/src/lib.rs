//! Integration tests for the coffee shop site.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process router tests (no database needed)
//! cargo test -p coffeeshop-integration-tests
//!
//! # Including the PostgreSQL store tests
//! COFFEESHOP_DATABASE_URL=postgres://... cargo test -p coffeeshop-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `shops` - Detail, search and shop submission pages
//! - `reviews` - Review form and submission
//! - `auth` - Login, registration, protected routes
//! - `postgres` - `PgStore` against a migrated database
//!
//! [`TestApp`] builds the full router over an in-memory store, in-memory
//! photo storage and in-memory sessions, and drives it with
//! `tower::ServiceExt::oneshot`.

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use secrecy::SecretString;
use tower::ServiceExt;
use url::form_urlencoded;

use coffeeshop_core::{Email, Latitude, Longitude, ShopId, UserId};
use coffeeshop_web::config::{DEFAULT_MAX_UPLOAD_BYTES, WebConfig};
use coffeeshop_web::db::{MemoryStore, ShopRepository, UserRepository};
use coffeeshop_web::middleware::{SESSION_COOKIE_NAME, create_session_layer};
use coffeeshop_web::models::NewShop;
use coffeeshop_web::routes;
use coffeeshop_web::state::AppState;
use coffeeshop_web::storage::MemoryPhotoStorage;

/// Boundary used by [`Multipart`] bodies.
pub const BOUNDARY: &str = "coffeeshop-test-boundary";

/// Password used by [`TestApp::register`].
pub const PASSWORD: &str = "correct horse battery";

/// A response with its body read into a string.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// The `Location` header of a redirect.
    #[must_use]
    pub fn location(&self) -> &str {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    /// The `name=value` part of the session cookie, if one was set.
    #[must_use]
    pub fn session_cookie(&self) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.split(';').next())
            .find(|pair| pair.starts_with(&format!("{SESSION_COOKIE_NAME}=")))
            .map(str::to_owned)
    }
}

/// The whole site wired to in-memory backends.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub photos: Arc<MemoryPhotoStorage>,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let photos = Arc::new(MemoryPhotoStorage::new());
        let config = test_config();

        let session_layer =
            create_session_layer(tower_sessions::MemoryStore::default(), &config);
        let state = AppState::new(config, store.clone(), photos.clone());

        Self {
            router: routes::app(state, session_layer),
            store,
            photos,
        }
    }

    /// Send a request through the router.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        let mut builder = Request::get(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// POST an urlencoded form. `fields` are encoded here.
    pub async fn post_form(
        &self,
        uri: &str,
        fields: &[(&str, &str)],
        cookie: Option<&str>,
    ) -> TestResponse {
        let body = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();

        let mut builder = Request::post(uri).header(
            header::CONTENT_TYPE,
            "application/x-www-form-urlencoded",
        );
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body)).unwrap()).await
    }

    pub async fn post_multipart(
        &self,
        uri: &str,
        body: Multipart,
        cookie: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::post(uri).header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body.finish())).unwrap())
            .await
    }

    /// Register a user through the site and return their session cookie.
    pub async fn register(&self, email: &str) -> String {
        let response = self
            .post_form(
                "/auth/register",
                &[
                    ("email", email),
                    ("password", PASSWORD),
                    ("password_confirm", PASSWORD),
                ],
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::SEE_OTHER, "{}", response.body);
        response.session_cookie().expect("session cookie")
    }

    /// Insert a shop straight into the store, owned by a fresh user.
    pub async fn seed_shop(&self, name: &str, address: &str) -> ShopId {
        let owner = self.seed_owner().await;
        let shop = NewShop {
            name: name.to_owned(),
            address: address.to_owned(),
            url: None,
            latitude: Latitude::parse("37.77").unwrap(),
            longitude: Longitude::parse("-122.42").unwrap(),
        };
        self.store.create_shop(owner, &shop, None).await.unwrap().id
    }

    async fn seed_owner(&self) -> UserId {
        let email = Email::parse("seed@example.com").unwrap();
        if let Some((user, _)) = self.store.password_hash_by_email(&email).await.unwrap() {
            return user.id;
        }
        self.store.create_user(&email, "unused").await.unwrap().id
    }
}

/// Builds a `multipart/form-data` body.
#[derive(Debug, Default)]
pub struct Multipart {
    body: Vec<u8>,
}

impl Multipart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    #[must_use]
    pub fn file(mut self, name: &str, filename: &str, content_type: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.body
    }
}

/// A complete, valid shop submission.
#[must_use]
pub fn shop_form(name: &str, address: &str) -> Multipart {
    Multipart::new()
        .text("name", name)
        .text("address", address)
        .text("url", "")
        .text("latitude", "37.7749")
        .text("longitude", "-122.4194")
}

fn test_config() -> WebConfig {
    WebConfig {
        database_url: SecretString::from("postgres://unused"),
        host: [127, 0, 0, 1].into(),
        port: 5000,
        base_url: "http://localhost:5000".to_owned(),
        upload_dir: std::env::temp_dir().join("coffeeshop-test-uploads"),
        max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}
