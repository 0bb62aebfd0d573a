//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Redirect to shop search
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (store ping)
//!
//! # Shops
//! GET  /shop/search?q=         - Search form and results
//! GET  /shop/{id}              - Shop detail with average rating and comments
//! GET  /shop/add               - New shop form (requires auth)
//! POST /shop/add               - Create shop, multipart with optional photo (requires auth)
//!
//! # Reviews
//! GET  /review/add?shop_id=    - Review form (requires auth)
//! POST /review/add             - Create review (requires auth)
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action
//! GET  /auth/register          - Register page
//! POST /auth/register          - Register action
//! POST /auth/logout            - Logout action
//!
//! # Files
//! GET  /uploads/*              - Shop photos
//! GET  /static/*               - Stylesheet
//! ```

pub mod auth;
pub mod health;
pub mod reviews;
pub mod shops;

use axum::{
    Router,
    extract::{DefaultBodyLimit, Request},
    middleware,
    response::Redirect,
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::error::render_error_page;
use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
}

/// Create the shop routes router.
///
/// `max_upload_bytes` caps the body of the multipart shop submission.
pub fn shop_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/search", get(shops::search))
        .route(
            "/add",
            get(shops::new_page)
                .post(shops::create)
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/{id}", get(shops::show))
}

/// Create the review routes router.
pub fn review_routes() -> Router<AppState> {
    Router::new().route("/add", get(reviews::new_page).post(reviews::create))
}

/// Create all page routes.
pub fn routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/shop/search") }))
        .nest("/shop", shop_routes(max_upload_bytes))
        .nest("/review", review_routes())
        .nest("/auth", auth_routes())
}

/// Build the complete application router.
///
/// Sentry layers are added by the binary on top of this.
pub fn app<S>(state: AppState, session_layer: SessionManagerLayer<S>) -> Router
where
    S: SessionStore + Clone,
{
    let config = state.config();
    let upload_dir = config.upload_dir.clone();
    let max_upload_bytes = config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(routes(max_upload_bytes))
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .nest_service(
            "/static",
            ServeDir::new(concat!(env!("CARGO_MANIFEST_DIR"), "/static")),
        )
        .layer(middleware::from_fn(render_error_page))
        .layer(session_layer)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}
