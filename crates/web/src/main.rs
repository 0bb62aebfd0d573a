//! Coffee shop site - browse, search and review coffee shops.
//!
//! Serves the site on port 5000 by default. Shops, reviews, users and sessions
//! live in `PostgreSQL`; uploaded photos are kept in `UPLOAD_DIR` and served
//! under `/uploads`.
//!
//! Migrations are not applied here. Run `coffee-cli migrate` first.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;
use std::time::Duration;

use sentry::integrations::tracing::{self as sentry_tracing, EventFilter};
use tower_sessions::ExpiredDeletion;
use tower_sessions_sqlx_store::PostgresStore;
use tracing::Level;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use coffeeshop_web::config::WebConfig;
use coffeeshop_web::db::{self, PgStore};
use coffeeshop_web::middleware::create_session_layer;
use coffeeshop_web::routes;
use coffeeshop_web::state::AppState;
use coffeeshop_web::storage::LocalPhotoStorage;

/// How often expired rows are purged from `tower_sessions.session`.
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Start Sentry when a DSN is configured. The guard flushes on drop.
fn init_sentry(config: &WebConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_deref()?;

    let options = sentry::ClientOptions {
        release: sentry::release_name!(),
        environment: config.sentry_environment.clone().map(Into::into),
        sample_rate: config.sentry_sample_rate,
        traces_sample_rate: config.sentry_traces_sample_rate,
        attach_stacktrace: true,
        ..Default::default()
    };

    Some(sentry::init((dsn, options)))
}

/// Console logs filtered by `RUST_LOG`, with warnings and errors forwarded to
/// Sentry as events and info/debug lines kept as breadcrumbs.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "coffeeshop_web=info,tower_http=debug".into());

    let sentry_layer = sentry_tracing::layer().event_filter(|metadata| match *metadata.level() {
        Level::ERROR | Level::WARN => EventFilter::Event,
        Level::INFO | Level::DEBUG => EventFilter::Breadcrumb,
        _ => EventFilter::Ignore,
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_layer)
        .init();
}

#[tokio::main]
async fn main() {
    let config = WebConfig::from_env().expect("Failed to load configuration");

    // Sentry before tracing so the tracing layer has a client to report to
    let sentry_guard = init_sentry(&config);
    init_tracing();
    if sentry_guard.is_some() {
        tracing::info!("Sentry enabled");
    }

    let pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to connect to PostgreSQL");

    let photos = LocalPhotoStorage::new(config.upload_dir.clone());
    tracing::info!(upload_dir = %config.upload_dir.display(), "Storing photos on disk");

    let session_store = PostgresStore::new(pool.clone());
    let sweeper = tokio::spawn(
        session_store
            .clone()
            .continuously_delete_expired(SESSION_SWEEP_INTERVAL),
    );

    let state = AppState::new(
        config.clone(),
        Arc::new(PgStore::new(pool)),
        Arc::new(photos),
    );

    let app = routes::app(state, create_session_layer(session_store, &config))
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    tracing::info!(%addr, base_url = %config.base_url, "Coffee shop site listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    sweeper.abort();
    tracing::info!("Server stopped");
}

/// Resolve on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut terminate = signal(SignalKind::terminate()).expect("Failed to listen for SIGTERM");
        tokio::select! {
            result = tokio::signal::ctrl_c() => result.expect("Failed to listen for Ctrl+C"),
            _ = terminate.recv() => {}
        }
    }

    #[cfg(not(unix))]
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for Ctrl+C");

    tracing::info!("Shutting down");
}
