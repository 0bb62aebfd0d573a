//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! coffee-cli migrate
//! ```
//!
//! # Migration Files
//!
//! Migrations live in `crates/web/migrations/`:
//! ```text
//! migrations/
//! ├── 20260301000001_create_users.sql
//! ├── 20260301000002_create_shops.sql
//! ├── 20260301000003_create_reviews.sql
//! └── 20260301000004_create_sessions.sql
//! ```

use coffeeshop_web::db::create_pool;

use super::{CommandError, database_url};

/// Run all pending migrations.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let database_url = database_url()?;

    tracing::info!("Connecting to database...");
    let pool = create_pool(&database_url).await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../web/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
