//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! coffee-cli user create -e barista@example.com -p 'correct horse battery'
//! ```

use coffeeshop_web::db::{PgStore, create_pool};
use coffeeshop_web::services::AuthService;

use super::{CommandError, database_url};

/// Create a user with an email and password.
///
/// Goes through the same validation and hashing as the registration page.
///
/// # Returns
///
/// The ID of the created user.
///
/// # Errors
///
/// Returns `CommandError::Auth` if the email is invalid or taken, or the
/// password is too short.
pub async fn create(email: &str, password: &str) -> Result<i32, CommandError> {
    let database_url = database_url()?;

    tracing::info!("Connecting to database...");
    let pool = create_pool(&database_url).await?;
    let store = PgStore::new(pool);

    let user = AuthService::new(&store).register(email, password).await?;

    tracing::info!(
        "User created successfully! ID: {}, Email: {}",
        user.id,
        user.email
    );

    Ok(user.id.as_i32())
}
