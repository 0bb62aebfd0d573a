//! CLI subcommands.
//!
//! # Environment Variables
//!
//! - `COFFEESHOP_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

pub mod migrate;
pub mod user;

use secrecy::SecretString;
use thiserror::Error;

/// Errors shared by the CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Account could not be created.
    #[error("Could not create user: {0}")]
    Auth(#[from] coffeeshop_web::services::AuthError),
}

/// Read the database URL, loading `.env` first.
fn database_url() -> Result<SecretString, CommandError> {
    dotenvy::dotenv().ok();

    std::env::var("COFFEESHOP_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("COFFEESHOP_DATABASE_URL"))
}
