//! User accounts.

use chrono::{DateTime, Utc};

use coffeeshop_core::{Email, UserId};

/// A registered user.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub created_at: DateTime<Utc>,
}
