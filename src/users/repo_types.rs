use sqlx::FromRow;
use time::OffsetDateTime;

use super::errors::{UserError, UserResult};

/// Tier assigned to new members that do not pick one.
pub const DEFAULT_MEMBER_LEVEL: &str = "Bronze";

/// Loyalty-program member as stored in the `users` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub id: i64,                       // assigned by storage
    pub first_name: String,
    pub last_name: String,
    pub email: String,                 // unique across users
    pub phone: String,
    pub address: String,
    pub avatar: String,                // URL
    pub member_level: String,
    pub point_balance: i64,
    pub created_at: OffsetDateTime,    // never changes after insert
    pub updated_at: OffsetDateTime,
}

impl User {
    /// Checks required fields in a fixed order; the first missing one wins.
    pub fn validate(&self) -> UserResult<()> {
        if self.first_name.is_empty() {
            return Err(UserError::FirstNameRequired);
        }
        if self.last_name.is_empty() {
            return Err(UserError::LastNameRequired);
        }
        if self.email.is_empty() {
            return Err(UserError::EmailRequired);
        }
        Ok(())
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_active(&self) -> bool {
        !self.member_level.is_empty()
    }
}
