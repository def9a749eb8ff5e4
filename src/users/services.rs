use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use super::errors::{UserError, UserResult};
use super::repo::UserGateway;
use super::repo_types::{User, DEFAULT_MEMBER_LEVEL};

/// Fields accepted when enrolling a member.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateUserInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub avatar: String,
    pub member_level: String,
    pub point_balance: i64,
}

/// Complete replacement for a member's mutable fields. Omitted values
/// overwrite the stored ones with empty strings / zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateUserInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub avatar: String,
    pub member_level: String,
    pub point_balance: i64,
}

/// Business rules for the user lifecycle.
///
/// The duplicate-email check on create is a read before the insert, so two
/// concurrent requests can both pass it; the unique constraint in storage is
/// what finally rejects the loser (as [`UserError::Storage`]).
#[derive(Clone)]
pub struct UserService {
    gateway: Arc<dyn UserGateway>,
}

impl UserService {
    pub fn new(gateway: Arc<dyn UserGateway>) -> Self {
        Self { gateway }
    }

    pub async fn get_all_users(&self) -> UserResult<Vec<User>> {
        self.gateway.find_all().await
    }

    pub async fn get_user_by_id(&self, id: i64) -> UserResult<User> {
        ensure_valid_id(id)?;
        self.gateway
            .find_by_id(id)
            .await?
            .ok_or(UserError::UserNotFound)
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create_user(&self, mut input: CreateUserInput) -> UserResult<User> {
        if input.member_level.is_empty() {
            input.member_level = DEFAULT_MEMBER_LEVEL.to_string();
        }

        let now = OffsetDateTime::now_utc();
        let user = User {
            id: 0,
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            phone: input.phone,
            address: input.address,
            avatar: input.avatar,
            member_level: input.member_level,
            point_balance: input.point_balance,
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = user.validate() {
            warn!(error = %e, "create rejected");
            return Err(e);
        }

        if self.gateway.find_by_email(&user.email).await?.is_some() {
            warn!("email already registered");
            return Err(UserError::DuplicateEmail);
        }

        let created = self.gateway.create(user).await?;
        info!(
            user_id = created.id,
            full_name = %created.full_name(),
            member_level = %created.member_level,
            "user created"
        );
        Ok(created)
    }

    #[instrument(skip(self, input))]
    pub async fn update_user(&self, id: i64, input: UpdateUserInput) -> UserResult<User> {
        ensure_valid_id(id)?;

        let mut user = self
            .gateway
            .find_by_id(id)
            .await?
            .ok_or(UserError::UserNotFound)?;

        user.first_name = input.first_name;
        user.last_name = input.last_name;
        user.email = input.email;
        user.phone = input.phone;
        user.address = input.address;
        user.avatar = input.avatar;
        user.member_level = input.member_level;
        user.point_balance = input.point_balance;
        user.updated_at = OffsetDateTime::now_utc();

        if let Err(e) = user.validate() {
            warn!(error = %e, "update rejected");
            return Err(e);
        }

        // Row removed since the lookup: report what was sent.
        let stored = self.gateway.update(&user).await?.unwrap_or(user);
        info!(
            user_id = stored.id,
            active = stored.is_active(),
            point_balance = stored.point_balance,
            "user updated"
        );
        Ok(stored)
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: i64) -> UserResult<()> {
        ensure_valid_id(id)?;

        if self.gateway.find_by_id(id).await?.is_none() {
            return Err(UserError::UserNotFound);
        }

        self.gateway.delete(id).await?;
        info!(user_id = id, "user deleted");
        Ok(())
    }
}

fn ensure_valid_id(id: i64) -> UserResult<()> {
    if id <= 0 {
        return Err(UserError::InvalidUserId);
    }
    Ok(())
}
