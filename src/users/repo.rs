use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use super::errors::UserResult;
use super::repo_types::User;

/// Durable storage for users.
///
/// Lookups report a missing row as `Ok(None)`, never as an error. Business
/// rules (validation, uniqueness pre-checks, existence checks before writes)
/// live in the service, not here.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserGateway: Send + Sync {
    /// All users, newest id first.
    async fn find_all(&self) -> UserResult<Vec<User>>;

    async fn find_by_id(&self, id: i64) -> UserResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>>;

    /// Inserts the user and returns the stored row with its generated id.
    /// The incoming `id` is ignored.
    async fn create(&self, user: User) -> UserResult<User>;

    /// Overwrites every mutable column of the row with `user.id` and returns
    /// the row as stored, or `None` when no such row exists.
    async fn update(&self, user: &User) -> UserResult<Option<User>>;

    /// Removes the row if present; deleting a missing id is not an error.
    async fn delete(&self, id: i64) -> UserResult<()>;
}

const USER_COLUMNS: &str = "id, first_name, last_name, email, phone, address, avatar, \
                            member_level, point_balance, created_at, updated_at";

#[derive(Clone)]
pub struct PgUserGateway {
    db: PgPool,
}

impl PgUserGateway {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserGateway for PgUserGateway {
    async fn find_all(&self) -> UserResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id DESC"
        ))
        .fetch_all(&self.db)
        .await?;
        debug!(count = users.len(), "users loaded");
        Ok(users)
    }

    async fn find_by_id(&self, id: i64) -> UserResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        debug!(user_id = id, found = user.is_some(), "find user by id");
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        debug!(found = user.is_some(), "find user by email");
        Ok(user)
    }

    async fn create(&self, user: User) -> UserResult<User> {
        let created = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (first_name, last_name, email, phone, address, avatar,
                               member_level, point_balance, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.address)
        .bind(&user.avatar)
        .bind(&user.member_level)
        .bind(user.point_balance)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.db)
        .await?;
        debug!(user_id = created.id, "user row inserted");
        Ok(created)
    }

    async fn update(&self, user: &User) -> UserResult<Option<User>> {
        let stored = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
               SET first_name = $1, last_name = $2, email = $3, phone = $4, address = $5,
                   avatar = $6, member_level = $7, point_balance = $8, updated_at = $9
             WHERE id = $10
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.address)
        .bind(&user.avatar)
        .bind(&user.member_level)
        .bind(user.point_balance)
        .bind(user.updated_at)
        .bind(user.id)
        .fetch_optional(&self.db)
        .await?;
        debug!(user_id = user.id, found = stored.is_some(), "user row updated");
        Ok(stored)
    }

    async fn delete(&self, id: i64) -> UserResult<()> {
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        debug!(user_id = id, rows = res.rows_affected(), "user row deleted");
        Ok(())
    }
}
