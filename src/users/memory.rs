use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::errors::{UserError, UserResult};
use super::repo::UserGateway;
use super::repo_types::User;

/// In-memory gateway with the same contract as the Postgres one, including
/// the unique-email constraint and sequential ids starting at 1.
#[derive(Debug, Default)]
pub struct InMemoryUserGateway {
    inner: RwLock<Table>,
}

#[derive(Debug, Default)]
struct Table {
    last_id: i64,
    rows: BTreeMap<i64, User>,
}

impl InMemoryUserGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.rows.len()
    }
}

fn unique_violation() -> UserError {
    UserError::Storage(sqlx::Error::Protocol(
        "duplicate key value violates unique constraint \"users_email_key\"".into(),
    ))
}

#[async_trait]
impl UserGateway for InMemoryUserGateway {
    async fn find_all(&self) -> UserResult<Vec<User>> {
        let table = self.inner.read().await;
        Ok(table.rows.values().rev().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> UserResult<Option<User>> {
        Ok(self.inner.read().await.rows.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let table = self.inner.read().await;
        Ok(table.rows.values().find(|u| u.email == email).cloned())
    }

    async fn create(&self, mut user: User) -> UserResult<User> {
        let mut table = self.inner.write().await;
        if table.rows.values().any(|u| u.email == user.email) {
            return Err(unique_violation());
        }
        table.last_id += 1;
        user.id = table.last_id;
        table.rows.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: &User) -> UserResult<Option<User>> {
        let mut table = self.inner.write().await;
        if table
            .rows
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(unique_violation());
        }
        Ok(table.rows.get_mut(&user.id).map(|row| {
            *row = User {
                created_at: row.created_at,
                ..user.clone()
            };
            row.clone()
        }))
    }

    async fn delete(&self, id: i64) -> UserResult<()> {
        self.inner.write().await.rows.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;

    use super::*;

    fn draft(email: &str) -> User {
        let now = OffsetDateTime::now_utc();
        User {
            id: 0,
            first_name: "Jane".into(),
            last_name: "Roe".into(),
            email: email.into(),
            phone: String::new(),
            address: String::new(),
            avatar: String::new(),
            member_level: "Silver".into(),
            point_balance: 10,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn find_all_on_empty_store_is_empty() {
        let gw = InMemoryUserGateway::new();
        assert!(gw.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn find_all_orders_by_id_descending() {
        let gw = InMemoryUserGateway::new();
        gw.create(draft("a@example.com")).await.unwrap();
        gw.create(draft("b@example.com")).await.unwrap();
        gw.create(draft("c@example.com")).await.unwrap();

        let ids: Vec<i64> = gw.find_all().await.unwrap().iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn create_rejects_duplicate_email_as_storage_failure() {
        let gw = InMemoryUserGateway::new();
        gw.create(draft("a@example.com")).await.unwrap();
        let err = gw.create(draft("a@example.com")).await.unwrap_err();
        assert!(matches!(err, UserError::Storage(_)));
        assert_eq!(gw.len().await, 1);
    }

    #[tokio::test]
    async fn lookups_report_absent_rows_as_none() {
        let gw = InMemoryUserGateway::new();
        assert!(gw.find_by_id(42).await.unwrap().is_none());
        assert!(gw.find_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let gw = InMemoryUserGateway::new();
        let user = gw.create(draft("a@example.com")).await.unwrap();
        gw.delete(user.id).await.unwrap();
        gw.delete(user.id).await.unwrap();
        assert!(gw.find_by_id(user.id).await.unwrap().is_none());
    }
}
