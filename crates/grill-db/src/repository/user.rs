//! # User Repository
//!
//! Customer and staff profiles. Authentication lives upstream; this table
//! only gives carts, orders and movements something to reference and
//! supplies the invoice's contact block.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use grill_core::input::NewUser;
use grill_core::User;

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Registers a profile. `input` must already be validated.
    pub async fn create(&self, input: NewUser) -> DbResult<User> {
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: input.email,
            name: input.name,
            phone: input.phone,
            address: input.address,
            is_staff: input.is_staff,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO users (id, email, name, phone, address, is_staff, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.phone)
        .bind(&user.address)
        .bind(user.is_staff)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value("email", &user.email))?;

        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        debug!(user_id = %id, "Fetching user");

        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, phone, address, is_staff, created_at
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Like [`get_by_id`](Self::get_by_id) but a missing user is an error.
    pub async fn require(&self, id: &str) -> DbResult<User> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("User", id))
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig, DbError};
    use grill_core::input::NewUser;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            name: "Ana".to_string(),
            phone: None,
            address: Some("Calle 10".to_string()),
            is_staff: false,
        }
    }

    #[tokio::test]
    async fn test_create_and_fetch() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = db.users().create(new_user("ana@example.com")).await.unwrap();

        let fetched = db.users().require(&user.id).await.unwrap();
        assert_eq!(fetched.email, "ana@example.com");
        assert_eq!(fetched.address.as_deref(), Some("Calle 10"));
        assert!(!fetched.is_staff);
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.users().create(new_user("ana@example.com")).await.unwrap();

        let err = db.users().create(new_user("ana@example.com")).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { ref field, .. } if field == "email"));
    }

    #[tokio::test]
    async fn test_missing_user() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.users().get_by_id("nope").await.unwrap().is_none());
        assert!(matches!(
            db.users().require("nope").await,
            Err(DbError::NotFound { .. })
        ));
    }
}
