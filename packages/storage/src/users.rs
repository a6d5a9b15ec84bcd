// ABOUTME: Local mirror of accounts owned by the identity provider
// ABOUTME: Lets orders reference users and resolves users by email for guest-order linking

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::{is_unique_violation_on, StorageError};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

pub struct UserStorage {
    pool: SqlitePool,
}

impl UserStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Record an account created by the identity provider
    pub async fn create_user(&self, email: &str, name: &str) -> Result<User, StorageError> {
        let user_id = format!("usr-{}", nanoid::nanoid!());
        let email = storefront_core::normalize_email(email);
        let now = Utc::now();

        debug!("Creating user: {} ({})", user_id, email);

        sqlx::query("INSERT INTO users (id, email, name, created_at) VALUES (?, ?, ?, ?)")
            .bind(&user_id)
            .bind(&email)
            .bind(name)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation_on(&e, "email") {
                    StorageError::Duplicate(email.clone())
                } else {
                    StorageError::Sqlx(e)
                }
            })?;

        self.get_user(&user_id).await
    }

    pub async fn get_user(&self, user_id: &str) -> Result<User, StorageError> {
        debug!("Fetching user: {}", user_id);

        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::from_query)?;

        self.row_to_user(&row)
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        debug!("Fetching user by email: {}", email);

        let row = sqlx::query("SELECT * FROM users WHERE email = ? COLLATE NOCASE")
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        match row {
            Some(r) => Ok(Some(self.row_to_user(&r)?)),
            None => Ok(None),
        }
    }

    fn row_to_user(&self, row: &sqlx::sqlite::SqliteRow) -> Result<User, StorageError> {
        Ok(User {
            id: row.try_get("id").map_err(StorageError::Sqlx)?,
            email: row.try_get("email").map_err(StorageError::Sqlx)?,
            name: row.try_get("name").map_err(StorageError::Sqlx)?,
            created_at: row.try_get("created_at").map_err(StorageError::Sqlx)?,
        })
    }
}
