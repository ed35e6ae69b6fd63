//! User repository for database operations
//!
//! Stores and looks up accounts. Password hashing happens before a hash ever
//! reaches this layer; the repository only sees derived hashes.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::core::db::models::User;

/// User repository error types
#[derive(Debug, thiserror::Error)]
pub enum UserRepositoryError {
    #[error("User not found")]
    NotFound,

    #[error("Email already exists")]
    EmailAlreadyExists,

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// User repository for database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Store a new account with an already derived password hash
    pub async fn create(&self, email: &str, password_hash: &str) -> Result<User, UserRepositoryError> {
        if self.find_by_email(email).await?.is_some() {
            return Err(UserRepositoryError::EmailAlreadyExists);
        }

        let result = sqlx::query(
            r#"
            INSERT INTO users (email, password_hash, is_active, created_at)
            VALUES (?, ?, 1, ?)
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            // A concurrent registration won the race for this email
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                UserRepositoryError::EmailAlreadyExists
            }
            e => UserRepositoryError::DatabaseError(e),
        })?;

        self.find_by_id(result.last_insert_rowid())
            .await?
            .ok_or(UserRepositoryError::NotFound)
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, UserRepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, is_active, created_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find a user by email (exact, case-sensitive match)
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserRepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, is_active, created_at
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Delete a user by ID; their todos go with them
    pub async fn delete(&self, id: i64) -> Result<bool, UserRepositoryError> {
        let result = sqlx::query(
            r#"
            DELETE FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Count total users
    pub async fn count(&self) -> Result<i64, UserRepositoryError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}
