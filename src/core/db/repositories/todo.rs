//! Todo repository for database operations
//!
//! Every query is scoped by owner: a todo that belongs to someone else is
//! reported exactly like one that does not exist.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::core::db::models::{CreateTodo, Todo, UpdateTodo};

/// Todo repository error types
#[derive(Debug, thiserror::Error)]
pub enum TodoRepositoryError {
    #[error("Todo not found")]
    NotFound,

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Todo repository for database operations
#[derive(Clone)]
pub struct TodoRepository {
    pool: SqlitePool,
}

impl TodoRepository {
    /// Create a new todo repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a todo for `owner_id`
    pub async fn create(&self, owner_id: i64, dto: &CreateTodo) -> Result<Todo, TodoRepositoryError> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO todos (title, description, completed, owner_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&dto.title)
        .bind(&dto.description)
        .bind(dto.completed)
        .bind(owner_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.find_by_id_and_owner(result.last_insert_rowid(), owner_id)
            .await?
            .ok_or(TodoRepositoryError::NotFound)
    }

    /// Find a todo by ID with ownership check
    pub async fn find_by_id_and_owner(
        &self,
        id: i64,
        owner_id: i64,
    ) -> Result<Option<Todo>, TodoRepositoryError> {
        let todo = sqlx::query_as::<_, Todo>(
            r#"
            SELECT id, title, description, completed, owner_id, created_at, updated_at
            FROM todos
            WHERE id = ? AND owner_id = ?
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(todo)
    }

    /// List an owner's todos in creation order
    pub async fn list_by_owner(
        &self,
        owner_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Todo>, TodoRepositoryError> {
        let todos = sqlx::query_as::<_, Todo>(
            r#"
            SELECT id, title, description, completed, owner_id, created_at, updated_at
            FROM todos
            WHERE owner_id = ?
            ORDER BY id ASC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(owner_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(todos)
    }

    /// Apply a partial update; fields left as `None` keep their value.
    /// An update with no fields leaves the row, including `updated_at`, untouched.
    pub async fn update(
        &self,
        id: i64,
        owner_id: i64,
        updates: &UpdateTodo,
    ) -> Result<Todo, TodoRepositoryError> {
        if updates.is_empty() {
            return self
                .find_by_id_and_owner(id, owner_id)
                .await?
                .ok_or(TodoRepositoryError::NotFound);
        }

        let result = sqlx::query(
            r#"
            UPDATE todos
            SET
                title = COALESCE(?, title),
                description = COALESCE(?, description),
                completed = COALESCE(?, completed),
                updated_at = ?
            WHERE id = ? AND owner_id = ?
            "#,
        )
        .bind(&updates.title)
        .bind(&updates.description)
        .bind(updates.completed)
        .bind(Utc::now())
        .bind(id)
        .bind(owner_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(TodoRepositoryError::NotFound);
        }

        self.find_by_id_and_owner(id, owner_id)
            .await?
            .ok_or(TodoRepositoryError::NotFound)
    }

    /// Delete a todo, returning the removed row
    pub async fn delete(&self, id: i64, owner_id: i64) -> Result<Todo, TodoRepositoryError> {
        let todo = self
            .find_by_id_and_owner(id, owner_id)
            .await?
            .ok_or(TodoRepositoryError::NotFound)?;

        sqlx::query(
            r#"
            DELETE FROM todos
            WHERE id = ? AND owner_id = ?
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .execute(&self.pool)
        .await?;

        Ok(todo)
    }

    /// Count an owner's todos
    pub async fn count_by_owner(&self, owner_id: i64) -> Result<i64, TodoRepositoryError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM todos WHERE owner_id = ?")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}
