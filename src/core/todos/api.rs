//! Todo API endpoints
//!
//! Provides REST API endpoints for todo management (auth required on all):
//! - GET /todos - List the caller's todos (`skip`/`limit` pagination)
//! - POST /todos - Create a todo and schedule a notification
//! - PUT /todos/{id} - Partially update a todo
//! - DELETE /todos/{id} - Delete a todo

use axum::{
    Json, Router,
    extract::{FromRef, Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::core::auth::api::ApiError;
use crate::core::auth::{AuthService, CurrentUser};
use crate::core::db::models::{CreateTodo, Todo, UpdateTodo};
use crate::core::db::repositories::{TodoRepository, TodoRepositoryError};
use crate::core::notifications::Notifier;

/// Default page size for listing todos
pub const DEFAULT_LIMIT: i64 = 100;

/// Largest page size a client may request
pub const MAX_LIMIT: i64 = 100;

/// Todo API state
#[derive(Clone)]
pub struct TodoApiState {
    pub todo_repo: TodoRepository,
    pub auth_service: AuthService,
    pub notifier: Notifier,
}

impl FromRef<Arc<TodoApiState>> for AuthService {
    fn from_ref(state: &Arc<TodoApiState>) -> Self {
        state.auth_service.clone()
    }
}

/// Todo API error types
#[derive(Debug, thiserror::Error)]
pub enum TodoApiError {
    #[error("Todo not found")]
    NotFound,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<TodoRepositoryError> for TodoApiError {
    fn from(err: TodoRepositoryError) -> Self {
        match err {
            TodoRepositoryError::NotFound => TodoApiError::NotFound,
            TodoRepositoryError::DatabaseError(e) => TodoApiError::InternalError(e.to_string()),
        }
    }
}

impl IntoResponse for TodoApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            TodoApiError::NotFound => (StatusCode::NOT_FOUND, "TODO_NOT_FOUND"),
            TodoApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            TodoApiError::InvalidBody(rejection) => (rejection.status(), "INVALID_BODY"),
            TodoApiError::InternalError(reason) => {
                tracing::error!("Todo request failed: {}", reason);
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let body = ApiError::new(self.to_string(), code);

        (status, Json(body)).into_response()
    }
}

// ============================================================================
// Request/Response DTOs
// ============================================================================

/// Query parameters for listing todos
#[derive(Debug, Deserialize, Default)]
pub struct ListTodosQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl ListTodosQuery {
    /// Resolve to `(offset, limit)`; the limit is clamped to 1..=MAX_LIMIT
    fn resolve(&self) -> Result<(i64, i64), TodoApiError> {
        let skip = self.skip.unwrap_or(0);
        if skip < 0 {
            return Err(TodoApiError::BadRequest(
                "skip must not be negative".to_string(),
            ));
        }

        let limit = self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

        Ok((skip, limit))
    }
}

/// Response for delete operation
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

fn validate_title(title: &str) -> Result<String, TodoApiError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(TodoApiError::BadRequest(
            "Todo title cannot be empty".to_string(),
        ));
    }
    Ok(title.to_string())
}

// ============================================================================
// Router
// ============================================================================

/// Create the todo API router
pub fn todo_api_router(state: TodoApiState) -> Router {
    let state = Arc::new(state);

    Router::new()
        .route("/todos", get(list_todos_handler).post(create_todo_handler))
        .route(
            "/todos/{id}",
            put(update_todo_handler).delete(delete_todo_handler),
        )
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /todos
async fn list_todos_handler(
    State(state): State<Arc<TodoApiState>>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ListTodosQuery>,
) -> Result<Json<Vec<Todo>>, TodoApiError> {
    let (skip, limit) = query.resolve()?;

    tracing::debug!(
        "Listing todos for user {}, skip: {}, limit: {}",
        user.id,
        skip,
        limit
    );

    let todos = state.todo_repo.list_by_owner(user.id, skip, limit).await?;

    Ok(Json(todos))
}

/// POST /todos
async fn create_todo_handler(
    State(state): State<Arc<TodoApiState>>,
    CurrentUser(user): CurrentUser,
    body: Result<Json<CreateTodo>, JsonRejection>,
) -> Result<Json<Todo>, TodoApiError> {
    let Json(request) = body?;
    let dto = CreateTodo {
        title: validate_title(&request.title)?,
        ..request
    };

    let todo = state.todo_repo.create(user.id, &dto).await?;

    tracing::info!("Todo {} created for user {}", todo.id, user.id);

    state.notifier.todo_created(user.email, todo.title.clone());

    Ok(Json(todo))
}

/// PUT /todos/{id}
async fn update_todo_handler(
    State(state): State<Arc<TodoApiState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    body: Result<Json<UpdateTodo>, JsonRejection>,
) -> Result<Json<Todo>, TodoApiError> {
    let Json(request) = body?;
    let title = match &request.title {
        Some(title) => Some(validate_title(title)?),
        None => None,
    };
    let updates = UpdateTodo { title, ..request };

    let todo = state.todo_repo.update(id, user.id, &updates).await?;

    tracing::info!("Todo {} updated by user {}", id, user.id);

    Ok(Json(todo))
}

/// DELETE /todos/{id}
async fn delete_todo_handler(
    State(state): State<Arc<TodoApiState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, TodoApiError> {
    state.todo_repo.delete(id, user.id).await?;

    tracing::info!("Todo {} deleted by user {}", id, user.id);

    Ok(Json(MessageResponse {
        message: "Todo deleted successfully".to_string(),
    }))
}
