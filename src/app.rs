//! HTTP application assembly
//!
//! Wires repositories and services onto one router: the public auth routes,
//! the protected todo routes and a root liveness endpoint.

use axum::{Json, Router, routing::get};
use serde::Serialize;
use sqlx::SqlitePool;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;

use crate::core::auth::{AuthApiState, AuthService, JwtService, PasswordHasher, auth_api_router};
use crate::core::db::{TodoRepository, UserRepository};
use crate::core::notifications::Notifier;
use crate::core::todos::{TodoApiState, todo_api_router};

/// Root endpoint payload
#[derive(Debug, Serialize)]
pub struct StatusMessage {
    pub message: &'static str,
}

/// GET /
async fn root_handler() -> Json<StatusMessage> {
    Json(StatusMessage {
        message: "Todo API is running!",
    })
}

/// Build the full application router over an already-migrated pool
pub fn build_app(
    pool: SqlitePool,
    jwt_service: JwtService,
    hasher: PasswordHasher,
    notifier: Notifier,
) -> Router {
    let auth_service = AuthService::new(UserRepository::new(pool.clone()), hasher, jwt_service);

    let auth_api = auth_api_router(AuthApiState {
        auth_service: auth_service.clone(),
    });

    let todo_api = todo_api_router(TodoApiState {
        todo_repo: TodoRepository::new(pool),
        auth_service,
        notifier,
    });

    Router::new()
        .route("/", get(root_handler))
        .merge(auth_api)
        .merge(todo_api)
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new().br(true).gzip(true))
}
