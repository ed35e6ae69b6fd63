//! Auth API endpoints
//!
//! Provides REST API endpoints for authentication:
//! - POST /register - Register a new user
//! - POST /token - Login and get a bearer token

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Serialize;
use std::sync::Arc;

use crate::core::auth::{AccessToken, AuthError, AuthService, Credentials};
use crate::core::db::models::UserResponse;

/// Auth API state containing the auth service
#[derive(Clone)]
pub struct AuthApiState {
    pub auth_service: AuthService,
}

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl ApiError {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }
}

/// Convert AuthError to API response
impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AuthError::InvalidBody(rejection) => (rejection.status(), "INVALID_BODY"),
            AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
            AuthError::EmailAlreadyExists => (StatusCode::BAD_REQUEST, "EMAIL_EXISTS"),
            AuthError::InvalidEmail => (StatusCode::BAD_REQUEST, "INVALID_EMAIL"),
            AuthError::EmptyPassword => (StatusCode::BAD_REQUEST, "EMPTY_PASSWORD"),
            AuthError::PasswordTooLong => (StatusCode::BAD_REQUEST, "PASSWORD_TOO_LONG"),
            AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "NOT_AUTHENTICATED"),
            AuthError::InvalidSignature => (StatusCode::UNAUTHORIZED, "INVALID_TOKEN"),
            AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "TOKEN_EXPIRED"),
            AuthError::MalformedToken => (StatusCode::UNAUTHORIZED, "MALFORMED_TOKEN"),
            AuthError::UnknownSubject => (StatusCode::UNAUTHORIZED, "UNKNOWN_SUBJECT"),
            AuthError::InternalError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        if let AuthError::InternalError(reason) = &self {
            tracing::error!("Auth request failed: {}", reason);
        }

        let body = ApiError::new(self.to_string(), code);
        let mut response = (status, Json(body)).into_response();

        if self.is_unauthorized() {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }

        response
    }
}

/// Create the auth API router
pub fn auth_api_router(state: AuthApiState) -> Router {
    let state = Arc::new(state);

    Router::new()
        .route("/register", post(register_handler))
        .route("/token", post(login_handler))
        .with_state(state)
}

/// POST /register
/// Register a new user
async fn register_handler(
    State(state): State<Arc<AuthApiState>>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<UserResponse>, AuthError> {
    let Json(request) = body?;
    tracing::info!("Registration attempt for email: {}", request.email);

    let user = state.auth_service.register(request).await?;

    tracing::info!("User registered successfully: {}", user.email);

    Ok(Json(user.into()))
}

/// POST /token
/// Login and get a bearer token
async fn login_handler(
    State(state): State<Arc<AuthApiState>>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<AccessToken>, AuthError> {
    let Json(request) = body?;
    tracing::info!("Login attempt for email: {}", request.email);

    let email = request.email.clone();
    let token = state.auth_service.login(request).await.inspect_err(|e| {
        tracing::debug!("Login rejected for {}: {}", email, e);
    })?;

    tracing::info!("User logged in successfully: {}", email);

    Ok(Json(token))
}
