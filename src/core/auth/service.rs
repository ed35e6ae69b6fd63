//! Authentication service
//!
//! Provides business logic for registration, login, and resolving a bearer
//! token back to the account it was issued for. Coordinates between the user
//! repository, the password hasher, and the JWT service.

use axum::extract::rejection::JsonRejection;

use crate::core::auth::jwt::{AccessToken, JwtError, JwtService};
use crate::core::auth::password::{MAX_PASSWORD_BYTES, PasswordError, PasswordHasher};
use crate::core::db::models::User;
use crate::core::db::repositories::{UserRepository, UserRepositoryError};

/// Authentication service error types
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Wrong password or unknown email; the two are never distinguished
    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("Email already registered")]
    EmailAlreadyExists,

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Password must not be empty")]
    EmptyPassword,

    #[error("Password must be at most {} bytes", MAX_PASSWORD_BYTES)]
    PasswordTooLong,

    #[error("Not authenticated")]
    MissingToken,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token expired")]
    TokenExpired,

    #[error("Malformed token")]
    MalformedToken,

    #[error("Token subject no longer exists")]
    UnknownSubject,

    /// Request body missing, not JSON, or the wrong shape
    #[error("Invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AuthError {
    /// Rejections that must answer 401 with a Bearer challenge
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidCredentials
                | AuthError::MissingToken
                | AuthError::InvalidSignature
                | AuthError::TokenExpired
                | AuthError::MalformedToken
                | AuthError::UnknownSubject
        )
    }
}

impl From<UserRepositoryError> for AuthError {
    fn from(err: UserRepositoryError) -> Self {
        match err {
            UserRepositoryError::EmailAlreadyExists => AuthError::EmailAlreadyExists,
            _ => AuthError::InternalError(err.to_string()),
        }
    }
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::InvalidSignature => AuthError::InvalidSignature,
            JwtError::Expired => AuthError::TokenExpired,
            JwtError::Malformed => AuthError::MalformedToken,
            _ => AuthError::InternalError(err.to_string()),
        }
    }
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::Empty => AuthError::EmptyPassword,
            PasswordError::TooLong => AuthError::PasswordTooLong,
            _ => AuthError::InternalError(err.to_string()),
        }
    }
}

/// Registration and login request data
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    hasher: PasswordHasher,
    jwt_service: JwtService,
}

impl AuthService {
    /// Create a new authentication service
    pub fn new(user_repo: UserRepository, hasher: PasswordHasher, jwt_service: JwtService) -> Self {
        Self {
            user_repo,
            hasher,
            jwt_service,
        }
    }

    /// Validate email format
    fn validate_email(email: &str) -> Result<(), AuthError> {
        if email.is_empty() || email.chars().any(char::is_whitespace) {
            return Err(AuthError::InvalidEmail);
        }

        // Check for valid structure: something@something.something
        let Some((local, domain)) = email.split_once('@') else {
            return Err(AuthError::InvalidEmail);
        };

        if local.is_empty() || domain.is_empty() || domain.contains('@') {
            return Err(AuthError::InvalidEmail);
        }

        if !domain.contains('.') || domain.split('.').any(str::is_empty) {
            return Err(AuthError::InvalidEmail);
        }

        Ok(())
    }

    /// Register a new user
    ///
    /// Duplicate emails are rejected before any hashing work is done.
    pub async fn register(&self, request: Credentials) -> Result<User, AuthError> {
        Self::validate_email(&request.email)?;
        if request.password.is_empty() {
            return Err(AuthError::EmptyPassword);
        }
        if request.password.len() > MAX_PASSWORD_BYTES {
            return Err(AuthError::PasswordTooLong);
        }

        if self.user_repo.find_by_email(&request.email).await?.is_some() {
            return Err(AuthError::EmailAlreadyExists);
        }

        let hasher = self.hasher;
        let password = request.password;
        let password_hash = tokio::task::spawn_blocking(move || hasher.derive(&password))
            .await
            .map_err(|e| AuthError::InternalError(e.to_string()))?
            .inspect_err(|e| tracing::error!("Password derivation failed: {}", e))?;

        let user = self.user_repo.create(&request.email, &password_hash).await?;

        Ok(user)
    }

    /// Check credentials and issue an access token
    pub async fn login(&self, request: Credentials) -> Result<AccessToken, AuthError> {
        let user = self
            .authenticate_credentials(&request.email, &request.password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let token = self.jwt_service.issue_access_token(&user.email)?;

        Ok(AccessToken::bearer(token))
    }

    /// Return the user if the email exists and the password matches it
    pub async fn authenticate_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, AuthError> {
        let Some(user) = self.user_repo.find_by_email(email).await? else {
            return Ok(None);
        };

        let hasher = self.hasher;
        let password = password.to_string();
        let password_hash = user.password_hash.clone();
        let is_valid =
            tokio::task::spawn_blocking(move || hasher.verify(&password, &password_hash))
                .await
                .map_err(|e| AuthError::InternalError(e.to_string()))?;

        if is_valid { Ok(Some(user)) } else { Ok(None) }
    }

    /// Resolve a bearer token to the account it was issued for
    pub async fn authenticate_token(&self, token: &str) -> Result<User, AuthError> {
        let email = self.jwt_service.validate(token)?;

        self.user_repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::UnknownSubject)
    }
}
