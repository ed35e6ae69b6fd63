//! Authentication module for the todo service
//!
//! This module provides authentication functionality including:
//! - bcrypt password derivation and verification
//! - JWT access token issuing and validation
//! - User registration and login
//! - Bearer token extraction for protected routes

pub mod api;
pub mod extractor;
pub mod jwt;
pub mod password;
pub mod service;

pub use api::{AuthApiState, auth_api_router};
pub use extractor::CurrentUser;
pub use jwt::{AccessToken, Claims, JwtConfig, JwtError, JwtService};
pub use password::{PasswordError, PasswordHasher};
pub use service::{AuthError, AuthService, Credentials};
