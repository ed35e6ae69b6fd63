//! Bearer token extraction for protected routes
//!
//! `CurrentUser` runs before any handler logic: it reads the
//! `Authorization: Bearer <token>` header, validates the token, and resolves
//! the subject to a stored account. Any failure rejects the request with the
//! matching `AuthError`.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header, request::Parts},
};

use crate::core::auth::{AuthError, AuthService};
use crate::core::db::models::User;

/// The account that owns the current request
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    AuthService: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)?;
        let auth_service = AuthService::from_ref(state);

        let user = auth_service
            .authenticate_token(&token)
            .await
            .inspect_err(|e| tracing::debug!("Bearer token rejected: {}", e))?;

        Ok(CurrentUser(user))
    }
}

/// Extract Bearer token from Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<String, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    let Some((scheme, token)) = auth_header.split_once(' ') else {
        return Err(AuthError::MissingToken);
    };

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::MissingToken);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }

    Ok(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_extract_bearer_token_valid() {
        let token = extract_bearer_token(&headers_with("Bearer my_token_123")).unwrap();
        assert_eq!(token, "my_token_123");
    }

    #[test]
    fn test_extract_bearer_token_scheme_case_insensitive() {
        let token = extract_bearer_token(&headers_with("bearer abc.def.ghi")).unwrap();
        assert_eq!(token, "abc.def.ghi");
    }

    #[test]
    fn test_extract_bearer_token_missing_header() {
        let result = extract_bearer_token(&HeaderMap::new());
        assert!(matches!(result, Err(AuthError::MissingToken)));
    }

    #[test]
    fn test_extract_bearer_token_invalid_scheme() {
        let result = extract_bearer_token(&headers_with("Basic base64credentials"));
        assert!(matches!(result, Err(AuthError::MissingToken)));
    }

    #[test]
    fn test_extract_bearer_token_empty_token() {
        let result = extract_bearer_token(&headers_with("Bearer "));
        assert!(matches!(result, Err(AuthError::MissingToken)));

        let result = extract_bearer_token(&headers_with("Bearer"));
        assert!(matches!(result, Err(AuthError::MissingToken)));
    }
}
