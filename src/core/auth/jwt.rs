//! JWT utilities for token generation and validation
//!
//! Access tokens are HS256-signed JWTs carrying the subject (the user's
//! email), issue time, expiry, issuer and a unique token id. Nothing about an
//! issued token is stored server-side.
//!
//! Validation order matters: the signature is checked before any claim is
//! trusted, so a tampered token is always reported as `InvalidSignature`,
//! even when its claimed expiry has passed.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default access token expiration time (30 minutes)
pub const ACCESS_TOKEN_EXPIRATION_MINUTES: i64 = 30;

/// Longest accepted access token lifetime (one year)
pub const MAX_ACCESS_TOKEN_EXPIRATION_MINUTES: i64 = 60 * 24 * 365;

/// Default token issuer
pub const DEFAULT_ISSUER: &str = "todo-api";

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// Access token expiration in minutes
    pub access_token_expiration_minutes: i64,
    /// Token issuer
    pub issuer: String,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field(
                "access_token_expiration_minutes",
                &self.access_token_expiration_minutes,
            )
            .field("issuer", &self.issuer)
            .finish()
    }
}

impl JwtConfig {
    /// Create a new JWT configuration
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            access_token_expiration_minutes: ACCESS_TOKEN_EXPIRATION_MINUTES,
            issuer: DEFAULT_ISSUER.to_string(),
        }
    }

    /// Set access token expiration
    pub fn access_token_expiration(mut self, minutes: i64) -> Self {
        self.access_token_expiration_minutes = minutes;
        self
    }

    /// Set issuer
    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Reject configurations the service must never start with
    pub fn validated(self) -> Result<Self, JwtError> {
        if self.secret.trim().is_empty() {
            return Err(JwtError::MissingSecret);
        }
        self.access_token_ttl()?;
        Ok(self)
    }

    /// Access token lifetime; must lie in 1..=MAX_ACCESS_TOKEN_EXPIRATION_MINUTES
    pub fn access_token_ttl(&self) -> Result<Duration, JwtError> {
        let minutes = self.access_token_expiration_minutes;
        if !(1..=MAX_ACCESS_TOKEN_EXPIRATION_MINUTES).contains(&minutes) {
            return Err(JwtError::InvalidExpiration(minutes));
        }
        Duration::try_minutes(minutes).ok_or(JwtError::InvalidExpiration(minutes))
    }
}

/// JWT errors
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT secret is not set")]
    MissingSecret,

    #[error("Invalid access token expiration: {0} minutes")]
    InvalidExpiration(i64),

    #[error("Token encoding failed: {0}")]
    EncodingError(String),

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token expired")]
    Expired,

    #[error("Malformed token")]
    Malformed,
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm | ErrorKind::Base64(_) => {
                JwtError::InvalidSignature
            }
            ErrorKind::ExpiredSignature => JwtError::Expired,
            _ => JwtError::Malformed,
        }
    }
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user email)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issuer
    pub iss: String,
    /// JWT ID (unique identifier for this token)
    pub jti: String,
}

impl Claims {
    /// Whether the token is still valid at `now` (inclusive of the expiry second)
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() <= self.exp
    }
}

/// Token returned by the login endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    /// Always "bearer"
    pub token_type: String,
}

impl AccessToken {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

/// JWT service for token operations
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    /// Create a new JWT service
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Configured access token lifetime
    pub fn access_token_ttl(&self) -> Result<Duration, JwtError> {
        self.config.access_token_ttl()
    }

    /// Issue an access token with the configured lifetime
    pub fn issue_access_token(&self, subject: &str) -> Result<String, JwtError> {
        self.issue(subject, self.access_token_ttl()?)
    }

    /// Issue a token for `subject` valid for `ttl` from now
    pub fn issue(&self, subject: &str, ttl: Duration) -> Result<String, JwtError> {
        self.issue_at(subject, ttl, Utc::now())
    }

    /// Issue a token as if the current time were `now`
    pub fn issue_at(
        &self,
        subject: &str,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, JwtError> {
        let exp = now.checked_add_signed(ttl).ok_or_else(|| {
            JwtError::EncodingError("token expiry is out of range".to_string())
        })?;

        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            iss: self.config.issuer.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))
    }

    /// Validate a token and return its subject
    pub fn validate(&self, token: &str) -> Result<String, JwtError> {
        self.validate_at(token, Utc::now()).map(|claims| claims.sub)
    }

    /// Validate a token against the clock value `now` and return its claims
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, JwtError> {
        if token.split('.').count() != 3 || token.split('.').any(str::is_empty) {
            return Err(JwtError::Malformed);
        }

        // The header must at least parse before a signature check is meaningful
        jsonwebtoken::decode_header(token).map_err(|_| JwtError::Malformed)?;

        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation())?;
        let claims = token_data.claims;

        if claims.sub.is_empty() {
            return Err(JwtError::Malformed);
        }

        if !claims.is_valid_at(now) {
            return Err(JwtError::Expired);
        }

        Ok(claims)
    }

    /// Signature, algorithm and issuer checks. Expiry is checked by
    /// `validate_at` against the caller's clock, with no leeway.
    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation
    }
}
