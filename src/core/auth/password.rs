//! Password hashing and verification
//!
//! Passwords are stored only as bcrypt hashes. Each hash embeds its own
//! random salt and cost factor, so verification needs nothing but the stored
//! string.

/// Default bcrypt cost factor (12 is recommended for production)
pub const DEFAULT_BCRYPT_COST: u32 = bcrypt::DEFAULT_COST;

/// Lowest cost bcrypt accepts
pub const MIN_BCRYPT_COST: u32 = 4;

/// Highest cost bcrypt accepts
pub const MAX_BCRYPT_COST: u32 = 31;

/// Longest password accepted, in bytes. bcrypt reads 72 bytes including the
/// NUL terminator; anything longer would be silently cut off.
pub const MAX_PASSWORD_BYTES: usize = 71;

/// Password hashing errors
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Password must not be empty")]
    Empty,

    #[error("Password must be at most {} bytes", MAX_PASSWORD_BYTES)]
    TooLong,

    #[error("Invalid bcrypt cost {0} (must be between 4 and 31)")]
    InvalidCost(u32),

    #[error("Password hashing failed: {0}")]
    HashingError(String),
}

/// Derives and checks stored password hashes
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            cost: DEFAULT_BCRYPT_COST,
        }
    }
}

impl PasswordHasher {
    /// Create a hasher with the given bcrypt cost
    pub fn new(cost: u32) -> Result<Self, PasswordError> {
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
            return Err(PasswordError::InvalidCost(cost));
        }
        Ok(Self { cost })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a plaintext password with a fresh random salt.
    ///
    /// Two calls with the same input return different hashes; both verify.
    pub fn derive(&self, password: &str) -> Result<String, PasswordError> {
        if password.is_empty() {
            return Err(PasswordError::Empty);
        }
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(PasswordError::TooLong);
        }

        bcrypt::non_truncating_hash(password, self.cost).map_err(|e| match e {
            bcrypt::BcryptError::Truncation(_) => PasswordError::TooLong,
            e => PasswordError::HashingError(e.to_string()),
        })
    }

    /// Check a plaintext password against a stored hash.
    ///
    /// Returns `false` for empty or over-long input and for hashes that are
    /// not bcrypt.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        if password.is_empty() || password.len() > MAX_PASSWORD_BYTES || hash.is_empty() {
            return false;
        }

        match bcrypt::non_truncating_verify(password, hash) {
            Ok(valid) => valid,
            Err(e) => {
                tracing::debug!("Stored password hash could not be parsed: {}", e);
                false
            }
        }
    }

    /// Derive and verify a probe value, failing if the primitive is unusable.
    pub fn self_check(&self) -> Result<(), PasswordError> {
        let probe = "startup-self-check";
        let hash = self.derive(probe)?;

        if !self.verify(probe, &hash) || self.verify("startup-self-check!", &hash) {
            return Err(PasswordError::HashingError(
                "probe hash did not verify".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(MIN_BCRYPT_COST).unwrap()
    }

    #[test]
    fn test_derive_produces_bcrypt_hash() {
        let hash = hasher().derive("my_secure_password123!").unwrap();

        assert!(hash.starts_with("$2b$") || hash.starts_with("$2a$") || hash.starts_with("$2y$"));
        assert_eq!(hash.len(), 60);
        assert!(!hash.contains("my_secure_password123!"));
    }

    #[test]
    fn test_derive_is_salted() {
        let hasher = hasher();
        let hash1 = hasher.derive("same_password").unwrap();
        let hash2 = hasher.derive("same_password").unwrap();

        assert_ne!(hash1, hash2);
        assert!(hasher.verify("same_password", &hash1));
        assert!(hasher.verify("same_password", &hash2));
    }

    #[test]
    fn test_verify_correct_and_incorrect() {
        let hasher = hasher();
        let hash = hasher.derive("secret123").unwrap();

        assert!(hasher.verify("secret123", &hash));
        assert!(!hasher.verify("secret124", &hash));
        assert!(!hasher.verify("Secret123", &hash));
    }

    #[test]
    fn test_verify_distinct_passwords() {
        let hasher = hasher();
        let passwords = ["alpha", "bravo", "charlie", "пароль_密码_🔐"];
        let hashes: Vec<String> = passwords
            .iter()
            .map(|p| hasher.derive(p).unwrap())
            .collect();

        for (i, password) in passwords.iter().enumerate() {
            for (j, hash) in hashes.iter().enumerate() {
                assert_eq!(hasher.verify(password, hash), i == j);
            }
        }
    }

    #[test]
    fn test_long_passwords_are_not_truncated() {
        let hasher = hasher();
        let prefix = "a".repeat(MAX_PASSWORD_BYTES);

        assert!(matches!(
            hasher.derive(&format!("{prefix}-original")),
            Err(PasswordError::TooLong)
        ));

        let hash = hasher.derive(&prefix).unwrap();
        assert!(hasher.verify(&prefix, &hash));
        assert!(!hasher.verify(&format!("{prefix}-COMPLETELY-DIFFERENT"), &hash));
        assert!(!hasher.verify(&format!("{prefix}b"), &hash));
    }

    #[test]
    fn test_max_length_boundary_counts_bytes() {
        let hasher = hasher();

        // 2 bytes per char
        let fits = "é".repeat(MAX_PASSWORD_BYTES / 2);
        let too_long = "é".repeat(MAX_PASSWORD_BYTES / 2 + 1);

        assert!(hasher.derive(&fits).is_ok());
        assert!(matches!(hasher.derive(&too_long), Err(PasswordError::TooLong)));
    }

    #[test]
    fn test_derive_rejects_empty_password() {
        assert!(matches!(hasher().derive(""), Err(PasswordError::Empty)));
    }

    #[test]
    fn test_verify_malformed_hash_returns_false() {
        let hasher = hasher();

        assert!(!hasher.verify("password", "not_a_valid_hash"));
        assert!(!hasher.verify("password", "$2b$04$short"));
        assert!(!hasher.verify("password", ""));
        assert!(!hasher.verify("password", "$argon2id$v=19$m=65536,t=3,p=4$abc$def"));
    }

    #[test]
    fn test_verify_empty_password_returns_false() {
        let hasher = hasher();
        let hash = hasher.derive("not_empty").unwrap();

        assert!(!hasher.verify("", &hash));
    }

    #[test]
    fn test_new_rejects_out_of_range_cost() {
        assert!(matches!(
            PasswordHasher::new(3),
            Err(PasswordError::InvalidCost(3))
        ));
        assert!(matches!(
            PasswordHasher::new(32),
            Err(PasswordError::InvalidCost(32))
        ));
        assert_eq!(PasswordHasher::new(10).unwrap().cost(), 10);
    }

    #[test]
    fn test_default_cost() {
        assert_eq!(PasswordHasher::default().cost(), DEFAULT_BCRYPT_COST);
    }

    #[test]
    fn test_self_check_passes() {
        assert!(hasher().self_check().is_ok());
    }

    #[test]
    fn test_password_error_display() {
        assert_eq!(
            format!("{}", PasswordError::Empty),
            "Password must not be empty"
        );
        assert!(format!("{}", PasswordError::InvalidCost(2)).contains('2'));
    }
}
