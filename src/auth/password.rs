/// Password Hashing and Verification
///
/// One-way bcrypt hashing. Every hash embeds its own random salt, so two
/// hashes of the same password differ and are never compared directly.

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::{AppError, RequestFormatError};

const MIN_PASSWORD_LENGTH: usize = 5;
/// bcrypt ignores everything past 72 bytes
const MAX_PASSWORD_BYTES: usize = 72;

/// Hashes and verifies passwords at a fixed bcrypt cost
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

impl PasswordHasher {
    /// Create a hasher with an explicit bcrypt cost (4..=31)
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a password
    ///
    /// # Errors
    /// Returns `AppError::Hashing` if bcrypt fails (invalid cost, RNG failure)
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        hash(password, self.cost).map_err(|e| AppError::Hashing(e.to_string()))
    }

    /// Verify a password against its hash
    ///
    /// A wrong password is `Ok(false)`.
    ///
    /// # Errors
    /// Returns `AppError::Hashing` only if `hash` is not a valid bcrypt hash
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        verify(password, hash)
            .map_err(|e| AppError::Hashing(format!("Password verification failed: {}", e)))
    }
}

/// Hash a password at the default cost
pub fn hash_password(password: &str) -> Result<String, AppError> {
    PasswordHasher::default().hash(password)
}

/// Verify a password against a bcrypt hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    PasswordHasher::default().verify(password, hash)
}

/// Validate a new password before it is hashed and stored
///
/// Requirements:
/// - Minimum 5 characters
/// - Maximum 72 bytes
pub fn validate_password_policy(password: &str) -> Result<(), RequestFormatError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(RequestFormatError::InvalidField(
            "password",
            format!("must be at least {} characters", MIN_PASSWORD_LENGTH),
        ));
    }

    if password.len() > MAX_PASSWORD_BYTES {
        return Err(RequestFormatError::InvalidField(
            "password",
            format!("must be at most {} bytes", MAX_PASSWORD_BYTES),
        ));
    }

    Ok(())
}
