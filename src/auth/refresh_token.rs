/// Refresh Token Generation
///
/// Refresh tokens are opaque: 32 bytes from the OS random source,
/// hex-encoded to 64 characters. They embed no claims; everything the
/// server knows about one lives in its persisted `RefreshToken` record.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;

/// Random bytes per token before hex encoding
const TOKEN_BYTES: usize = 32;

/// Lifetime of a refresh token (60 days)
pub fn refresh_token_ttl() -> Duration {
    Duration::hours(1440)
}

/// Generate a new refresh token
///
/// # Errors
/// Returns `AppError::Generation` if the OS random source fails
pub fn generate_refresh_token() -> Result<String, AppError> {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| AppError::Generation(e.to_string()))?;

    Ok(hex::encode(bytes))
}

/// A persisted refresh token record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshToken {
    pub token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshToken {
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Whether the token can still mint access tokens at `now`
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_expired_at(now) && !self.is_revoked()
    }
}
