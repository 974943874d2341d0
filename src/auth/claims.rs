/// JWT Claims structure
///
/// Standard registered claims (RFC 7519) carried by access tokens.
/// Access tokens hold nothing beyond the user id and timing.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TokenError;

/// Claims for access tokens
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Issuer
    pub iss: String,
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Create claims for `user_id` valid for `ttl` from now
    pub fn new(user_id: Uuid, ttl: chrono::Duration, issuer: &str) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            iss: issuer.to_string(),
            sub: user_id.to_string(),
            iat: now,
            exp: now + ttl.num_seconds(),
        }
    }

    /// Extract user ID from claims
    ///
    /// # Errors
    /// Returns `TokenError::Malformed` if the subject is not a UUID
    pub fn user_id(&self) -> Result<Uuid, TokenError> {
        Uuid::parse_str(&self.sub).map_err(|_| TokenError::Malformed)
    }

    /// A token whose expiry equals the current second is already expired
    pub fn is_expired(&self) -> bool {
        let now = chrono::Utc::now().timestamp();
        self.exp <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_creation() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, chrono::Duration::hours(1), "test");

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.iss, "test");
        assert_eq!(claims.exp - claims.iat, 3600);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_zero_ttl_is_expired() {
        let claims = Claims::new(Uuid::new_v4(), chrono::Duration::zero(), "test");
        assert!(claims.is_expired());
    }

    #[test]
    fn test_user_id_extraction() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, chrono::Duration::hours(1), "test");

        assert_eq!(claims.user_id().unwrap(), user_id);
    }

    #[test]
    fn test_invalid_user_id() {
        let mut claims = Claims::new(Uuid::new_v4(), chrono::Duration::hours(1), "test");
        claims.sub = "invalid-uuid".to_string();

        assert_eq!(claims.user_id(), Err(TokenError::Malformed));
    }
}
