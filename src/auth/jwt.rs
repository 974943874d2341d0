/// JWT Token Generation and Validation
///
/// Access tokens are HS256-signed JWTs. The signing secret is handed to
/// `AccessTokenCodec` once at construction and never changes afterwards.
/// No record of issued tokens is kept; a token stays valid until it expires.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::Claims;
use crate::error::{AppError, TokenError};

/// Issuer claim stamped on every access token
pub const ISSUER: &str = "chirpy";

/// Lifetime of an access token
pub fn access_token_ttl() -> chrono::Duration {
    chrono::Duration::hours(1)
}

/// Signs and verifies access tokens with a shared secret
#[derive(Clone)]
pub struct AccessTokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl AccessTokenCodec {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let secret = secret.as_ref();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Issue an access token for `subject` that expires after `ttl`
    ///
    /// # Errors
    /// Returns `AppError::Signing` if the token cannot be encoded
    pub fn issue(&self, subject: Uuid, ttl: chrono::Duration) -> Result<String, AppError> {
        let claims = Claims::new(subject, ttl, ISSUER);

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Signing(e.to_string()))
    }

    /// Verify an access token and return its subject
    ///
    /// The signature is checked before any claim is read.
    pub fn verify(&self, token: &str) -> Result<Uuid, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                let reason = match e.kind() {
                    ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    ErrorKind::InvalidIssuer => TokenError::IssuerMismatch,
                    _ => TokenError::Malformed,
                };
                tracing::debug!(reason = %reason, "Access token rejected");
                reason
            })?;

        // jsonwebtoken accepts exp == now
        if claims.is_expired() {
            return Err(TokenError::Expired);
        }

        claims.user_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-characters-long";

    fn codec() -> AccessTokenCodec {
        AccessTokenCodec::new(SECRET)
    }

    #[test]
    fn test_issue_and_verify_token() {
        let codec = codec();
        let user_id = Uuid::new_v4();

        let token = codec.issue(user_id, access_token_ttl()).expect("Failed to issue token");
        let subject = codec.verify(&token).expect("Failed to verify token");

        assert_eq!(subject, user_id);
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn test_zero_ttl_is_expired() {
        let codec = codec();
        let token = codec
            .issue(Uuid::new_v4(), chrono::Duration::zero())
            .expect("Failed to issue token");

        assert_eq!(codec.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_past_expiry_is_expired() {
        let codec = codec();
        let token = codec
            .issue(Uuid::new_v4(), chrono::Duration::seconds(-30))
            .expect("Failed to issue token");

        assert_eq!(codec.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_invalid_token() {
        assert_eq!(codec().verify("invalid.token.here"), Err(TokenError::Malformed));
        assert_eq!(codec().verify(""), Err(TokenError::Malformed));
    }

    #[test]
    fn test_wrong_secret() {
        let token = codec()
            .issue(Uuid::new_v4(), access_token_ttl())
            .expect("Failed to issue token");

        let other = AccessTokenCodec::new("a-completely-different-signing-secret");
        assert_eq!(other.verify(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_tampered_payload_or_signature() {
        let codec = codec();
        let token = codec
            .issue(Uuid::new_v4(), access_token_ttl())
            .expect("Failed to issue token");
        let header_len = token.find('.').unwrap() + 1;

        for (i, c) in token.char_indices().skip(header_len) {
            if c == '.' {
                continue;
            }
            let replacement = if c == 'A' { 'B' } else { 'A' };
            let mut tampered = token.clone();
            tampered.replace_range(i..i + 1, &replacement.to_string());

            assert_eq!(
                codec.verify(&tampered),
                Err(TokenError::InvalidSignature),
                "tampering at position {} was not detected",
                i
            );
        }
    }

    #[test]
    fn test_tampered_header() {
        let codec = codec();
        let token = codec
            .issue(Uuid::new_v4(), access_token_ttl())
            .expect("Failed to issue token");
        let header_len = token.find('.').unwrap();

        for i in 0..header_len {
            let c = &token[i..i + 1];
            let replacement = if c == "A" { "B" } else { "A" };
            let mut tampered = token.clone();
            tampered.replace_range(i..i + 1, replacement);

            assert!(codec.verify(&tampered).is_err());
        }
    }

    #[test]
    fn test_wrong_issuer() {
        let codec = codec();
        let claims = Claims::new(Uuid::new_v4(), access_token_ttl(), "someone-else");
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(codec.verify(&token), Err(TokenError::IssuerMismatch));
    }

    #[test]
    fn test_non_uuid_subject() {
        let codec = codec();
        let mut claims = Claims::new(Uuid::new_v4(), access_token_ttl(), ISSUER);
        claims.sub = "not-a-uuid".to_string();
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(codec.verify(&token), Err(TokenError::Malformed));
    }

    #[test]
    fn test_other_algorithm_rejected() {
        let codec = codec();
        let claims = Claims::new(Uuid::new_v4(), access_token_ttl(), ISSUER);
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(codec.verify(&token).is_err());
    }
}
