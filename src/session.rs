/// Session Rotation Protocol
///
/// Login, refresh and revoke flows on top of the hasher, the access token
/// codec, the refresh token generator and the store. Each flow either
/// completes fully or fails without exposing partial state, and all store
/// lookups happen before any mutation. Nothing is retried here.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::auth::{
    access_token_ttl, generate_refresh_token, refresh_token_ttl, AccessTokenCodec,
    PasswordHasher, RefreshToken,
};
use crate::error::{AppError, AuthError, StoreError};
use crate::store::{AuthStore, RefreshTokenStore, User, UserStore};

/// Tokens handed out by a successful login
#[derive(Debug, Clone)]
pub struct LoginSession {
    pub user: User,
    pub access_token: String,
    pub refresh_token: RefreshToken,
}

#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn AuthStore>,
    codec: AccessTokenCodec,
    hasher: PasswordHasher,
}

impl SessionService {
    pub fn new(store: Arc<dyn AuthStore>, codec: AccessTokenCodec, hasher: PasswordHasher) -> Self {
        Self {
            store,
            codec,
            hasher,
        }
    }

    pub fn store(&self) -> &Arc<dyn AuthStore> {
        &self.store
    }

    pub fn codec(&self) -> &AccessTokenCodec {
        &self.codec
    }

    pub fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    /// Authenticate with email and password
    ///
    /// An unknown email and a wrong password fail the same way. The email
    /// is trimmed exactly as registration trims it.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginSession, AppError> {
        let user = self
            .store
            .get_user_by_email(email.trim())
            .await
            .map_err(|e| match e {
                StoreError::NotFound(_) => AppError::Auth(AuthError::InvalidCredentials),
                other => AppError::Store(other),
            })?;

        if !self.hasher.verify(password, &user.password_hash)? {
            tracing::info!(user_id = %user.id, "Login rejected: wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        let access_token = self.codec.issue(user.id, access_token_ttl())?;
        let token = generate_refresh_token()?;
        let refresh_token = self
            .store
            .create_refresh_token(&token, user.id, Utc::now() + refresh_token_ttl())
            .await
            .map_err(|e| {
                tracing::error!(user_id = %user.id, error = %e, "Failed to persist refresh token");
                // A token collision is a server fault, never a client conflict.
                AppError::Store(match e {
                    StoreError::Storage(msg) => StoreError::Storage(msg),
                    other => StoreError::Storage(other.to_string()),
                })
            })?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(LoginSession {
            user,
            access_token,
            refresh_token,
        })
    }

    /// Mint a new access token from a refresh token
    ///
    /// The refresh token itself stays valid; it is not rotated.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AppError> {
        let record = self.find_refresh_token(refresh_token).await?;

        if !record.is_usable_at(Utc::now()) {
            tracing::info!(
                user_id = %record.user_id,
                revoked = record.is_revoked(),
                "Refresh rejected: token expired or revoked"
            );
            return Err(AuthError::RefreshTokenExpired.into());
        }

        let access_token = self.codec.issue(record.user_id, access_token_ttl())?;
        tracing::debug!(user_id = %record.user_id, "Access token refreshed");

        Ok(access_token)
    }

    /// Permanently revoke a refresh token
    ///
    /// Revoking an already revoked token succeeds.
    pub async fn revoke(&self, refresh_token: &str) -> Result<(), AppError> {
        let record = self.find_refresh_token(refresh_token).await?;

        self.store
            .revoke_refresh_token(&record.token)
            .await
            .map_err(|e| match e {
                // Lost a race with an out-of-band delete.
                StoreError::NotFound(_) => AppError::Auth(AuthError::UnknownRefreshToken),
                other => AppError::Store(other),
            })?;

        tracing::info!(user_id = %record.user_id, "Refresh token revoked");
        Ok(())
    }

    /// Resolve the user behind an access token
    pub fn authenticate(&self, access_token: &str) -> Result<Uuid, AppError> {
        Ok(self.codec.verify(access_token)?)
    }

    async fn find_refresh_token(&self, token: &str) -> Result<RefreshToken, AppError> {
        self.store.get_refresh_token(token).await.map_err(|e| match e {
            StoreError::NotFound(_) => {
                tracing::warn!("Unknown refresh token presented");
                AppError::Auth(AuthError::UnknownRefreshToken)
            }
            other => AppError::Store(other),
        })
    }
}
