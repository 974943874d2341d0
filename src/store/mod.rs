/// Persistence contract for users and refresh tokens
///
/// The session protocol only talks to these traits. Atomicity of each
/// operation on a single record is the implementation's responsibility.

mod memory;
mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::RefreshToken;
use crate::error::StoreError;

pub use memory::InMemoryStore;
pub use postgres::PostgresStore;

/// A user account as persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `StoreError::Conflict` if the email is taken
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, StoreError>;

    /// Fails with `StoreError::NotFound` if no user has this email
    async fn get_user_by_email(&self, email: &str) -> Result<User, StoreError>;

    /// Replace a user's email and password hash
    async fn update_user(
        &self,
        id: Uuid,
        email: &str,
        password_hash: &str,
    ) -> Result<User, StoreError>;
}

#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Fails with `StoreError::Conflict` if the token value already exists
    async fn create_refresh_token(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshToken, StoreError>;

    /// Fails with `StoreError::NotFound` if no record matches
    async fn get_refresh_token(&self, token: &str) -> Result<RefreshToken, StoreError>;

    /// Set `revoked_at` to now unless already set
    ///
    /// Revoking a revoked token succeeds and keeps the first timestamp.
    async fn revoke_refresh_token(&self, token: &str) -> Result<(), StoreError>;
}

/// Everything the session protocol needs from persistence
pub trait AuthStore: UserStore + RefreshTokenStore {}

impl<T> AuthStore for T where T: UserStore + RefreshTokenStore {}
