/// In-process store
///
/// Backs the test suites and local runs without a database.
/// A single mutex guards both tables, so every operation is atomic.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{RefreshTokenStore, User, UserStore};
use crate::auth::RefreshToken;
use crate::error::StoreError;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    refresh_tokens: HashMap<String, RefreshToken>,
}

#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Storage("store lock poisoned".to_string()))
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, StoreError> {
        let mut tables = self.lock()?;
        if tables.users.values().any(|u| u.email == email) {
            return Err(StoreError::Conflict("users_email_key".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User, StoreError> {
        self.lock()?
            .users
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("user".to_string()))
    }

    async fn update_user(
        &self,
        id: Uuid,
        email: &str,
        password_hash: &str,
    ) -> Result<User, StoreError> {
        let mut tables = self.lock()?;
        if tables.users.values().any(|u| u.email == email && u.id != id) {
            return Err(StoreError::Conflict("users_email_key".to_string()));
        }

        let user = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound("user".to_string()))?;
        user.email = email.to_string();
        user.password_hash = password_hash.to_string();
        user.updated_at = Utc::now();

        Ok(user.clone())
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryStore {
    async fn create_refresh_token(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshToken, StoreError> {
        let mut tables = self.lock()?;
        if tables.refresh_tokens.contains_key(token) {
            return Err(StoreError::Conflict("refresh_tokens_pkey".to_string()));
        }

        let now = Utc::now();
        let record = RefreshToken {
            token: token.to_string(),
            user_id,
            created_at: now,
            updated_at: now,
            expires_at,
            revoked_at: None,
        };
        tables
            .refresh_tokens
            .insert(record.token.clone(), record.clone());

        Ok(record)
    }

    async fn get_refresh_token(&self, token: &str) -> Result<RefreshToken, StoreError> {
        self.lock()?
            .refresh_tokens
            .get(token)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("refresh token".to_string()))
    }

    async fn revoke_refresh_token(&self, token: &str) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        let record = tables
            .refresh_tokens
            .get_mut(token)
            .ok_or_else(|| StoreError::NotFound("refresh token".to_string()))?;

        let now = Utc::now();
        record.revoked_at.get_or_insert(now);
        record.updated_at = now;

        Ok(())
    }
}
