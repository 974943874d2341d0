/// Postgres-backed store
///
/// Schema lives in `migrations/`. Each operation is a single statement,
/// so per-record atomicity comes from Postgres row locking.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{RefreshTokenStore, User, UserStore};
use crate::auth::RefreshToken;
use crate::error::StoreError;

type UserRow = (Uuid, String, String, DateTime<Utc>, DateTime<Utc>);
type RefreshTokenRow = (
    String,
    Uuid,
    DateTime<Utc>,
    DateTime<Utc>,
    DateTime<Utc>,
    Option<DateTime<Utc>>,
);

fn user_from_row(row: UserRow) -> User {
    let (id, email, password_hash, created_at, updated_at) = row;
    User {
        id,
        email,
        password_hash,
        created_at,
        updated_at,
    }
}

fn refresh_token_from_row(row: RefreshTokenRow) -> RefreshToken {
    let (token, user_id, created_at, updated_at, expires_at, revoked_at) = row;
    RefreshToken {
        token,
        user_id,
        created_at,
        updated_at,
        expires_at,
        revoked_at,
    }
}

#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PostgresStore {
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, StoreError> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, email, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING id, email, password_hash, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(password_hash)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(user_from_row(row))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User, StoreError> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password_hash, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .map(user_from_row)
        .ok_or_else(|| StoreError::NotFound("user".to_string()))
    }

    async fn update_user(
        &self,
        id: Uuid,
        email: &str,
        password_hash: &str,
    ) -> Result<User, StoreError> {
        sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET email = $1, password_hash = $2, updated_at = $3
            WHERE id = $4
            RETURNING id, email, password_hash, created_at, updated_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(user_from_row)
        .ok_or_else(|| StoreError::NotFound("user".to_string()))
    }
}

#[async_trait]
impl RefreshTokenStore for PostgresStore {
    async fn create_refresh_token(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshToken, StoreError> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, RefreshTokenRow>(
            r#"
            INSERT INTO refresh_tokens (token, user_id, created_at, updated_at, expires_at, revoked_at)
            VALUES ($1, $2, $3, $3, $4, NULL)
            RETURNING token, user_id, created_at, updated_at, expires_at, revoked_at
            "#,
        )
        .bind(token)
        .bind(user_id)
        .bind(now)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(refresh_token_from_row(row))
    }

    async fn get_refresh_token(&self, token: &str) -> Result<RefreshToken, StoreError> {
        sqlx::query_as::<_, RefreshTokenRow>(
            r#"
            SELECT token, user_id, created_at, updated_at, expires_at, revoked_at
            FROM refresh_tokens
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?
        .map(refresh_token_from_row)
        .ok_or_else(|| StoreError::NotFound("refresh token".to_string()))
    }

    async fn revoke_refresh_token(&self, token: &str) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = COALESCE(revoked_at, $1), updated_at = $1
            WHERE token = $2
            "#,
        )
        .bind(Utc::now())
        .bind(token)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("refresh token".to_string()));
        }

        Ok(())
    }
}
