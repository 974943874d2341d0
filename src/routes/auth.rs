/// Authentication Routes
///
/// Login, access token refresh and refresh token revocation.

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::extract_bearer_token;
use crate::error::AppError;
use crate::session::SessionService;

/// User login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login: the user plus both tokens
#[derive(Serialize)]
pub struct LoginResponse {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub token: String,
    pub refresh_token: String,
}

/// A freshly minted access token
#[derive(Serialize)]
pub struct RefreshResponse {
    pub token: String,
}

/// POST /api/login
///
/// Authenticate with email and password.
///
/// # Errors
/// - 400: Malformed JSON body
/// - 401: Unknown email or wrong password (indistinguishable)
/// - 500: Hashing, token generation or store failure
pub async fn login(
    form: web::Json<LoginRequest>,
    sessions: web::Data<SessionService>,
) -> Result<HttpResponse, AppError> {
    let session = sessions.login(&form.email, &form.password).await?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        id: session.user.id,
        email: session.user.email,
        created_at: session.user.created_at,
        updated_at: session.user.updated_at,
        token: session.access_token,
        refresh_token: session.refresh_token.token,
    }))
}

/// POST /api/refresh
///
/// Exchange a refresh token (sent as `Authorization: Bearer <token>`)
/// for a new access token. The refresh token stays valid.
///
/// # Errors
/// - 400: Missing or malformed Authorization header
/// - 401: Unknown, expired or revoked refresh token
pub async fn refresh(
    req: HttpRequest,
    sessions: web::Data<SessionService>,
) -> Result<HttpResponse, AppError> {
    let refresh_token = extract_bearer_token(req.headers())?;
    let token = sessions.refresh(refresh_token).await?;

    Ok(HttpResponse::Ok().json(RefreshResponse { token }))
}

/// POST /api/revoke
///
/// Revoke the refresh token sent as bearer. Revoking twice succeeds.
///
/// # Errors
/// - 400: Missing or malformed Authorization header
/// - 401: Unknown refresh token
pub async fn revoke(
    req: HttpRequest,
    sessions: web::Data<SessionService>,
) -> Result<HttpResponse, AppError> {
    let refresh_token = extract_bearer_token(req.headers())?;
    sessions.revoke(refresh_token).await?;

    Ok(HttpResponse::NoContent().finish())
}
