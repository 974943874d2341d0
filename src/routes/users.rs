/// User Account Routes
///
/// Registration and credential updates. Both hash the new password
/// through the session service's hasher.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::auth::validate_password_policy;
use crate::error::AppError;
use crate::middleware::AuthenticatedUser;
use crate::session::SessionService;
use crate::store::UserStore;
use crate::validators::is_valid_email;

/// Email and password for a new or updated account
#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

impl CredentialsRequest {
    /// Validate inputs and hash the password
    fn into_validated(
        self,
        sessions: &SessionService,
    ) -> Result<(String, String), AppError> {
        let email = is_valid_email(&self.email)?;
        validate_password_policy(&self.password)?;
        let password_hash = sessions.hasher().hash(&self.password)?;
        Ok((email, password_hash))
    }
}

/// POST /api/users
///
/// # Errors
/// - 400: Invalid email or password too short/long
/// - 409: Email already registered
pub async fn create_user(
    form: web::Json<CredentialsRequest>,
    sessions: web::Data<SessionService>,
) -> Result<HttpResponse, AppError> {
    let (email, password_hash) = form.into_inner().into_validated(&sessions)?;

    let user = sessions.store().create_user(&email, &password_hash).await?;
    tracing::info!(user_id = %user.id, "User registered");

    Ok(HttpResponse::Created().json(user))
}

/// PUT /api/users
///
/// Replace the authenticated user's email and password.
/// **Requires a valid access token**, checked by `JwtMiddleware`.
///
/// # Errors
/// - 400: Missing Authorization header, invalid email or password
/// - 401: Invalid or expired access token
/// - 404: The token's user no longer exists
/// - 409: Email already taken by another user
pub async fn update_user(
    user: web::ReqData<AuthenticatedUser>,
    form: web::Json<CredentialsRequest>,
    sessions: web::Data<SessionService>,
) -> Result<HttpResponse, AppError> {
    let AuthenticatedUser(user_id) = user.into_inner();
    let (email, password_hash) = form.into_inner().into_validated(&sessions)?;

    let user = sessions
        .store()
        .update_user(user_id, &email, &password_hash)
        .await?;
    tracing::info!(user_id = %user.id, "User credentials updated");

    Ok(HttpResponse::Ok().json(user))
}
