/// Error Handling Module
///
/// Unified error handling for the authentication service.
/// It covers:
/// 1. Domain-Specific Error Types (request format, tokens, auth, store)
/// 2. The unified `AppError` used for control flow
/// 3. HTTP response mapping with structured logging
///
/// Error messages never carry secrets: no passwords, no token values,
/// no signing key material.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::error::Error as StdError;
use std::fmt;

/// ============================================================================
/// 1. DOMAIN-SPECIFIC ERROR TYPES
/// ============================================================================

/// Malformed requests: bad bearer header, bad body, policy violations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestFormatError {
    MissingAuthorization,
    InvalidAuthorizationScheme,
    EmptyBearerToken,
    InvalidBody(String),
    InvalidField(&'static str, String),
}

impl fmt::Display for RequestFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestFormatError::MissingAuthorization => {
                write!(f, "Missing authorization header")
            }
            RequestFormatError::InvalidAuthorizationScheme => {
                write!(f, "Authorization header must use the Bearer scheme")
            }
            RequestFormatError::EmptyBearerToken => write!(f, "Bearer token is empty"),
            RequestFormatError::InvalidBody(msg) => write!(f, "Invalid request body: {}", msg),
            RequestFormatError::InvalidField(field, msg) => write!(f, "{}: {}", field, msg),
        }
    }
}

impl StdError for RequestFormatError {}

/// Reasons an access token fails verification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    Expired,
    InvalidSignature,
    IssuerMismatch,
    Malformed,
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::Expired => write!(f, "Token has expired"),
            TokenError::InvalidSignature => write!(f, "Token signature is invalid"),
            TokenError::IssuerMismatch => write!(f, "Token issuer is not accepted"),
            TokenError::Malformed => write!(f, "Token is malformed"),
        }
    }
}

impl StdError for TokenError {}

/// Authentication failures, all surfaced as 401
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    InvalidCredentials,
    InvalidAccessToken(TokenError),
    UnknownRefreshToken,
    RefreshTokenExpired,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "Incorrect email or password"),
            AuthError::InvalidAccessToken(e) => write!(f, "Invalid access token: {}", e),
            AuthError::UnknownRefreshToken => write!(f, "Invalid refresh token"),
            // Also used for revoked tokens.
            AuthError::RefreshTokenExpired => write!(f, "token expired"),
        }
    }
}

impl StdError for AuthError {}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        AuthError::InvalidAccessToken(err)
    }
}

/// Persistence collaborator errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    Conflict(String),
    NotFound(String),
    Storage(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Conflict(msg) => write!(f, "Duplicate entry: {}", msg),
            StoreError::NotFound(msg) => write!(f, "Not found: {}", msg),
            StoreError::Storage(msg) => write!(f, "Storage error: {}", msg),
        }
    }
}

impl StdError for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => StoreError::NotFound("Record not found".to_string()),
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
                StoreError::Conflict(
                    db_err
                        .constraint()
                        .unwrap_or("unique constraint")
                        .to_string(),
                )
            }
            _ => StoreError::Storage(err.to_string()),
        }
    }
}

/// ============================================================================
/// 2. UNIFIED APPLICATION ERROR TYPE
/// ============================================================================

/// Central error type that all application errors map to
#[derive(Debug)]
pub enum AppError {
    RequestFormat(RequestFormatError),
    Auth(AuthError),
    Store(StoreError),
    /// Password hashing failed, or a stored hash is malformed
    Hashing(String),
    /// The secure random source failed
    Generation(String),
    /// Access token could not be signed
    Signing(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::RequestFormat(e) => write!(f, "{}", e),
            AppError::Auth(e) => write!(f, "{}", e),
            AppError::Store(e) => write!(f, "{}", e),
            AppError::Hashing(msg) => write!(f, "Password hashing error: {}", msg),
            AppError::Generation(msg) => write!(f, "Token generation error: {}", msg),
            AppError::Signing(msg) => write!(f, "Token signing error: {}", msg),
        }
    }
}

impl StdError for AppError {}

// ============================================================================
// FROM IMPLEMENTATIONS
// ============================================================================

impl From<RequestFormatError> for AppError {
    fn from(err: RequestFormatError) -> Self {
        AppError::RequestFormat(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Auth(err)
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        AppError::Auth(AuthError::InvalidAccessToken(err))
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Store(err)
    }
}

// ============================================================================
// 3. HTTP RESPONSE MAPPING
// ============================================================================

/// Error response structure for HTTP responses
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Human-readable error message
    pub message: String,
    /// Error code for client-side handling
    pub code: String,
    /// HTTP status code
    pub status: u16,
    /// Timestamp when error occurred
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_id: String, message: String, code: String, status: u16) -> Self {
        Self {
            error_id,
            message,
            code,
            status,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Trait for converting errors to HTTP responses with proper logging
pub trait ErrorHandler {
    fn error_response(&self, request_id: &str) -> (StatusCode, ErrorResponse);
    fn log_error(&self, request_id: &str);
}

impl AppError {
    fn describe(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::RequestFormat(e) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", e.to_string()),

            AppError::Auth(e) => match e {
                AuthError::InvalidCredentials => (
                    StatusCode::UNAUTHORIZED,
                    "INVALID_CREDENTIALS",
                    e.to_string(),
                ),
                AuthError::InvalidAccessToken(_) => (
                    StatusCode::UNAUTHORIZED,
                    "TOKEN_INVALID",
                    e.to_string(),
                ),
                AuthError::UnknownRefreshToken | AuthError::RefreshTokenExpired => (
                    StatusCode::UNAUTHORIZED,
                    "REFRESH_TOKEN_INVALID",
                    e.to_string(),
                ),
            },

            AppError::Store(e) => match e {
                StoreError::Conflict(_) => (StatusCode::CONFLICT, "DUPLICATE_ENTRY", e.to_string()),
                StoreError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", e.to_string()),
                StoreError::Storage(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "Storage error occurred".to_string(),
                ),
            },

            AppError::Hashing(_) | AppError::Generation(_) | AppError::Signing(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Internal server error".to_string(),
            ),
        }
    }
}

impl ErrorHandler for AppError {
    fn error_response(&self, request_id: &str) -> (StatusCode, ErrorResponse) {
        let (status, code, message) = self.describe();
        let error_response = ErrorResponse::new(
            request_id.to_string(),
            message,
            code.to_string(),
            status.as_u16(),
        );
        (status, error_response)
    }

    fn log_error(&self, request_id: &str) {
        match self {
            AppError::RequestFormat(e) => {
                tracing::warn!(request_id = request_id, error = %e, "Malformed request");
            }
            AppError::Auth(AuthError::InvalidCredentials) => {
                tracing::warn!(request_id = request_id, error = %self, "Invalid credentials attempt");
            }
            AppError::Auth(e) => {
                tracing::warn!(request_id = request_id, error = %e, "Authentication error");
            }
            AppError::Store(StoreError::Conflict(_)) => {
                tracing::warn!(request_id = request_id, error = %self, "Duplicate entry attempt");
            }
            AppError::Store(e) => {
                tracing::error!(request_id = request_id, error = %e, "Store error");
            }
            _ => {
                tracing::error!(request_id = request_id, error = %self, "Internal error");
            }
        }
    }
}

/// Implement ResponseError for Actix-web integration
impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let request_id = uuid::Uuid::new_v4().to_string();
        self.log_error(&request_id);

        let (status, error_response) = <Self as ErrorHandler>::error_response(self, &request_id);

        HttpResponse::build(status).json(error_response)
    }

    fn status_code(&self) -> StatusCode {
        self.describe().0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_format_maps_to_400() {
        let err: AppError = RequestFormatError::MissingAuthorization.into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_auth_errors_map_to_401() {
        let cases = vec![
            AuthError::InvalidCredentials,
            AuthError::InvalidAccessToken(TokenError::Expired),
            AuthError::UnknownRefreshToken,
            AuthError::RefreshTokenExpired,
        ];
        for case in cases {
            let err: AppError = case.into();
            assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn test_infrastructure_errors_map_to_500() {
        let cases = vec![
            AppError::Hashing("boom".to_string()),
            AppError::Generation("boom".to_string()),
            AppError::Signing("boom".to_string()),
            AppError::Store(StoreError::Storage("boom".to_string())),
        ];
        for err in cases {
            assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn test_internal_details_are_not_exposed() {
        let err = AppError::Store(StoreError::Storage("connection reset by peer".to_string()));
        let (_, body) = <AppError as ErrorHandler>::error_response(&err, "req-1");

        assert_eq!(body.error_id, "req-1");
        assert_eq!(body.code, "STORAGE_ERROR");
        assert!(!body.message.contains("connection reset"));
    }

    #[test]
    fn test_token_error_converts_to_auth_error() {
        let err: AppError = TokenError::InvalidSignature.into();
        assert!(matches!(
            err,
            AppError::Auth(AuthError::InvalidAccessToken(TokenError::InvalidSignature))
        ));
    }

    #[test]
    fn test_refresh_expired_message() {
        assert_eq!(AuthError::RefreshTokenExpired.to_string(), "token expired");
    }
}
