/// Bearer token extraction from the `Authorization` header.
///
/// A missing header, a non-Bearer scheme or an empty token is a request
/// format problem (400), not an authentication failure.

use actix_web::http::header::{HeaderMap, AUTHORIZATION};

use crate::error::RequestFormatError;

const BEARER_SCHEME: &str = "Bearer";

pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, RequestFormatError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(RequestFormatError::MissingAuthorization)?
        .to_str()
        .map_err(|_| RequestFormatError::InvalidAuthorizationScheme)?;

    // Scheme names are case-insensitive (RFC 7235).
    let token = match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case(BEARER_SCHEME) => token.trim(),
        _ => return Err(RequestFormatError::InvalidAuthorizationScheme),
    };

    if token.is_empty() {
        return Err(RequestFormatError::EmptyBearerToken);
    }

    Ok(token)
}
