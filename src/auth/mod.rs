/// Authentication module
///
/// Password hashing, access token signing/verification,
/// refresh token generation and bearer header parsing.

mod bearer;
mod claims;
mod jwt;
mod password;
mod refresh_token;

pub use bearer::extract_bearer_token;
pub use claims::Claims;
pub use jwt::{access_token_ttl, AccessTokenCodec, ISSUER};
pub use password::{hash_password, validate_password_policy, verify_password, PasswordHasher};
pub use refresh_token::{generate_refresh_token, refresh_token_ttl, RefreshToken};
