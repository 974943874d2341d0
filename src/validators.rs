/// Input validators for account endpoints
///
/// Emails are trimmed, length-limited and checked against a practical
/// RFC 5322 subset before they reach the store.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::RequestFormatError;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321
const MAX_LOCAL_PART_LENGTH: usize = 64;
const MIN_EMAIL_LENGTH: usize = 5;

lazy_static! {
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).expect("email regex is valid");
}

/// Validates an email address and returns it trimmed
pub fn is_valid_email(email: &str) -> Result<String, RequestFormatError> {
    let trimmed = email.trim();

    if trimmed.is_empty() {
        return Err(invalid_email("is empty"));
    }

    if trimmed.len() < MIN_EMAIL_LENGTH {
        return Err(invalid_email("is too short"));
    }

    if trimmed.len() > MAX_EMAIL_LENGTH {
        return Err(invalid_email("is too long"));
    }

    if !EMAIL_REGEX.is_match(trimmed) {
        return Err(invalid_email("has invalid format"));
    }

    if let Some(at_pos) = trimmed.find('@') {
        if at_pos > MAX_LOCAL_PART_LENGTH {
            return Err(invalid_email("local part is too long"));
        }
    }

    Ok(trimmed.to_string())
}

fn invalid_email(reason: &str) -> RequestFormatError {
    RequestFormatError::InvalidField("email", reason.to_string())
}
