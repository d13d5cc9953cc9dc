//! Form field checks shared by sign-up, login and profile updates

use super::result::{Error, Result};

pub const MIN_USER_ID_CHARS: usize = 3;
pub const MIN_PASSWORD_CHARS: usize = 8;

/// Check a user id: present, no spaces, at least 3 characters
pub fn validate_user_id(user_id: &str) -> Result<()> {
    if user_id.trim().is_empty() {
        return Err(Error::validation("enter a user id"));
    }
    if user_id.contains(' ') {
        return Err(Error::validation("user id must not contain spaces"));
    }
    if user_id.chars().count() < MIN_USER_ID_CHARS {
        return Err(Error::validation(format!(
            "user id must be at least {} characters",
            MIN_USER_ID_CHARS
        )));
    }
    Ok(())
}

/// Check a password: present, at least 8 characters
pub fn validate_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(Error::validation("enter a password"));
    }
    validate_password_length(password)
}

/// Length rule alone, used when changing a password
pub fn validate_password_length(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(Error::validation(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_CHARS
        )));
    }
    Ok(())
}

/// Trim a required text field, rejecting blank input with `message`
pub fn require_text(value: &str, message: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(message));
    }
    Ok(trimmed.to_string())
}
