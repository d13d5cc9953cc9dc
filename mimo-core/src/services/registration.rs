//! Registration service - sign-up and account recovery lookups

use std::sync::Arc;

use chrono::Local;
use serde::Deserialize;

use crate::domain::result::{Error, Result};
use crate::domain::validation::{require_text, validate_password, validate_user_id};
use crate::domain::{ProfileView, UserRecord};
use crate::ports::UserRepository;

use super::password::hash_password;

/// Confirmation shown after a successful reset request. No mail is sent;
/// a real flow would issue a token and email a link.
pub const RESET_REQUESTED: &str = "a reset link has been sent (demo message)";

/// Sign-up form fields
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignUpRequest {
    pub user_id: String,
    pub password: String,
    pub password_confirm: String,
    pub email: String,
    pub nickname: String,
}

pub struct RegistrationService {
    users: Arc<dyn UserRepository>,
}

impl RegistrationService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Register a new user and return their profile
    ///
    /// The duplicate checks run inside the same read-modify-write cycle as
    /// the insert, so a rejected sign-up leaves the store untouched.
    pub fn sign_up(&self, request: &SignUpRequest) -> Result<ProfileView> {
        validate_user_id(&request.user_id)?;
        validate_password(&request.password)?;
        if request.password != request.password_confirm {
            return Err(Error::validation("password confirmation does not match"));
        }
        require_text(&request.email, "enter an email")?;

        let record = UserRecord::new(
            request.user_id.clone(),
            hash_password(&request.password)?,
            request.email.clone(),
            request.nickname.clone(),
            Local::now().date_naive().format("%Y-%m-%d").to_string(),
        );

        self.users.modify(&mut |records| {
            if records.iter().any(|u| u.user_id == record.user_id) {
                return Err(Error::conflict("user id already exists"));
            }
            if records.iter().any(|u| u.email == record.email) {
                return Err(Error::conflict("email is already registered"));
            }
            records.push(record.clone());
            Ok(())
        })?;

        Ok(record.profile())
    }

    /// Find the user id registered with `email`
    pub fn find_user_id(&self, email: &str) -> Result<String> {
        require_text(email, "enter an email")?;
        self.users
            .find_by_email(email)?
            .map(|u| u.user_id)
            .ok_or_else(|| Error::not_found("no account is registered with that email"))
    }

    /// Check that `user_id` and `email` belong to the same account
    pub fn request_password_reset(&self, user_id: &str, email: &str) -> Result<String> {
        require_text(email, "enter an email")?;
        let matched = self
            .users
            .load_all()?
            .iter()
            .any(|u| u.user_id == user_id && u.email == email);
        if !matched {
            return Err(Error::not_found("user id and email do not match"));
        }
        Ok(RESET_REQUESTED.to_string())
    }
}
