//! Authentication service - credential checks and profile lookup

use std::sync::Arc;

use crate::domain::result::{Error, Result};
use crate::domain::validation::{validate_password, validate_user_id};
use crate::domain::{find_demo_account, ProfileView};
use crate::ports::UserRepository;

use super::password::{hash_password, needs_rehash, verify_password};

/// Authentication against the credential store, with the built-in demo
/// accounts as a fallback
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    allow_demo_accounts: bool,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, allow_demo_accounts: bool) -> Self {
        Self {
            users,
            allow_demo_accounts,
        }
    }

    /// Check a user id and password
    ///
    /// Registered users are verified against their stored hash. Ids that are
    /// not registered fall back to the demo account table (plaintext compare).
    /// Unknown ids and wrong passwords fail with the same `AuthFailure`.
    ///
    /// A legacy bcrypt hash is upgraded to Argon2id once it verifies.
    pub fn authenticate(&self, user_id: &str, password: &str) -> Result<ProfileView> {
        if let Some(mut record) = self.users.find_by_id(user_id)? {
            if !verify_password(password, &record.pw_hash) {
                return Err(Error::auth_failure());
            }
            if needs_rehash(&record.pw_hash) {
                record.pw_hash = hash_password(password)?;
                self.users.update(&record)?;
            }
            return Ok(record.profile());
        }

        if self.allow_demo_accounts {
            if let Some(demo) = find_demo_account(user_id) {
                if demo.password_matches(password) {
                    return Ok(demo.profile());
                }
            }
        }

        Err(Error::auth_failure())
    }

    /// Login form submission: field checks first, then `authenticate`
    pub fn login(&self, user_id: &str, password: &str) -> Result<ProfileView> {
        validate_user_id(user_id)?;
        validate_password(password)?;
        self.authenticate(user_id, password)
    }

    /// Profile for a user id: credential store first, then demo accounts
    pub fn get_profile(&self, user_id: &str) -> Result<Option<ProfileView>> {
        if let Some(record) = self.users.find_by_id(user_id)? {
            return Ok(Some(record.profile()));
        }
        if self.allow_demo_accounts {
            return Ok(find_demo_account(user_id).map(|demo| demo.profile()));
        }
        Ok(None)
    }
}
