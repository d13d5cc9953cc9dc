//! User domain model

use serde::{Deserialize, Serialize};

/// A registered user as stored in the credential store
///
/// Field order matches the persisted column order:
/// `user_id,pw_hash,email,nickname,joined`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: String,
    pub pw_hash: String,
    pub email: String,
    pub nickname: String,
    /// Join date, `YYYY-MM-DD`
    pub joined: String,
}

impl UserRecord {
    pub fn new(
        user_id: impl Into<String>,
        pw_hash: impl Into<String>,
        email: impl Into<String>,
        nickname: impl Into<String>,
        joined: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            pw_hash: pw_hash.into(),
            email: email.into(),
            nickname: nickname.into(),
            joined: joined.into(),
        }
    }

    /// The part of the record that may be shown to a logged-in session
    pub fn profile(&self) -> ProfileView {
        ProfileView {
            user_id: self.user_id.clone(),
            nickname: self.nickname.clone(),
            email: self.email.clone(),
            joined: self.joined.clone(),
        }
    }
}

/// A user's public profile (never carries the password hash)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileView {
    pub user_id: String,
    pub nickname: String,
    pub email: String,
    pub joined: String,
}
