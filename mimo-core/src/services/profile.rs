//! Profile service - nickname and password changes

use std::sync::Arc;

use crate::domain::result::{Error, Result};
use crate::domain::validation::{require_text, validate_password_length};
use crate::ports::UserRepository;

use super::password::{hash_password, verify_password};

pub const NICKNAME_CHANGED: &str = "nickname updated";
pub const PASSWORD_CHANGED: &str = "password updated";

pub struct ProfileService {
    users: Arc<dyn UserRepository>,
}

impl ProfileService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Set a registered user's nickname (trimmed)
    pub fn update_nickname(&self, user_id: &str, new_nickname: &str) -> Result<String> {
        let mut record = self
            .users
            .find_by_id(user_id)?
            .ok_or_else(|| Error::not_found("user not found"))?;
        record.nickname = require_text(new_nickname, "enter a nickname")?;
        self.users.update(&record)?;
        Ok(NICKNAME_CHANGED.to_string())
    }

    /// Replace a registered user's password after checking the current one
    pub fn change_password(
        &self,
        user_id: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<String> {
        let mut record = self
            .users
            .find_by_id(user_id)?
            .ok_or_else(|| Error::not_found("user not found"))?;
        if !verify_password(current_password, &record.pw_hash) {
            return Err(Error::AuthFailure(
                "current password does not match".to_string(),
            ));
        }
        validate_password_length(new_password)?;

        record.pw_hash = hash_password(new_password)?;
        self.users.update(&record)?;
        Ok(PASSWORD_CHANGED.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::csv::CsvRepository;
    use crate::domain::UserRecord;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Arc<CsvRepository>, ProfileService) {
        let dir = TempDir::new().unwrap();
        let repo = Arc::new(CsvRepository::new(dir.path()));
        let hash = hash_password("old-password").unwrap();
        repo.insert(&UserRecord::new("alice", hash, "a@example.com", "Alice", "2025-03-01"))
            .unwrap();
        repo.insert(&UserRecord::new("bob", "h", "b@example.com", "Bob", "2025-03-02"))
            .unwrap();
        let service = ProfileService::new(repo.clone());
        (dir, repo, service)
    }

    #[test]
    fn test_update_nickname_trims() {
        let (_dir, repo, service) = setup();
        assert_eq!(service.update_nickname("alice", "  Ali  ").unwrap(), NICKNAME_CHANGED);
        assert_eq!(repo.find_by_id("alice").unwrap().unwrap().nickname, "Ali");
        // Other rows are untouched
        assert_eq!(repo.find_by_id("bob").unwrap().unwrap().nickname, "Bob");
    }

    #[test]
    fn test_update_nickname_errors() {
        let (_dir, repo, service) = setup();
        assert!(matches!(
            service.update_nickname("nobody", "X").unwrap_err(),
            Error::NotFound(_)
        ));
        assert!(matches!(
            service.update_nickname("alice", "   ").unwrap_err(),
            Error::Validation(_)
        ));
        assert_eq!(repo.find_by_id("alice").unwrap().unwrap().nickname, "Alice");
    }

    #[test]
    fn test_demo_only_user_cannot_change_nickname() {
        let (_dir, _repo, service) = setup();
        assert!(matches!(
            service.update_nickname("guest", "Visitor").unwrap_err(),
            Error::NotFound(_)
        ));
    }

    #[test]
    fn test_change_password() {
        let (_dir, repo, service) = setup();
        assert_eq!(
            service.change_password("alice", "old-password", "new-password").unwrap(),
            PASSWORD_CHANGED
        );
        let stored = repo.find_by_id("alice").unwrap().unwrap();
        assert!(verify_password("new-password", &stored.pw_hash));
        assert!(!verify_password("old-password", &stored.pw_hash));
    }

    #[test]
    fn test_change_password_rejections_keep_hash() {
        let (_dir, repo, service) = setup();
        let before = repo.find_by_id("alice").unwrap().unwrap().pw_hash;

        assert!(matches!(
            service.change_password("alice", "wrong", "new-password").unwrap_err(),
            Error::AuthFailure(_)
        ));
        assert!(matches!(
            service.change_password("alice", "old-password", "short").unwrap_err(),
            Error::Validation(_)
        ));
        assert!(matches!(
            service.change_password("nobody", "old-password", "new-password").unwrap_err(),
            Error::NotFound(_)
        ));

        assert_eq!(repo.find_by_id("alice").unwrap().unwrap().pw_hash, before);
    }
}
