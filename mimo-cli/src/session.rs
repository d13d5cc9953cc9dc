//! Login session - the current user, kept between invocations
//!
//! Stored as `.session.json` in the data root. It holds the profile only,
//! never a password or hash.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mimo_core::ProfileView;

pub const SESSION_FILE: &str = ".session.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub profile: ProfileView,
    pub logged_in_at: DateTime<Utc>,
}

impl Session {
    pub fn new(profile: ProfileView) -> Self {
        Self {
            profile,
            logged_in_at: Utc::now(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.profile.user_id
    }

    /// The saved session, if any. An unreadable file counts as logged out.
    pub fn load(root: &Path) -> Result<Option<Self>> {
        let path = root.join(SESSION_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(serde_json::from_str(&content).ok())
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(root.join(SESSION_FILE), content).context("Failed to save session")?;
        Ok(())
    }

    /// Replace the profile, keeping the login time
    pub fn refresh(&mut self, profile: ProfileView, root: &Path) -> Result<()> {
        self.profile = profile;
        self.save(root)
    }

    /// Remove the saved session; returns whether one existed
    pub fn clear(root: &Path) -> Result<bool> {
        let path = root.join(SESSION_FILE);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).context("Failed to remove session")?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn profile(nickname: &str) -> ProfileView {
        ProfileView {
            user_id: "neo".to_string(),
            nickname: nickname.to_string(),
            email: "neo@zion.ai".to_string(),
            joined: "2024-10-10".to_string(),
        }
    }

    #[test]
    fn test_no_session_file() {
        let dir = TempDir::new().unwrap();
        assert!(Session::load(dir.path()).unwrap().is_none());
        assert!(!Session::clear(dir.path()).unwrap());
    }

    #[test]
    fn test_save_load_refresh_clear() {
        let dir = TempDir::new().unwrap();
        let mut session = Session::new(profile("네오"));
        session.save(dir.path()).unwrap();
        assert_eq!(Session::load(dir.path()).unwrap(), Some(session.clone()));

        session.refresh(profile("The One"), dir.path()).unwrap();
        let loaded = Session::load(dir.path()).unwrap().unwrap();
        assert_eq!(loaded.profile.nickname, "The One");
        assert_eq!(loaded.user_id(), "neo");

        assert!(Session::clear(dir.path()).unwrap());
        assert!(Session::load(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_corrupt_session_is_logged_out() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(SESSION_FILE), "{").unwrap();
        assert!(Session::load(dir.path()).unwrap().is_none());
    }
}
