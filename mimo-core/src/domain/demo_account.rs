//! Built-in demo accounts
//!
//! These accounts predate the credential store and are only consulted when a
//! user id is not registered there. Their passwords are compiled in as
//! plaintext and compared directly. That is a known weakness of the demo;
//! deployments that care can disable the fallback (`allowDemoAccounts`).

use super::ProfileView;

/// A fixed, compiled-in account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoAccount {
    pub user_id: &'static str,
    pub password: &'static str,
    pub nickname: &'static str,
    pub email: &'static str,
    pub joined: &'static str,
}

impl DemoAccount {
    pub fn profile(&self) -> ProfileView {
        ProfileView {
            user_id: self.user_id.to_string(),
            nickname: self.nickname.to_string(),
            email: self.email.to_string(),
            joined: self.joined.to_string(),
        }
    }

    /// Plaintext comparison, see the module docs
    pub fn password_matches(&self, password: &str) -> bool {
        self.password == password
    }
}

pub const DEMO_ACCOUNTS: &[DemoAccount] = &[
    DemoAccount {
        user_id: "guest",
        password: "12341234",
        nickname: "게스트",
        email: "guest@example.com",
        joined: "2025-01-01",
    },
    DemoAccount {
        user_id: "neo",
        password: "matrix1234",
        nickname: "네오",
        email: "neo@zion.ai",
        joined: "2024-10-10",
    },
];

/// Look up a demo account by user id
pub fn find_demo_account(user_id: &str) -> Option<&'static DemoAccount> {
    DEMO_ACCOUNTS.iter().find(|a| a.user_id == user_id)
}
