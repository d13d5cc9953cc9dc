//! Repository ports - storage abstraction per entity
//!
//! Every mutation is a whole-set read-modify-write: `modify` loads the full
//! set, hands it to the caller, and writes the result back. Adapters decide
//! how that cycle is protected (file lock, database transaction).

use crate::domain::result::{Error, Result};
use crate::domain::{FavoriteEntry, ReviewEntry, UserRecord};

/// Credential store
pub trait UserRepository: Send + Sync {
    /// All records, or an empty set when nothing has been stored yet
    fn load_all(&self) -> Result<Vec<UserRecord>>;

    /// Overwrite the store with exactly `records`
    fn save_all(&self, records: &[UserRecord]) -> Result<()>;

    /// Load, apply `apply`, save. Nothing is written if `apply` fails.
    fn modify(&self, apply: &mut dyn FnMut(&mut Vec<UserRecord>) -> Result<()>) -> Result<()>;

    fn find_by_id(&self, user_id: &str) -> Result<Option<UserRecord>> {
        Ok(self.load_all()?.into_iter().find(|u| u.user_id == user_id))
    }

    fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        Ok(self.load_all()?.into_iter().find(|u| u.email == email))
    }

    fn insert(&self, record: &UserRecord) -> Result<()> {
        self.modify(&mut |records| {
            records.push(record.clone());
            Ok(())
        })
    }

    /// Replace the record with the same user id
    fn update(&self, record: &UserRecord) -> Result<()> {
        self.modify(&mut |records| {
            let existing = records
                .iter_mut()
                .find(|u| u.user_id == record.user_id)
                .ok_or_else(|| Error::not_found("user not found"))?;
            *existing = record.clone();
            Ok(())
        })
    }
}

/// Per-user favorites
pub trait FavoriteRepository: Send + Sync {
    /// The user's favorites in stored order; empty if never written
    fn load(&self, user_id: &str) -> Result<Vec<FavoriteEntry>>;

    fn save(&self, user_id: &str, entries: &[FavoriteEntry]) -> Result<()>;

    fn modify(
        &self,
        user_id: &str,
        apply: &mut dyn FnMut(&mut Vec<FavoriteEntry>) -> Result<()>,
    ) -> Result<()>;
}

/// Per-user reviews, append-only
pub trait ReviewRepository: Send + Sync {
    /// The user's reviews in insertion order; empty if never written
    fn load(&self, user_id: &str) -> Result<Vec<ReviewEntry>>;

    fn append(&self, user_id: &str, entry: &ReviewEntry) -> Result<()>;
}
