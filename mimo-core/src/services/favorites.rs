//! Favorites service - per-user favorite titles

use std::sync::Arc;

use crate::domain::result::Result;
use crate::domain::{seed_favorites, FavoriteEntry, Page, FAVORITES_PAGE_SIZE};
use crate::ports::FavoriteRepository;

pub struct FavoriteService {
    favorites: Arc<dyn FavoriteRepository>,
}

impl FavoriteService {
    pub fn new(favorites: Arc<dyn FavoriteRepository>) -> Self {
        Self { favorites }
    }

    /// All favorites for a user
    ///
    /// A user with no favorites gets the ten placeholder titles, which are
    /// persisted before being returned.
    pub fn list(&self, user_id: &str) -> Result<Vec<FavoriteEntry>> {
        let existing = self.favorites.load(user_id)?;
        if !existing.is_empty() {
            return Ok(existing);
        }

        let mut listed = Vec::new();
        self.favorites.modify(user_id, &mut |entries| {
            if entries.is_empty() {
                *entries = seed_favorites();
            }
            listed = entries.clone();
            Ok(())
        })?;
        Ok(listed)
    }

    /// One page of favorites (8 per page, clamped to the valid range)
    pub fn page(&self, user_id: &str, page: usize) -> Result<Page<FavoriteEntry>> {
        let all = self.list(user_id)?;
        Ok(Page::of(&all, page, FAVORITES_PAGE_SIZE))
    }

    /// Remove a title; removing an unknown id changes nothing
    pub fn remove(&self, user_id: &str, title_id: i64) -> Result<()> {
        self.favorites.modify(user_id, &mut |entries| {
            entries.retain(|f| f.title_id != title_id);
            Ok(())
        })
    }
}
