//! Favorite title domain model

use serde::{Deserialize, Serialize};

/// Number of placeholder favorites created for a new user
pub const SEED_COUNT: i64 = 10;

/// A title on a user's favorites list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteEntry {
    /// Unique per user
    pub title_id: i64,
    pub title: String,
    /// Emoji or glyph shown in place of a poster image
    pub poster: String,
}

impl FavoriteEntry {
    pub fn new(title_id: i64, title: impl Into<String>, poster: impl Into<String>) -> Self {
        Self {
            title_id,
            title: title.into(),
            poster: poster.into(),
        }
    }
}

/// Deterministic placeholder favorites: ids 1..=10
pub fn seed_favorites() -> Vec<FavoriteEntry> {
    (1..=SEED_COUNT)
        .map(|n| FavoriteEntry::new(n, format!("영화 제목 {}", n), "🎬"))
        .collect()
}
