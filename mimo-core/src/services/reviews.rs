//! Review service - per-user reviews, append-only

use std::sync::Arc;

use crate::domain::result::Result;
use crate::domain::validation::require_text;
use crate::domain::ReviewEntry;
use crate::ports::ReviewRepository;

pub const REVIEW_SAVED: &str = "review saved";

pub struct ReviewService {
    reviews: Arc<dyn ReviewRepository>,
}

impl ReviewService {
    pub fn new(reviews: Arc<dyn ReviewRepository>) -> Self {
        Self { reviews }
    }

    /// A user's reviews, oldest first
    pub fn list(&self, user_id: &str) -> Result<Vec<ReviewEntry>> {
        self.reviews.load(user_id)
    }

    /// Append a review stamped with the current time
    pub fn add(&self, user_id: &str, title: &str, body: &str) -> Result<ReviewEntry> {
        let title = require_text(title, "enter a movie title")?;
        let body = require_text(body, "enter the review text")?;

        let entry = ReviewEntry::new(title, body);
        self.reviews.append(user_id, &entry)?;
        Ok(entry)
    }
}
