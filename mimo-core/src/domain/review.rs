//! Review domain model

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Timestamp format for `created_at`
pub const REVIEW_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// A review written by a user. Reviews are append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewEntry {
    pub title: String,
    pub review: String,
    pub created_at: String,
}

impl ReviewEntry {
    /// Create a review stamped with the current local time
    pub fn new(title: impl Into<String>, review: impl Into<String>) -> Self {
        Self::at(title, review, Local::now().naive_local())
    }

    pub fn at(title: impl Into<String>, review: impl Into<String>, at: NaiveDateTime) -> Self {
        Self {
            title: title.into(),
            review: review.into(),
            created_at: at.format(REVIEW_TIME_FORMAT).to_string(),
        }
    }
}
