//! Core domain entities
//!
//! Plain data structures and input checks. No I/O happens here.

mod backup;
pub mod demo_account;
mod favorite;
pub mod pagination;
pub mod result;
mod review;
mod user;
pub mod validation;

pub use backup::BackupMetadata;
pub use demo_account::{find_demo_account, DemoAccount, DEMO_ACCOUNTS};
pub use favorite::{seed_favorites, FavoriteEntry, SEED_COUNT};
pub use pagination::{Page, FAVORITES_PAGE_SIZE};
pub use review::{ReviewEntry, REVIEW_TIME_FORMAT};
pub use user::{ProfileView, UserRecord};
