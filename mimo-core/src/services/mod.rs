//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

mod auth;
mod backup;
mod favorites;
pub mod logging;
pub mod migration;
pub mod password;
mod profile;
mod registration;
mod reviews;

pub use auth::AuthService;
pub use backup::{BackupService, ClearResult};
pub use favorites::FavoriteService;
pub use logging::{EntryPoint, LogEntry, LogEvent, LoggingService};
pub use migration::{MigrationResult, MigrationService};
pub use password::{hash_password, verify_password};
pub use profile::{ProfileService, NICKNAME_CHANGED, PASSWORD_CHANGED};
pub use registration::{RegistrationService, SignUpRequest, RESET_REQUESTED};
pub use reviews::{ReviewService, REVIEW_SAVED};
