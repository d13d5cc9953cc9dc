//! Mimo Core - accounts, favorites and reviews for the Mimo movie app
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core entities (UserRecord, FavoriteEntry, ReviewEntry, etc.)
//! - **ports**: Repository traits for the credential and per-user stores
//! - **services**: Business logic orchestration
//! - **adapters**: Concrete implementations (CSV files, DuckDB)

pub mod domain;
pub mod ports;
pub mod services;
pub mod adapters;
pub mod config;
pub mod migrations;
pub mod log_migrations;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use adapters::csv::CsvRepository;
use adapters::duckdb::{DuckDbRepository, DB_FILE};
use config::{Config, StorageBackend};
use ports::{FavoriteRepository, ReviewRepository, UserRepository};
use services::*;

// Re-export commonly used types at crate root
pub use domain::{
    BackupMetadata, DemoAccount, FavoriteEntry, Page, ProfileView, ReviewEntry, UserRecord,
};
pub use domain::result::{Error, OperationResult};
pub use services::{EntryPoint, LogEntry, LogEvent, LoggingService};

/// Main context for Mimo operations
///
/// This is the primary entry point for all business logic. It holds the
/// configuration, the repository selected by `app.storage`, and all services.
pub struct MimoContext {
    pub root: PathBuf,
    pub config: Config,
    pub auth_service: AuthService,
    pub registration_service: RegistrationService,
    pub profile_service: ProfileService,
    pub favorite_service: FavoriteService,
    pub review_service: ReviewService,
    pub backup_service: BackupService,
}

impl MimoContext {
    /// Create a new Mimo context rooted at `root`
    pub fn new(root: &Path) -> Result<Self> {
        let config = Config::load(root)?;

        let (users, favorites, reviews): (
            Arc<dyn UserRepository>,
            Arc<dyn FavoriteRepository>,
            Arc<dyn ReviewRepository>,
        ) = match config.storage {
            StorageBackend::Csv => {
                let repository = Arc::new(CsvRepository::new(root));
                (repository.clone() as _, repository.clone() as _, repository as _)
            }
            StorageBackend::Duckdb => {
                let repository = Arc::new(DuckDbRepository::new(&root.join(DB_FILE))?);
                repository.ensure_schema()?;
                (repository.clone() as _, repository.clone() as _, repository as _)
            }
        };

        Ok(Self {
            root: root.to_path_buf(),
            auth_service: AuthService::new(Arc::clone(&users), config.allow_demo_accounts),
            registration_service: RegistrationService::new(Arc::clone(&users)),
            profile_service: ProfileService::new(users),
            favorite_service: FavoriteService::new(favorites),
            review_service: ReviewService::new(reviews),
            backup_service: BackupService::new(root),
            config,
        })
    }
}
