//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for storage. Services depend only on these
//! traits; the CSV and DuckDB adapters provide the backings.

mod repository;

pub use repository::{FavoriteRepository, ReviewRepository, UserRepository};
