//! Adapter implementations
//!
//! Adapters implement the repository ports with concrete storage:
//! - CSV files under the data root (the default)
//! - DuckDB for a single-file database backing

pub mod csv;
pub mod duckdb;
