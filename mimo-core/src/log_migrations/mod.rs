//! Log database migrations - embedded SQL files
//!
//! Kept separate from the data migrations because the event log lives in its
//! own database file (logs.duckdb) and exists for every storage backend.

/// All log migrations, embedded at compile time.
/// Format: (filename, sql_content)
pub const LOG_MIGRATIONS: &[(&str, &str)] = &[
    ("000_migrations.sql", include_str!("000_migrations.sql")),
    (
        "001_initial_schema.sql",
        include_str!("001_initial_schema.sql"),
    ),
];
