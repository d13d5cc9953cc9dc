//! DuckDB repository implementation
//!
//! Embedded alternative to the CSV files. Each read-modify-write cycle runs
//! inside a single database transaction.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use duckdb::{params, Connection};

use crate::domain::result::{Error, Result};
use crate::domain::{FavoriteEntry, ReviewEntry, UserRecord};
use crate::ports::{FavoriteRepository, ReviewRepository, UserRepository};
use crate::services::{MigrationResult, MigrationService};

pub const DB_FILE: &str = "mimo.duckdb";

/// Maximum number of retries when database file is locked
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100, 200, 400ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

/// Check if an error message indicates a file locking issue that should be retried
fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    // Windows error messages
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        // Unix/macOS error messages
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("file is already open")
}

/// DuckDB repository for users, favorites and reviews
pub struct DuckDbRepository {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl DuckDbRepository {
    /// Open (or create) the database
    ///
    /// Retries with exponential backoff while another process holds the file.
    pub fn new(db_path: &Path) -> Result<Self> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            match Self::try_open_connection(db_path) {
                Ok(conn) => {
                    return Ok(Self {
                        conn: Mutex::new(conn),
                        db_path: db_path.to_path_buf(),
                    });
                }
                Err(e) => {
                    if is_retryable_error(&e.to_string()) && attempt < MAX_RETRIES - 1 {
                        let delay =
                            Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt));
                        thread::sleep(delay);
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }

        Err(last_error.map(Error::from).unwrap_or_else(|| {
            Error::storage(format!("failed to open database after {} retries", MAX_RETRIES))
        }))
    }

    /// In-memory database, for tests and throwaway sessions
    pub fn in_memory() -> Result<Self> {
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        let conn = Connection::open_in_memory_with_flags(config)?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path: PathBuf::from(":memory:"),
        })
    }

    fn try_open_connection(db_path: &Path) -> duckdb::Result<Connection> {
        // Extension autoloading stays off; nothing here needs extensions
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        Connection::open_with_flags(db_path, config)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| Error::storage(format!("Lock poisoned: {}", e)))
    }

    /// Run database migrations using the MigrationService
    pub fn run_migrations(&self) -> Result<MigrationResult> {
        let conn = self.conn()?;
        MigrationService::new(&conn)
            .run_pending()
            .map_err(|e| Error::storage(format!("migration failed: {:#}", e)))
    }

    /// Ensure database schema exists (runs pending migrations)
    pub fn ensure_schema(&self) -> Result<()> {
        self.run_migrations()?;
        Ok(())
    }
}

// === Row helpers (run on an open connection or transaction) ===

fn select_users(conn: &Connection) -> Result<Vec<UserRecord>> {
    let mut stmt = conn.prepare(
        "SELECT user_id, pw_hash, email, nickname, joined FROM users ORDER BY seq",
    )?;
    let users = stmt
        .query_map([], |row| {
            Ok(UserRecord {
                user_id: row.get(0)?,
                pw_hash: row.get(1)?,
                email: row.get(2)?,
                nickname: row.get(3)?,
                joined: row.get(4)?,
            })
        })?
        .collect::<duckdb::Result<Vec<_>>>()?;
    Ok(users)
}

fn replace_users(conn: &Connection, records: &[UserRecord]) -> Result<()> {
    conn.execute("DELETE FROM users", [])?;
    let mut stmt = conn.prepare(
        "INSERT INTO users (user_id, pw_hash, email, nickname, joined, seq) VALUES (?, ?, ?, ?, ?, ?)",
    )?;
    for (seq, u) in records.iter().enumerate() {
        stmt.execute(params![u.user_id, u.pw_hash, u.email, u.nickname, u.joined, seq as i64])?;
    }
    Ok(())
}

fn select_favorites(conn: &Connection, user_id: &str) -> Result<Vec<FavoriteEntry>> {
    let mut stmt = conn.prepare(
        "SELECT title_id, title, poster FROM favorites WHERE user_id = ? ORDER BY seq",
    )?;
    let entries = stmt
        .query_map([user_id], |row| {
            Ok(FavoriteEntry {
                title_id: row.get(0)?,
                title: row.get(1)?,
                poster: row.get(2)?,
            })
        })?
        .collect::<duckdb::Result<Vec<_>>>()?;
    Ok(entries)
}

fn replace_favorites(conn: &Connection, user_id: &str, entries: &[FavoriteEntry]) -> Result<()> {
    conn.execute("DELETE FROM favorites WHERE user_id = ?", [user_id])?;
    let mut stmt = conn.prepare(
        "INSERT INTO favorites (user_id, seq, title_id, title, poster) VALUES (?, ?, ?, ?, ?)",
    )?;
    for (seq, f) in entries.iter().enumerate() {
        stmt.execute(params![user_id, seq as i64, f.title_id, f.title, f.poster])?;
    }
    Ok(())
}

fn select_reviews(conn: &Connection, user_id: &str) -> Result<Vec<ReviewEntry>> {
    let mut stmt = conn.prepare(
        "SELECT title, review, created_at FROM reviews WHERE user_id = ? ORDER BY seq",
    )?;
    let entries = stmt
        .query_map([user_id], |row| {
            Ok(ReviewEntry {
                title: row.get(0)?,
                review: row.get(1)?,
                created_at: row.get(2)?,
            })
        })?
        .collect::<duckdb::Result<Vec<_>>>()?;
    Ok(entries)
}

impl UserRepository for DuckDbRepository {
    fn load_all(&self) -> Result<Vec<UserRecord>> {
        let conn = self.conn()?;
        select_users(&conn)
    }

    fn save_all(&self, records: &[UserRecord]) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        replace_users(&tx, records)?;
        tx.commit()?;
        Ok(())
    }

    fn modify(&self, apply: &mut dyn FnMut(&mut Vec<UserRecord>) -> Result<()>) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut records = select_users(&tx)?;
        apply(&mut records)?;
        replace_users(&tx, &records)?;
        tx.commit()?;
        Ok(())
    }
}

impl FavoriteRepository for DuckDbRepository {
    fn load(&self, user_id: &str) -> Result<Vec<FavoriteEntry>> {
        let conn = self.conn()?;
        select_favorites(&conn, user_id)
    }

    fn save(&self, user_id: &str, entries: &[FavoriteEntry]) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        replace_favorites(&tx, user_id, entries)?;
        tx.commit()?;
        Ok(())
    }

    fn modify(
        &self,
        user_id: &str,
        apply: &mut dyn FnMut(&mut Vec<FavoriteEntry>) -> Result<()>,
    ) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut entries = select_favorites(&tx, user_id)?;
        apply(&mut entries)?;
        replace_favorites(&tx, user_id, &entries)?;
        tx.commit()?;
        Ok(())
    }
}

impl ReviewRepository for DuckDbRepository {
    fn load(&self, user_id: &str) -> Result<Vec<ReviewEntry>> {
        let conn = self.conn()?;
        select_reviews(&conn, user_id)
    }

    fn append(&self, user_id: &str, entry: &ReviewEntry) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let next_seq: i64 = tx.query_row(
            "SELECT COALESCE(MAX(seq) + 1, 0) FROM reviews WHERE user_id = ?",
            [user_id],
            |row| row.get(0),
        )?;
        tx.execute(
            "INSERT INTO reviews (user_id, seq, title, review, created_at) VALUES (?, ?, ?, ?, ?)",
            params![user_id, next_seq, entry.title, entry.review, entry.created_at],
        )?;
        tx.commit()?;
        Ok(())
    }
}
