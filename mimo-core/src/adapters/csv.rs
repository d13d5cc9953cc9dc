//! Flat-file repository implementation
//!
//! Layout relative to the data root:
//!
//! ```text
//! .users_demo.csv                     user_id,pw_hash,email,nickname,joined
//! data/user_<user_id>/favorites.csv   title_id,title,poster
//! data/user_<user_id>/reviews.csv     title,review,created_at
//! ```
//!
//! A missing file reads as an empty table. Every write rewrites the whole
//! file through a temp file in the same directory and renames it into place,
//! while holding an exclusive lock on `.mimo.lock`.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::domain::result::{Error, Result};
use crate::domain::{FavoriteEntry, ReviewEntry, UserRecord};
use crate::ports::{FavoriteRepository, ReviewRepository, UserRepository};

pub const USERS_FILE: &str = ".users_demo.csv";
pub const DATA_DIR: &str = "data";
pub const FAVORITES_FILE: &str = "favorites.csv";
pub const REVIEWS_FILE: &str = "reviews.csv";
const LOCK_FILE: &str = ".mimo.lock";

const USER_COLUMNS: &[&str] = &["user_id", "pw_hash", "email", "nickname", "joined"];
const FAVORITE_COLUMNS: &[&str] = &["title_id", "title", "poster"];
const REVIEW_COLUMNS: &[&str] = &["title", "review", "created_at"];

/// Exclusive advisory lock on the data root, released on drop
pub struct RootLock {
    file: File,
}

impl Drop for RootLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

/// CSV-backed repository for users, favorites and reviews
pub struct CsvRepository {
    root: PathBuf,
}

impl CsvRepository {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn users_path(&self) -> PathBuf {
        self.root.join(USERS_FILE)
    }

    /// `data/user_<user_id>`, created on first access
    pub fn user_dir(&self, user_id: &str) -> Result<PathBuf> {
        if user_id.is_empty()
            || user_id.contains(['/', '\\'])
            || user_id == "."
            || user_id == ".."
        {
            return Err(Error::validation("user id cannot be used as a directory name"));
        }
        let dir = self.root.join(DATA_DIR).join(format!("user_{}", user_id));
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    pub fn favorites_path(&self, user_id: &str) -> Result<PathBuf> {
        Ok(self.user_dir(user_id)?.join(FAVORITES_FILE))
    }

    pub fn reviews_path(&self, user_id: &str) -> Result<PathBuf> {
        Ok(self.user_dir(user_id)?.join(REVIEWS_FILE))
    }

    /// Take the `.mimo.lock` held by every write to this root
    pub fn lock(&self) -> Result<RootLock> {
        fs::create_dir_all(&self.root)?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.root.join(LOCK_FILE))?;
        FileExt::lock_exclusive(&file)?;
        Ok(RootLock { file })
    }
}

/// Read every row of `path`; a missing file is an empty table
fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| Error::storage(format!("failed to open {}: {}", path.display(), e)))?;
    reader
        .deserialize()
        .collect::<std::result::Result<Vec<T>, _>>()
        .map_err(|e| Error::storage(format!("failed to read {}: {}", path.display(), e)))
}

/// Rewrite `path` with a header row followed by `rows`
fn write_rows<T: Serialize>(path: &Path, columns: &[&str], rows: &[T]) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| Error::storage(format!("no parent directory for {}", path.display())))?;
    fs::create_dir_all(dir)?;

    let mut temp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(temp.as_file_mut());
        writer.write_record(columns)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
    }
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

impl UserRepository for CsvRepository {
    fn load_all(&self) -> Result<Vec<UserRecord>> {
        read_rows(&self.users_path())
    }

    fn save_all(&self, records: &[UserRecord]) -> Result<()> {
        let _lock = self.lock()?;
        write_rows(&self.users_path(), USER_COLUMNS, records)
    }

    fn modify(&self, apply: &mut dyn FnMut(&mut Vec<UserRecord>) -> Result<()>) -> Result<()> {
        let _lock = self.lock()?;
        let path = self.users_path();
        let mut records = read_rows(&path)?;
        apply(&mut records)?;
        write_rows(&path, USER_COLUMNS, &records)
    }
}

impl FavoriteRepository for CsvRepository {
    fn load(&self, user_id: &str) -> Result<Vec<FavoriteEntry>> {
        read_rows(&self.favorites_path(user_id)?)
    }

    fn save(&self, user_id: &str, entries: &[FavoriteEntry]) -> Result<()> {
        let path = self.favorites_path(user_id)?;
        let _lock = self.lock()?;
        write_rows(&path, FAVORITE_COLUMNS, entries)
    }

    fn modify(
        &self,
        user_id: &str,
        apply: &mut dyn FnMut(&mut Vec<FavoriteEntry>) -> Result<()>,
    ) -> Result<()> {
        let path = self.favorites_path(user_id)?;
        let _lock = self.lock()?;
        let mut entries = read_rows(&path)?;
        apply(&mut entries)?;
        write_rows(&path, FAVORITE_COLUMNS, &entries)
    }
}

impl ReviewRepository for CsvRepository {
    fn load(&self, user_id: &str) -> Result<Vec<ReviewEntry>> {
        read_rows(&self.reviews_path(user_id)?)
    }

    fn append(&self, user_id: &str, entry: &ReviewEntry) -> Result<()> {
        let path = self.reviews_path(user_id)?;
        let _lock = self.lock()?;
        let mut entries: Vec<ReviewEntry> = read_rows(&path)?;
        entries.push(entry.clone());
        write_rows(&path, REVIEW_COLUMNS, &entries)
    }
}
