//! Backup service - snapshots of the data root
//!
//! A backup is a ZIP archive holding the user file, settings, the DuckDB
//! store (when present) and every per-user file under `data/`. Logs are
//! not included.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use serde::Serialize;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::adapters::csv::{CsvRepository, DATA_DIR, USERS_FILE};
use crate::adapters::duckdb::DB_FILE;
use crate::config::SETTINGS_FILE;
use crate::domain::BackupMetadata;

pub const BACKUPS_DIR: &str = "backups";
const BACKUP_PREFIX: &str = "mimo-";

/// Top-level files captured in a backup, when they exist
const ROOT_FILES: &[&str] = &[USERS_FILE, SETTINGS_FILE, DB_FILE];

pub struct BackupService {
    root: PathBuf,
}

impl BackupService {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    fn backups_dir(&self) -> PathBuf {
        self.root.join(BACKUPS_DIR)
    }

    /// Archive-relative paths of every file to back up, with separators
    /// normalised to '/'
    fn collect_files(&self) -> Result<Vec<String>> {
        let mut files: Vec<String> = ROOT_FILES
            .iter()
            .filter(|name| self.root.join(name).is_file())
            .map(|name| name.to_string())
            .collect();

        let data_dir = self.root.join(DATA_DIR);
        if data_dir.is_dir() {
            collect_dir(&data_dir, DATA_DIR, &mut files)?;
        }
        Ok(files)
    }

    fn write_archive(&self, name: &str) -> Result<BackupMetadata> {
        let backups_dir = self.backups_dir();
        fs::create_dir_all(&backups_dir)?;

        let files = self.collect_files()?;
        if files.is_empty() {
            bail!("Nothing to back up in {}", self.root.display());
        }

        let backup_path = backups_dir.join(name);
        let file = File::create(&backup_path).context("Failed to create backup file")?;
        let mut zip = ZipWriter::new(file);
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        for relative in &files {
            zip.start_file(relative.as_str(), options)?;
            let bytes = fs::read(self.root.join(relative))
                .with_context(|| format!("Failed to read {}", relative))?;
            zip.write_all(&bytes)?;
        }
        zip.finish()?;

        let mut metadata =
            BackupMetadata::new(name, Utc::now(), fs::metadata(&backup_path)?.len());
        metadata.file_count = files.len();
        Ok(metadata)
    }

    /// Create a backup, keeping at most `max_backups` archives when given
    pub fn create(&self, max_backups: Option<usize>) -> Result<BackupMetadata> {
        let metadata = self.write_archive(&backup_name(""))?;
        if let Some(max) = max_backups {
            self.apply_retention(max)?;
        }
        Ok(metadata)
    }

    /// Backups, newest first
    pub fn list(&self) -> Result<Vec<BackupMetadata>> {
        let backups_dir = self.backups_dir();
        if !backups_dir.exists() {
            return Ok(Vec::new());
        }

        let mut backups = Vec::new();
        for entry in fs::read_dir(&backups_dir)? {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !name.starts_with(BACKUP_PREFIX) || !name.ends_with(".zip") {
                continue;
            }

            let file_count = File::open(&path)
                .ok()
                .and_then(|f| ZipArchive::new(f).ok())
                .map(|archive| archive.len())
                .unwrap_or(0);

            let mut metadata =
                BackupMetadata::new(name, parse_backup_time(name), fs::metadata(&path)?.len());
            metadata.file_count = file_count;
            backups.push(metadata);
        }

        backups.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.name.cmp(&a.name)));
        Ok(backups)
    }

    /// Restore a backup over the data root
    ///
    /// Every entry is checked and extracted into a staging directory before
    /// the live data is touched. The swap itself runs under the `.mimo.lock`
    /// held by CSV writes, after the current state is archived as a
    /// `mimo-pre-restore-*` backup. Data files missing from the archive are
    /// removed so the root matches the snapshot exactly.
    pub fn restore(&self, name: &str) -> Result<BackupMetadata> {
        if name.contains('/') || name.contains('\\') || !name.ends_with(".zip") {
            bail!("Invalid backup name: {}", name);
        }
        let backup_path = self.backups_dir().join(name);
        if !backup_path.exists() {
            bail!("Backup not found: {}", name);
        }

        let mut archive = ZipArchive::new(File::open(&backup_path)?)
            .with_context(|| format!("Failed to read backup {}", name))?;
        let entries = checked_entries(&mut archive)?;

        let staging = tempfile::Builder::new()
            .prefix(".mimo-restore-")
            .tempdir_in(&self.root)
            .context("Failed to create restore staging directory")?;
        for (i, relative) in entries.iter().enumerate() {
            let mut entry = archive.by_index(i)?;
            let target = staging.path().join(relative);
            if entry.is_dir() {
                fs::create_dir_all(&target)?;
                continue;
            }
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut outfile = File::create(&target)?;
            io::copy(&mut entry, &mut outfile)
                .with_context(|| format!("Failed to extract {}", entry.name()))?;
        }

        let _lock = CsvRepository::new(&self.root).lock()?;

        if !self.collect_files()?.is_empty() {
            self.write_archive(&backup_name("pre-restore-"))?;
        }

        for file in ROOT_FILES {
            let path = self.root.join(file);
            if path.exists() {
                fs::remove_file(&path)?;
            }
        }
        let data_dir = self.root.join(DATA_DIR);
        if data_dir.exists() {
            fs::remove_dir_all(&data_dir)?;
        }

        for file in ROOT_FILES {
            let staged = staging.path().join(file);
            if staged.is_file() {
                fs::rename(&staged, self.root.join(file))?;
            }
        }
        let staged_data = staging.path().join(DATA_DIR);
        if staged_data.is_dir() {
            fs::rename(&staged_data, &data_dir)?;
        }

        let mut metadata = BackupMetadata::new(
            name,
            parse_backup_time(name),
            fs::metadata(&backup_path)?.len(),
        );
        metadata.file_count = entries.len();
        Ok(metadata)
    }

    /// Delete every backup
    pub fn clear(&self) -> Result<ClearResult> {
        let backups = self.list()?;
        for backup in &backups {
            fs::remove_file(self.backups_dir().join(&backup.name))?;
        }
        Ok(ClearResult {
            deleted: backups.len(),
        })
    }

    fn apply_retention(&self, max_backups: usize) -> Result<()> {
        let mut backups = self.list()?;
        while backups.len() > max_backups {
            if let Some(oldest) = backups.pop() {
                fs::remove_file(self.backups_dir().join(&oldest.name))?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct ClearResult {
    pub deleted: usize,
}

fn backup_name(tag: &str) -> String {
    let now = Utc::now();
    format!(
        "{}{}{}-{:06}.zip",
        BACKUP_PREFIX,
        tag,
        now.format("%Y-%m-%dT%H-%M-%S"),
        now.timestamp_subsec_micros()
    )
}

/// Creation time encoded in a backup filename, or now if it cannot be read
fn parse_backup_time(name: &str) -> chrono::DateTime<Utc> {
    name.strip_prefix(BACKUP_PREFIX)
        .map(|s| s.strip_prefix("pre-restore-").unwrap_or(s))
        .and_then(|s| s.strip_suffix(".zip"))
        .and_then(|ts| {
            chrono::NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H-%M-%S-%f")
                .or_else(|_| chrono::NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H-%M-%S"))
                .ok()
        })
        .map(|dt| dt.and_utc())
        .unwrap_or_else(Utc::now)
}

/// Archive-relative path of every entry. Anything that is not one of the
/// root files or under `data/` is rejected.
fn checked_entries(archive: &mut ZipArchive<File>) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let entry = archive.by_index(i)?;
        let Some(relative) = entry.enclosed_name() else {
            bail!("Backup contains an unsafe path: {}", entry.name());
        };
        let first = relative
            .components()
            .next()
            .and_then(|c| c.as_os_str().to_str())
            .unwrap_or_default();
        let expected = first == DATA_DIR
            || (relative.components().count() == 1 && ROOT_FILES.contains(&first));
        if !expected {
            bail!("Backup contains an unexpected path: {}", entry.name());
        }
        paths.push(relative);
    }
    Ok(paths)
}

fn collect_dir(dir: &Path, prefix: &str, files: &mut Vec<String>) -> Result<()> {
    let mut entries = fs::read_dir(dir)?.collect::<io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let name = entry.file_name().to_string_lossy().into_owned();
        let relative = format!("{}/{}", prefix, name);
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            collect_dir(&entry.path(), &relative, files)?;
        } else if file_type.is_file() {
            files.push(relative);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn seed(root: &Path) {
        fs::write(root.join(USERS_FILE), "user_id,pw_hash,email,nickname,joined\n").unwrap();
        fs::write(root.join(SETTINGS_FILE), "{}").unwrap();
        let user_dir = root.join(DATA_DIR).join("user_neo");
        fs::create_dir_all(&user_dir).unwrap();
        fs::write(user_dir.join("favorites.csv"), "title_id,title,poster\n1,A,x\n").unwrap();
    }

    #[test]
    fn test_create_and_list() {
        let dir = TempDir::new().unwrap();
        seed(dir.path());
        let service = BackupService::new(dir.path());

        let created = service.create(None).unwrap();
        assert!(created.name.starts_with("mimo-"));
        assert_eq!(created.file_count, 3);

        let listed = service.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, created.name);
        assert_eq!(listed[0].file_count, 3);
    }

    #[test]
    fn test_empty_root_has_nothing_to_back_up() {
        let dir = TempDir::new().unwrap();
        let service = BackupService::new(dir.path());
        assert!(service.create(None).is_err());
        assert!(service.list().unwrap().is_empty());
    }

    #[test]
    fn test_retention() {
        let dir = TempDir::new().unwrap();
        seed(dir.path());
        let service = BackupService::new(dir.path());

        for _ in 0..3 {
            service.create(Some(2)).unwrap();
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        assert_eq!(service.list().unwrap().len(), 2);
    }

    #[test]
    fn test_restore_replaces_data_and_keeps_pre_restore_copy() {
        let dir = TempDir::new().unwrap();
        seed(dir.path());
        let service = BackupService::new(dir.path());
        let backup = service.create(None).unwrap();

        // Change the data after the backup
        let favorites = dir.path().join("data/user_neo/favorites.csv");
        fs::write(&favorites, "title_id,title,poster\n").unwrap();
        let extra = dir.path().join("data/user_trinity");
        fs::create_dir_all(&extra).unwrap();
        fs::write(extra.join("reviews.csv"), "title,review,created_at\n").unwrap();

        service.restore(&backup.name).unwrap();

        assert_eq!(
            fs::read_to_string(&favorites).unwrap(),
            "title_id,title,poster\n1,A,x\n"
        );
        assert!(!extra.exists());
        assert!(service
            .list()
            .unwrap()
            .iter()
            .any(|b| b.name.starts_with("mimo-pre-restore-")));
    }

    #[test]
    fn test_restore_with_escaping_entry_leaves_data_untouched() {
        let dir = TempDir::new().unwrap();
        seed(dir.path());
        let service = BackupService::new(dir.path());

        let backups = dir.path().join(BACKUPS_DIR);
        fs::create_dir_all(&backups).unwrap();
        let name = "mimo-2025-01-01T00-00-00-000000.zip";
        let mut zip = ZipWriter::new(File::create(backups.join(name)).unwrap());
        let options = SimpleFileOptions::default();
        zip.start_file(USERS_FILE, options).unwrap();
        zip.write_all(b"user_id,pw_hash,email,nickname,joined\nmallory,h,m@x.io,M,2025-01-01\n").unwrap();
        zip.start_file("../x", options).unwrap();
        zip.write_all(b"outside").unwrap();
        zip.finish().unwrap();

        let users_before = fs::read_to_string(dir.path().join(USERS_FILE)).unwrap();
        let favorites = dir.path().join("data/user_neo/favorites.csv");

        assert!(service.restore(name).is_err());

        assert_eq!(
            fs::read_to_string(dir.path().join(USERS_FILE)).unwrap(),
            users_before
        );
        assert_eq!(
            fs::read_to_string(&favorites).unwrap(),
            "title_id,title,poster\n1,A,x\n"
        );
        assert!(!dir.path().parent().unwrap().join("x").exists());
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(".mimo-restore-"))
            .collect();
        assert!(leftovers.is_empty());
        assert_eq!(service.list().unwrap().len(), 1);
    }

    #[test]
    fn test_restore_rejects_unknown_or_unsafe_names() {
        let dir = TempDir::new().unwrap();
        let service = BackupService::new(dir.path());
        assert!(service.restore("mimo-missing.zip").is_err());
        assert!(service.restore("../escape.zip").is_err());
    }

    #[test]
    fn test_clear() {
        let dir = TempDir::new().unwrap();
        seed(dir.path());
        let service = BackupService::new(dir.path());
        service.create(None).unwrap();

        assert_eq!(service.clear().unwrap().deleted, 1);
        assert!(service.list().unwrap().is_empty());
    }
}
