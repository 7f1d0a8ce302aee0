//! Backups of files that could not be loaded
//!
//! A file whose `config_version` is invalid or newer than supported is copied
//! aside before the engine falls back to defaults, so the next write does not
//! destroy the user's settings. Copies are named
//! `<file>.backup.<YYYYmmdd.HHMMSS>`, with `.2`, `.3`, ... appended when that
//! name is already taken.

use crate::context::Console;
use crate::{ConfigError, ConfigResult};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Information about a backup copy
#[derive(Debug, Clone)]
pub struct BackupInfo {
    /// Full path to the backup file
    pub path: PathBuf,
    /// Filename of the backup
    pub filename: String,
    /// Last modification time of the backup
    pub modified: SystemTime,
    /// Size of the backup in bytes
    pub size_bytes: u64,
}

/// Returns the first unused backup name for `path`
pub fn backup_path(path: &Path) -> PathBuf {
    let timestamp = chrono::Local::now().format("%Y%m%d.%H%M%S");
    let base = format!("{}.backup.{}", path.display(), timestamp);

    let mut candidate = PathBuf::from(&base);
    let mut index = 2;
    while candidate.exists() {
        candidate = PathBuf::from(format!("{}.{}", base, index));
        index += 1;
    }
    candidate
}

/// Copies `path` to a fresh backup name and reports it on the console
pub fn backup_file(path: &Path, console: &dyn Console) -> ConfigResult<PathBuf> {
    let target = backup_path(path);

    match fs::copy(path, &target) {
        Ok(_) => {
            console.print_warning(&format!(
                "File {} has been backed up as {}",
                path.display(),
                target.display()
            ));
            log::info!("Backed up {} as {}", path.display(), target.display());
            Ok(target)
        }
        Err(e) => {
            console.print_error(&format!("Error: unable to backup file {}", path.display()));
            Err(ConfigError::BackupError {
                path: path.to_path_buf(),
                source: e,
            })
        }
    }
}

/// Lists the backups of `path`, newest first
pub fn list_backups(path: &Path) -> ConfigResult<Vec<BackupInfo>> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let prefix = match path.file_name().and_then(|s| s.to_str()) {
        Some(name) => format!("{}.backup.", name),
        None => return Ok(Vec::new()),
    };
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut backups = Vec::new();

    for entry in fs::read_dir(dir).map_err(ConfigError::IoError)? {
        let entry = entry.map_err(ConfigError::IoError)?;
        let entry_path = entry.path();

        if let Some(filename) = entry_path.file_name().and_then(|s| s.to_str()) {
            if filename.starts_with(&prefix) && entry_path.is_file() {
                let metadata = fs::metadata(&entry_path).map_err(ConfigError::IoError)?;
                backups.push(BackupInfo {
                    filename: filename.to_string(),
                    modified: metadata.modified().map_err(ConfigError::IoError)?,
                    size_bytes: metadata.len(),
                    path: entry_path,
                });
            }
        }
    }

    // Names sort chronologically; the index suffix breaks ties within a second
    backups.sort_by(|a, b| {
        b.modified
            .cmp(&a.modified)
            .then_with(|| backup_rank(&b.filename).cmp(&backup_rank(&a.filename)))
    });

    Ok(backups)
}

fn backup_rank(filename: &str) -> (String, u32) {
    // "<file>.backup.YYYYmmdd.HHMMSS[.N]"
    let mut parts = filename.rsplitn(2, ".backup.");
    let stamp = parts.next().unwrap_or_default();
    let mut fields = stamp.split('.');
    let date = fields.next().unwrap_or_default();
    let time = fields.next().unwrap_or_default();
    let index = fields.next().and_then(|n| n.parse().ok()).unwrap_or(1);
    (format!("{}{}", date, time), index)
}
