//! JSON file storage backend.
//!
//! The whole store is one JSON object (`{"token": "...", "user": "..."}`).
//! Every mutation rewrites the file through a temp file and a rename, so a
//! reader never observes a half-written record.

use crate::{KeyValueStorage, StorageError, StorageResult};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tracing::{debug, warn};

type Entries = BTreeMap<String, String>;

/// Key-value storage persisted to a single JSON file.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> StorageResult<Entries> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Entries::new()),
            Err(e) => return Err(StorageError::Io(e)),
        };

        if content.trim().is_empty() {
            return Ok(Entries::new());
        }

        match serde_json::from_str::<Entries>(&content) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                // The next write replaces the unreadable file.
                warn!(path = %self.path.display(), error = %e, "Storage file is corrupt, treating as empty");
                Ok(Entries::new())
            }
        }
    }

    fn write_entries(&self, entries: &Entries) -> StorageResult<()> {
        if entries.is_empty() {
            return match fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(StorageError::Io(e)),
            };
        }

        let content = serde_json::to_string_pretty(entries)?;
        atomic_write(&self.path, &content)?;
        debug!(path = %self.path.display(), keys = entries.len(), "Storage file written");
        Ok(())
    }

    fn update<F, T>(&self, mutate: F) -> StorageResult<T>
    where
        F: FnOnce(&mut Entries) -> T,
    {
        let _guard = self.lock.lock();
        let mut entries = self.read_entries()?;
        let result = mutate(&mut entries);
        self.write_entries(&entries)?;
        Ok(result)
    }
}

impl KeyValueStorage for FileStorage {
    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let _guard = self.lock.lock();
        Ok(self.read_entries()?.remove(key))
    }

    fn delete(&self, key: &str) -> StorageResult<bool> {
        self.update(|entries| entries.remove(key).is_some())
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> StorageResult<()> {
        self.update(|stored| {
            for (key, value) in entries {
                stored.insert(key.to_string(), value.to_string());
            }
        })
    }

    fn delete_many(&self, keys: &[&str]) -> StorageResult<()> {
        self.update(|stored| {
            for key in keys {
                stored.remove(*key);
            }
        })
    }
}

fn atomic_write(path: &Path, content: &str) -> StorageResult<()> {
    let dir = path
        .parent()
        .ok_or_else(|| StorageError::Backend(format!("No parent directory for {}", path.display())))?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| StorageError::Backend(format!("Invalid file name: {}", path.display())))?;

    fs::create_dir_all(dir)?;

    let tmp_path = dir.join(format!(
        ".{}.labinv.tmp.{}",
        file_name,
        std::time::SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ));

    let write_result = (|| -> io::Result<()> {
        let mut options = fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&tmp_path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp_path, path)?;
        Ok(())
    })();

    if let Err(e) = write_result {
        let _ = fs::remove_file(&tmp_path);
        return Err(StorageError::Io(e));
    }

    Ok(())
}
