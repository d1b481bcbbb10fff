use super::storage::SessionStorage;
use crate::error::SessionError;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// One file per key under a storage directory.
pub struct FilesystemStorage {
    dir: PathBuf,
}

impl FilesystemStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `~/.cache/aeroadmin`, or `./.aeroadmin` when no home directory is known.
    pub fn default_dir() -> PathBuf {
        match dirs::home_dir() {
            Some(home) => home.join(".cache").join("aeroadmin"),
            None => PathBuf::from(".aeroadmin"),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl Default for FilesystemStorage {
    fn default() -> Self {
        Self::new(Self::default_dir())
    }
}

fn storage_error(key: &str, source: std::io::Error) -> SessionError {
    SessionError::Storage {
        key: key.to_string(),
        source,
    }
}

impl SessionStorage for FilesystemStorage {
    fn read(&self, key: &str) -> Result<Option<String>, SessionError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(storage_error(key, e)),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), SessionError> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(|e| storage_error(key, e))?;
        }
        fs::write(self.path_for(key), value).map_err(|e| storage_error(key, e))
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error(key, e)),
        }
    }
}
