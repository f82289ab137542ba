//! Local key-value storage: persisted settings and the opaque auth token.
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use tubepilot_logging::pilot_warn;

use crate::persist::{AtomicFileWriter, StoreError};

/// Key holding the serialized settings.
pub const SETTINGS_KEY: &str = "app_settings";
/// Key holding the bearer token.
pub const AUTH_TOKEN_KEY: &str = "auth_token";

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    /// Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// One file per key inside a directory; writes are atomic renames.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    writer: AtomicFileWriter,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            writer: AtomicFileWriter::new(dir.clone()),
            dir,
        }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        Ok(self.dir.join(file_name(key)?))
    }
}

fn file_name(key: &str) -> Result<String, StoreError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(format!("{key}.store"))
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)?) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StoreError::Io(err)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.writer.write(&file_name(key)?, value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)?) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StoreError::Io(err)),
        }
    }
}

/// In-process store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

/// Typed access to the stored bearer token.
#[derive(Clone)]
pub struct CredentialStore {
    storage: Arc<dyn KeyValueStore>,
}

impl CredentialStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Missing or unreadable tokens both read as absent; a read failure is logged.
    pub fn token(&self) -> Option<String> {
        match self.storage.get(AUTH_TOKEN_KEY) {
            Ok(token) => token
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
            Err(err) => {
                pilot_warn!("Failed to read stored credential: {}", err);
                None
            }
        }
    }

    pub fn store(&self, token: &str) -> Result<(), StoreError> {
        self.storage.set(AUTH_TOKEN_KEY, token.trim())
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.storage.remove(AUTH_TOKEN_KEY)
    }
}
