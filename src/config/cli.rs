use crate::core::KeyValueStore;
use crate::utils::error::{GameError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// File-backed key-value store: one file per key under `base_path`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }

    fn key_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(GameError::persistence(format!("invalid storage key '{}'", key)));
        }
        Ok(Path::new(&self.base_path).join(key))
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let full_path = self.key_path(key)?;
        match fs::read_to_string(full_path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(GameError::persistence(e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let full_path = self.key_path(key)?;

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).map_err(GameError::persistence)?;
        }

        fs::write(full_path, value).map_err(GameError::persistence)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let full_path = self.key_path(key)?;
        match fs::remove_file(full_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(GameError::persistence(e)),
        }
    }
}
