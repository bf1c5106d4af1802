//! Key-value store adapter.
//!
//! Implements [`StoragePort`] on top of a single JSON file shared by all
//! modules, or purely in memory for tests and dry runs.
//!
//! - Namespace isolation: keys are stored as `namespace::key`.
//! - Atomic writes: every mutation rewrites the file to a sibling temp file
//!   and renames it over the original, so a crash leaves either the old or
//!   the new contents.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::app::ports::{StorageError, StoragePort};

/// File-backed (or in-memory) namespaced blob store.
#[derive(Debug, Default)]
pub struct KvStore {
    path: Option<PathBuf>,
    entries: BTreeMap<String, Vec<u8>>,
}

impl KvStore {
    /// Store that lives only as long as the value.
    pub fn in_memory() -> Self {
        info!("KvStore: in-memory backend");
        Self::default()
    }

    /// Open the store at `path`, starting empty if the file does not exist.
    ///
    /// Returns [`StorageError::Corrupted`] if the file exists but is not a
    /// store written by this adapter.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = match fs::read(&path) {
            Ok(bytes) if bytes.is_empty() => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|_| StorageError::Corrupted)?,
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(StorageError::IoError(e.to_string())),
        };
        info!(
            "KvStore: opened {} ({} keys)",
            path.display(),
            entries.len()
        );
        Ok(Self {
            path: Some(path),
            entries,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn composite_key(namespace: &str, key: &str) -> String {
        format!("{}::{}", namespace, key)
    }

    fn flush(&self) -> Result<(), StorageError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let io = |e: std::io::Error| StorageError::IoError(e.to_string());

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(io)?;
        }
        let json = serde_json::to_vec(&self.entries)
            .map_err(|e| StorageError::IoError(e.to_string()))?;
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, json).map_err(io)?;
        fs::rename(&tmp, path).map_err(io)?;
        debug!("KvStore: flushed {} keys to {}", self.entries.len(), path.display());
        Ok(())
    }
}

impl StoragePort for KvStore {
    fn read(&self, namespace: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        self.entries
            .get(&Self::composite_key(namespace, key))
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        self.entries.insert(Self::composite_key(namespace, key), data.to_vec());
        self.flush()
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        if self
            .entries
            .remove(&Self::composite_key(namespace, key))
            .is_some()
        {
            self.flush()?;
        }
        Ok(())
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.entries.contains_key(&Self::composite_key(namespace, key))
    }
}
