//! File-backed store.
//!
//! All keys live in one pretty-printed JSON object. The file is rewritten on every
//! `set_string`, through a temporary sibling file and a rename so a crash mid-write
//! leaves the previous contents intact.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::{DurableStore, StoreError};

/// Store persisting every key to a single JSON file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: RwLock<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Open the store at `path`.
    ///
    /// If the file does not exist, an empty store is returned and the file is created on
    /// the first write.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let values = match tokio::fs::read_to_string(&path).await {
            Ok(json) => serde_json::from_str(&json).map_err(|source| {
                StoreError::DeserializationFailed {
                    path: path.clone(),
                    source,
                }
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StoreError::FileIo { path, source }),
        };
        debug!(path = %path.display(), keys = values.len(), "Opened JSON file store");

        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    async fn write_file(&self, values: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(values)
            .map_err(|source| StoreError::SerializationFailed { source })?;
        let io_err = |source| StoreError::FileIo {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        tokio::fs::write(&tmp, json).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(io_err)
    }
}

#[async_trait]
impl DurableStore for JsonFileStore {
    async fn get_string(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set_string(&self, key: &str, value: &str) -> Result<(), StoreError> {
        // Hold the write lock across the file write so concurrent writers cannot
        // reorder their snapshots on disk.
        let mut values = self.values.write().await;
        let previous = values.insert(key.to_string(), value.to_string());
        if let Err(e) = self.write_file(&values).await {
            match previous {
                Some(previous) => values.insert(key.to_string(), previous),
                None => values.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }
}
