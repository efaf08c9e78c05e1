// src/services/backup_service.rs
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::{Mutex, RwLock};
use tracing;

use crate::errors::AdmissionsError as AppError;
use crate::models::admission::AdmissionRecord;

pub const DEFAULT_STORAGE_KEY: &str = "admissions";

#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Stored data is corrupted: {0}")]
    Corrupted(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<BackupError> for AppError {
    fn from(error: BackupError) -> Self {
        match error {
            BackupError::Unavailable(msg) => AppError::StorageUnavailable(msg),
            BackupError::Corrupted(msg) => AppError::StorageCorrupted(msg),
            BackupError::Serialization(msg) => AppError::JsonSerialization(msg),
        }
    }
}

/// Append-only local copy of every submitted admission.
#[async_trait]
pub trait BackupStore: Send + Sync {
    async fn append(&self, record: &AdmissionRecord) -> Result<(), BackupError>;
    async fn read_all(&self) -> Result<Vec<AdmissionRecord>, BackupError>;
}

/// Key-value storage file: a JSON object whose values are JSON-encoded strings,
/// the same layout browser local storage uses. The record list lives under one key.
pub struct FileBackupStore {
    path: PathBuf,
    key: String,
    // serialises read-modify-write cycles between concurrent appends
    write_lock: Mutex<()>,
}

impl FileBackupStore {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    async fn read_storage(&self) -> Result<Map<String, Value>, BackupError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(BackupError::Unavailable(e.to_string())),
        };

        if contents.trim().is_empty() {
            return Ok(Map::new());
        }

        serde_json::from_str(&contents).map_err(|e| BackupError::Corrupted(e.to_string()))
    }

    fn decode_records(&self, storage: &Map<String, Value>) -> Result<Vec<AdmissionRecord>, BackupError> {
        match storage.get(&self.key) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::String(encoded)) => serde_json::from_str(encoded)
                .map_err(|e| BackupError::Corrupted(format!("{}: {}", self.key, e))),
            Some(other) => Err(BackupError::Corrupted(format!(
                "{}: expected an encoded string, found {}",
                self.key, other
            ))),
        }
    }

    async fn write_storage(&self, storage: &Map<String, Value>) -> Result<(), BackupError> {
        let json = serde_json::to_string_pretty(storage)
            .map_err(|e| BackupError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| BackupError::Unavailable(e.to_string()))?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| BackupError::Unavailable(e.to_string()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| BackupError::Unavailable(e.to_string()))
    }
}

#[async_trait]
impl BackupStore for FileBackupStore {
    async fn append(&self, record: &AdmissionRecord) -> Result<(), BackupError> {
        let _guard = self.write_lock.lock().await;

        let mut storage = self.read_storage().await?;
        let mut records = self.decode_records(&storage)?;
        records.push(record.clone());

        let encoded = serde_json::to_string(&records)
            .map_err(|e| BackupError::Serialization(e.to_string()))?;
        storage.insert(self.key.clone(), Value::String(encoded));
        self.write_storage(&storage).await?;

        tracing::debug!(
            "Backed up admission {} locally ({} stored)",
            record.id,
            records.len()
        );
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<AdmissionRecord>, BackupError> {
        let storage = self.read_storage().await?;
        self.decode_records(&storage)
    }
}

// Memory store for tests and throwaway sessions
pub struct MemoryBackupStore {
    store: RwLock<HashMap<String, String>>,
    key: String,
}

impl Default for MemoryBackupStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackupStore {
    pub fn new() -> Self {
        Self::with_key(DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
            key: key.into(),
        }
    }

    fn decode(&self, encoded: Option<&String>) -> Result<Vec<AdmissionRecord>, BackupError> {
        match encoded {
            Some(json) => serde_json::from_str(json).map_err(|e| BackupError::Corrupted(e.to_string())),
            None => Ok(Vec::new()),
        }
    }
}

#[async_trait]
impl BackupStore for MemoryBackupStore {
    async fn append(&self, record: &AdmissionRecord) -> Result<(), BackupError> {
        let mut store = self.store.write().await;
        let mut records = self.decode(store.get(&self.key))?;
        records.push(record.clone());

        let encoded = serde_json::to_string(&records)
            .map_err(|e| BackupError::Serialization(e.to_string()))?;
        store.insert(self.key.clone(), encoded);
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<AdmissionRecord>, BackupError> {
        let store = self.store.read().await;
        self.decode(store.get(&self.key))
    }
}
