// src/state.rs
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::{
    errors::{AdmissionsError as AppError, AdmissionsResult},
    services::{
        backup_service::{BackupStore, DEFAULT_STORAGE_KEY, FileBackupStore},
        export_service::ExportService,
        messaging_service::{
            BatchDispatcher, BatchPolicy, DEFAULT_BATCH_DELAY, DEFAULT_BATCH_SIZE, LinkOpener, SmsDispatcher,
        },
        submission_service::SubmissionService,
        sync_service::{OfflineSyncClient, SheetsSyncClient, SyncConfig, SyncOperations},
    },
    utils::id_generator::{DEFAULT_ID_PREFIX, IdGenerator},
};

pub const DEFAULT_STORAGE_PATH: &str = "mkuzo-storage.json";

pub struct AppState {
    pub backup_store: Arc<dyn BackupStore>,
    pub sync_client: Arc<dyn SyncOperations>,
    pub submission_service: Arc<SubmissionService>,
    pub whatsapp: BatchDispatcher,
    pub sms: SmsDispatcher,
    pub export_service: ExportService,
    pub config: AppConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub endpoint_url: String,
    pub storage_path: PathBuf,
    pub storage_key: String,
    pub whatsapp_batch_size: usize,
    pub whatsapp_delay_ms: u64,
    pub request_timeout_secs: Option<u64>,
    pub id_prefix: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint_url: String::new(),
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            whatsapp_batch_size: DEFAULT_BATCH_SIZE,
            whatsapp_delay_ms: DEFAULT_BATCH_DELAY.as_millis() as u64,
            request_timeout_secs: None,
            id_prefix: DEFAULT_ID_PREFIX.to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> AdmissionsResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> AdmissionsResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let config = Self {
            endpoint_url: get("SHEETS_ENDPOINT_URL").unwrap_or_default(),
            storage_path: get("MKUZO_STORAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_path),
            storage_key: get("MKUZO_STORAGE_KEY").unwrap_or(defaults.storage_key),
            whatsapp_batch_size: parse_var("MKUZO_BATCH_SIZE", get("MKUZO_BATCH_SIZE"))?
                .unwrap_or(defaults.whatsapp_batch_size),
            whatsapp_delay_ms: parse_var("MKUZO_BATCH_DELAY_MS", get("MKUZO_BATCH_DELAY_MS"))?
                .unwrap_or(defaults.whatsapp_delay_ms),
            request_timeout_secs: parse_var("MKUZO_REQUEST_TIMEOUT_SECS", get("MKUZO_REQUEST_TIMEOUT_SECS"))?,
            id_prefix: get("MKUZO_ID_PREFIX").unwrap_or(defaults.id_prefix),
        };

        config.validate()?;
        if config.endpoint_url.is_empty() {
            tracing::warn!("SHEETS_ENDPOINT_URL not set, submissions will be stored locally only");
        }
        Ok(config)
    }

    pub fn validate(&self) -> AdmissionsResult<()> {
        if self.whatsapp_batch_size == 0 {
            return Err(AppError::invalid_configuration("MKUZO_BATCH_SIZE must be greater than zero"));
        }
        if self.storage_key.is_empty() {
            return Err(AppError::invalid_configuration("MKUZO_STORAGE_KEY must not be empty"));
        }
        Ok(())
    }

    pub fn batch_policy(&self) -> BatchPolicy {
        BatchPolicy::new(self.whatsapp_batch_size, Duration::from_millis(self.whatsapp_delay_ms))
    }

    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            endpoint_url: self.endpoint_url.clone(),
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
        }
    }
}

fn parse_var<T: FromStr>(key: &str, raw: Option<String>) -> AdmissionsResult<Option<T>> {
    raw.map(|value| {
        value
            .parse::<T>()
            .map_err(|_| AppError::invalid_configuration(format!("{} has invalid value '{}'", key, value)))
    })
    .transpose()
}

impl AppState {
    pub fn new(config: AppConfig, opener: Arc<dyn LinkOpener>) -> AdmissionsResult<Self> {
        config.validate()?;

        let backup_store: Arc<dyn BackupStore> =
            Arc::new(FileBackupStore::new(&config.storage_path, &config.storage_key));

        let sync_client: Arc<dyn SyncOperations> = if config.endpoint_url.is_empty() {
            tracing::warn!("SHEETS_ENDPOINT_URL not set, using offline sync client");
            Arc::new(OfflineSyncClient::new(backup_store.clone()))
        } else {
            Arc::new(SheetsSyncClient::new(config.sync_config(), backup_store.clone())?)
        };

        let submission_service = Arc::new(SubmissionService::new(
            backup_store.clone(),
            sync_client.clone(),
            IdGenerator::new(&config.id_prefix),
        ));

        Ok(Self {
            whatsapp: BatchDispatcher::with_tokio(opener.clone(), config.batch_policy()),
            sms: SmsDispatcher::new(opener),
            export_service: ExportService::new(),
            backup_store,
            sync_client,
            submission_service,
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::messaging_service::LoggingLinkOpener;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.batch_policy(), BatchPolicy::default());
        assert_eq!(config.storage_key, "admissions");
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("SHEETS_ENDPOINT_URL", " https://script.example.com/exec "),
            ("MKUZO_BATCH_SIZE", "3"),
            ("MKUZO_BATCH_DELAY_MS", "1500"),
            ("MKUZO_REQUEST_TIMEOUT_SECS", "20"),
            ("MKUZO_ID_PREFIX", "MKZ"),
        ]))
        .unwrap();

        assert_eq!(config.endpoint_url, "https://script.example.com/exec");
        assert_eq!(config.batch_policy(), BatchPolicy::new(3, Duration::from_millis(1500)));
        assert_eq!(config.sync_config().request_timeout, Some(Duration::from_secs(20)));
        assert_eq!(config.id_prefix, "MKZ");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = AppConfig::from_lookup(lookup(&[("MKUZO_BATCH_SIZE", "six")])).unwrap_err();
        assert!(matches!(err, AppError::InvalidConfiguration(_)));

        let err = AppConfig::from_lookup(lookup(&[("MKUZO_BATCH_SIZE", "0")])).unwrap_err();
        assert!(matches!(err, AppError::InvalidConfiguration(_)));
    }

    #[tokio::test]
    async fn test_state_wires_offline_client_without_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            storage_path: dir.path().join("storage.json"),
            ..AppConfig::default()
        };

        let state = AppState::new(config, Arc::new(LoggingLinkOpener)).unwrap();
        let outcome = state
            .submission_service
            .submit(&Default::default())
            .await
            .unwrap();

        assert!(outcome.reference().ends_with("(local only)"));
        assert_eq!(state.sync_client.list().await.unwrap(), vec![outcome.record]);
    }
}
