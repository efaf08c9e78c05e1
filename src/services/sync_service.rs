// src/services/sync_service.rs
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing;

use crate::{
    errors::{AdmissionsError as AppError, AdmissionsResult},
    models::{admission::AdmissionRecord, sync::SyncResponse},
    services::backup_service::BackupStore,
    utils::json_extract,
};

#[derive(Debug, Clone, Default)]
pub struct SyncConfig {
    pub endpoint_url: String,
    pub request_timeout: Option<Duration>,
}

impl SyncConfig {
    pub fn new(endpoint_url: impl Into<String>) -> Self {
        Self {
            endpoint_url: endpoint_url.into(),
            request_timeout: None,
        }
    }

    pub fn list_url(&self) -> String {
        format!("{}?action=list", self.endpoint_url)
    }
}

#[async_trait]
pub trait SyncOperations: Send + Sync {
    /// Never fails: transport and decoding problems come back as `SyncResponse::Failure`.
    async fn submit(&self, record: &AdmissionRecord) -> SyncResponse;

    /// Remote admissions, or the local backup when the remote list is unavailable.
    async fn list(&self) -> AdmissionsResult<Vec<AdmissionRecord>>;
}

/// Client for the spreadsheet-backed script endpoint.
pub struct SheetsSyncClient {
    config: SyncConfig,
    client: reqwest::Client,
    backup: Arc<dyn BackupStore>,
}

impl SheetsSyncClient {
    pub fn new(config: SyncConfig, backup: Arc<dyn BackupStore>) -> AdmissionsResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| AppError::ConfigurationError(e.to_string()))?;

        Ok(Self { config, client, backup })
    }

    pub fn with_endpoint(endpoint_url: impl Into<String>, backup: Arc<dyn BackupStore>) -> AdmissionsResult<Self> {
        Self::new(SyncConfig::new(endpoint_url), backup)
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    fn ensure_endpoint(&self) -> AdmissionsResult<()> {
        if self.config.endpoint_url.trim().is_empty() {
            return Err(AppError::ConfigurationError(
                "SHEETS_ENDPOINT_URL is not set".to_string(),
            ));
        }
        Ok(())
    }

    async fn post_record(&self, record: &AdmissionRecord) -> AdmissionsResult<String> {
        self.ensure_endpoint()?;

        let response = self
            .client
            .post(&self.config.endpoint_url)
            .json(record)
            .send()
            .await?;

        tracing::debug!("Sheets endpoint answered {} for {}", response.status(), record.id);
        Ok(response.text().await?)
    }

    async fn fetch_remote_list(&self) -> AdmissionsResult<Vec<AdmissionRecord>> {
        self.ensure_endpoint()?;
        let text = self
            .client
            .get(self.config.list_url())
            .send()
            .await?
            .text()
            .await?;

        let envelope = json_extract::parse_tolerant(&text)
            .ok_or_else(|| AppError::malformed_response("Invalid response"))?;

        match SyncResponse::from_value(envelope, &text) {
            SyncResponse::Success { data: None | Some(Value::Null) } => Ok(Vec::new()),
            SyncResponse::Success { data: Some(data) } => Ok(serde_json::from_value(data)?),
            SyncResponse::Failure(failure) => Err(AppError::RemoteRejected(failure.message().to_string())),
        }
    }
}

#[async_trait]
impl SyncOperations for SheetsSyncClient {
    async fn submit(&self, record: &AdmissionRecord) -> SyncResponse {
        tracing::info!("Sending admission {} to sheets", record.id);

        match self.post_record(record).await {
            Ok(text) => SyncResponse::from_body(&text),
            Err(e) => {
                tracing::debug!("Sheets submission for {} failed: {}", record.id, e);
                SyncResponse::error(e.to_string())
            }
        }
    }

    async fn list(&self) -> AdmissionsResult<Vec<AdmissionRecord>> {
        match self.fetch_remote_list().await {
            Ok(records) => {
                tracing::info!("Fetched {} admissions from sheets", records.len());
                Ok(records)
            }
            Err(e) => {
                tracing::error!("Fetching admissions from sheets failed, using local backup: {}", e);
                Ok(self.backup.read_all().await?)
            }
        }
    }
}

// Offline client for development and testing
pub struct OfflineSyncClient {
    backup: Arc<dyn BackupStore>,
}

impl OfflineSyncClient {
    pub fn new(backup: Arc<dyn BackupStore>) -> Self {
        Self { backup }
    }
}

#[async_trait]
impl SyncOperations for OfflineSyncClient {
    async fn submit(&self, record: &AdmissionRecord) -> SyncResponse {
        tracing::info!("[OFFLINE] Would send admission {} to sheets", record.id);
        SyncResponse::error("Sheets endpoint not configured")
    }

    async fn list(&self) -> AdmissionsResult<Vec<AdmissionRecord>> {
        Ok(self.backup.read_all().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sync::SyncFailure;
    use crate::services::backup_service::MemoryBackupStore;

    fn record(id: &str) -> AdmissionRecord {
        AdmissionRecord {
            id: id.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_list_url_appends_action() {
        let config = SyncConfig::new("https://script.example.com/macros/s/abc/exec");
        assert_eq!(config.list_url(), "https://script.example.com/macros/s/abc/exec?action=list");
    }

    #[tokio::test]
    async fn test_missing_endpoint_is_a_failure_result() {
        let backup = Arc::new(MemoryBackupStore::new());
        let client = SheetsSyncClient::with_endpoint("", backup).unwrap();

        match client.submit(&record("AIHS-1")).await {
            SyncResponse::Failure(SyncFailure::Error(msg)) => assert!(msg.contains("SHEETS_ENDPOINT_URL")),
            other => panic!("expected error failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_list_without_endpoint_falls_back_to_backup() {
        let backup = Arc::new(MemoryBackupStore::new());
        backup.append(&record("AIHS-1")).await.unwrap();
        let client = SheetsSyncClient::with_endpoint("", backup.clone()).unwrap();

        let records = client.list().await.unwrap();
        assert_eq!(records, vec![record("AIHS-1")]);
    }

    #[tokio::test]
    async fn test_offline_client_reports_failure() {
        let backup = Arc::new(MemoryBackupStore::new());
        let client = OfflineSyncClient::new(backup);
        assert!(!client.submit(&record("AIHS-1")).await.is_success());
        assert!(client.list().await.unwrap().is_empty());
    }
}
