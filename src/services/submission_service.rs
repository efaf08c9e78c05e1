// src/services/submission_service.rs
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing;

use crate::{
    errors::AdmissionsResult,
    models::{
        admission::{AdmissionForm, AdmissionRecord},
        sync::SyncResponse,
    },
    services::{backup_service::BackupStore, sync_service::SyncOperations},
    utils::id_generator::IdGenerator,
};

#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionOutcome {
    pub record: AdmissionRecord,
    pub response: SyncResponse,
}

impl SubmissionOutcome {
    pub fn synced(&self) -> bool {
        self.response.is_success()
    }

    /// Reference shown to the submitter; flagged when only the local backup holds it.
    pub fn reference(&self) -> String {
        if self.synced() {
            self.record.id.clone()
        } else {
            format!("{} (local only)", self.record.id)
        }
    }
}

/// Form submission: assemble, back up locally, then forward to sheets.
pub struct SubmissionService {
    backup: Arc<dyn BackupStore>,
    sync: Arc<dyn SyncOperations>,
    ids: IdGenerator,
}

impl SubmissionService {
    pub fn new(backup: Arc<dyn BackupStore>, sync: Arc<dyn SyncOperations>, ids: IdGenerator) -> Self {
        Self { backup, sync, ids }
    }

    pub async fn submit(&self, form: &AdmissionForm) -> AdmissionsResult<SubmissionOutcome> {
        self.submit_at(form, Utc::now()).await
    }

    pub async fn submit_at(&self, form: &AdmissionForm, now: DateTime<Utc>) -> AdmissionsResult<SubmissionOutcome> {
        let id = self.ids.generate_with_timestamp(now);
        let record = AdmissionRecord::from_form(form, id, now);

        // a local backup failure aborts the submission before anything is sent
        self.backup.append(&record).await?;

        let response = self.sync.submit(&record).await;
        if response.is_success() {
            tracing::info!("Admission {} saved to sheets", record.id);
        } else {
            tracing::warn!("Failed to save admission {} to sheets: {:?}", record.id, response);
        }

        Ok(SubmissionOutcome { record, response })
    }
}
