pub mod errors;
pub mod logging;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

// Re-export commonly used types
pub use errors::{AdmissionsError, AdmissionsResult};
pub use models::{AdmissionForm, AdmissionRecord, DeepLink, SyncFailure, SyncResponse};
pub use state::{AppConfig, AppState};
