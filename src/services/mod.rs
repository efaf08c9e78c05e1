// src/services/mod.rs
pub mod backup_service;
pub mod export_service;
pub mod messaging_service;
pub mod submission_service;
pub mod sync_service;
