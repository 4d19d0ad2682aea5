//! The external services used by the submission flow.

use async_trait::async_trait;
use thiserror::Error;

use crate::photo::ProcessedPhoto;
use crate::project::ProjectId;
use crate::repair::{PhotoUrl, RepairId, RepairPatch, RepairRecord};

/// Authorizes a single upload to the photo storage.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
pub struct UploadTicket {
    pub endpoint: String,
    pub credentials: String,
    pub public_id: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
pub struct UploadedPhoto {
    pub url: PhotoUrl,
    pub public_id: String,
    pub original_filename: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("Unable to sign photo upload. file_name: '{file_name}', reason: {reason}")]
    Signing { file_name: String, reason: String },

    #[error("Unable to transfer photo. file_name: '{file_name}', reason: {reason}")]
    Transfer { file_name: String, reason: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("Repair store rejected the change. reason: {0}")]
    Rejected(String),

    #[error("Repair not found. id: {0}")]
    NotFound(RepairId),
}

#[async_trait]
pub trait PhotoStorage: Send + Sync {
    async fn sign_upload(&self, file_name: &str, folder: &str) -> Result<UploadTicket, UploadError>;

    async fn transfer(&self, ticket: &UploadTicket, photo: &ProcessedPhoto) -> Result<UploadedPhoto, UploadError>;
}

#[async_trait]
pub trait RepairPersistence: Send + Sync {
    async fn create_repair(&self, record: &RepairRecord) -> Result<RepairId, PersistenceError>;

    async fn update_repair(&self, id: &RepairId, patch: &RepairPatch) -> Result<(), PersistenceError>;

    async fn list_repairs(&self, project_id: &ProjectId) -> Result<Vec<RepairRecord>, PersistenceError>;
}
