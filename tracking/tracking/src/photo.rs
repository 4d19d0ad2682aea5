use futures::future::try_join_all;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::collaborators::{PhotoStorage, UploadError, UploadedPhoto};
use crate::phase::PhaseKind;

pub const MAX_PHASE_PHOTOS: usize = 3;

/// Survey and finish phases take up to 3 photos, progress phases exactly 1.
pub fn photo_limit(kind: PhaseKind) -> usize {
    match kind {
        PhaseKind::Survey | PhaseKind::Finish => MAX_PHASE_PHOTOS,
        PhaseKind::Progress => 1,
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PhotoCountError {
    #[error("At least one photo is required. phase: {0}")]
    NoPhotos(PhaseKind),

    #[error("Too many photos. phase: {kind}, count: {count}, limit: {limit}")]
    TooMany { kind: PhaseKind, count: usize, limit: usize },
}

pub fn check_photo_count(kind: PhaseKind, count: usize) -> Result<(), PhotoCountError> {
    let limit = photo_limit(kind);

    match count {
        0 => Err(PhotoCountError::NoPhotos(kind)),
        count if count > limit => Err(PhotoCountError::TooMany {
            kind,
            count,
            limit,
        }),
        _ => Ok(()),
    }
}

/// A photo that is ready to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedPhoto {
    pub original_filename: String,
    pub bytes: Vec<u8>,
}

/// `index` is 0-based, the suffix is 1-based and only used for batches of more than one photo.
pub fn photo_file_name(repair_code: &str, index: usize, count: usize) -> String {
    match count {
        0 | 1 => repair_code.to_string(),
        _ => format!("{}_{}", repair_code, index + 1),
    }
}

/// Uploads all the photos concurrently, fails if any upload fails.
pub async fn upload_batch<S: PhotoStorage + ?Sized>(
    storage: &S,
    folder: &str,
    repair_code: &str,
    photos: &[ProcessedPhoto],
) -> Result<Vec<UploadedPhoto>, UploadError> {
    let count = photos.len();

    let uploads = photos
        .iter()
        .enumerate()
        .map(|(index, photo)| async move {
            let file_name = photo_file_name(repair_code, index, count);
            let ticket = storage
                .sign_upload(&file_name, folder)
                .await?;
            debug!("Signed photo upload. file_name: '{}', public_id: '{}'", file_name, ticket.public_id);

            storage.transfer(&ticket, photo).await
        });

    match try_join_all(uploads).await {
        Ok(uploaded) => {
            info!("Uploaded photos. repair: '{}', count: {}", repair_code, uploaded.len());
            Ok(uploaded)
        }
        Err(error) => {
            warn!("Photo upload batch failed. repair: '{}', count: {}, cause: {}", repair_code, count, error);
            Err(error)
        }
    }
}
