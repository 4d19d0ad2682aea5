use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, trace};
use tracking::collaborators::{PhotoStorage, UploadError, UploadTicket, UploadedPhoto};
use tracking::photo::ProcessedPhoto;

/// Stores uploaded photos as files below a root directory, one sub-directory per upload folder.
///
/// The file extension is taken from the photo's original filename.
pub struct DirectoryPhotoStorage {
    root: PathBuf,
}

impl DirectoryPhotoStorage {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_valid_segment(segment: &str) -> bool {
        !segment.is_empty()
            && segment != ".."
            && !segment.contains(['/', '\\'])
    }

    fn write(&self, ticket: &UploadTicket, photo: &ProcessedPhoto) -> Result<PathBuf, std::io::Error> {
        let mut path = PathBuf::from(&ticket.endpoint);
        path.push(&ticket.public_id);
        if let Some(extension) = Path::new(&photo.original_filename).extension() {
            let mut file_name = path.as_os_str().to_owned();
            file_name.push(".");
            file_name.push(extension);
            path = PathBuf::from(file_name);
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, &photo.bytes)?;

        Ok(path)
    }
}

#[async_trait]
impl PhotoStorage for DirectoryPhotoStorage {
    async fn sign_upload(&self, file_name: &str, folder: &str) -> Result<UploadTicket, UploadError> {
        let valid_folder = folder
            .split('/')
            .all(Self::is_valid_segment);

        if !Self::is_valid_segment(file_name) || !valid_folder {
            return Err(UploadError::Signing {
                file_name: file_name.to_string(),
                reason: format!("invalid file name or folder. folder: '{}'", folder),
            });
        }

        let ticket = UploadTicket {
            endpoint: self.root.display().to_string(),
            credentials: String::new(),
            public_id: format!("{}/{}", folder, file_name),
        };
        trace!("Signed upload. ticket: {:?}", ticket);

        Ok(ticket)
    }

    async fn transfer(&self, ticket: &UploadTicket, photo: &ProcessedPhoto) -> Result<UploadedPhoto, UploadError> {
        let path = self
            .write(ticket, photo)
            .map_err(|error| UploadError::Transfer {
                file_name: ticket.public_id.clone(),
                reason: error.to_string(),
            })?;

        debug!(
            "Stored photo. path: {}, original_filename: '{}', bytes: {}",
            path.display(),
            photo.original_filename,
            photo.bytes.len()
        );

        Ok(UploadedPhoto {
            url: format!("file://{}", path.display()),
            public_id: ticket.public_id.clone(),
            original_filename: photo.original_filename.clone(),
        })
    }
}
