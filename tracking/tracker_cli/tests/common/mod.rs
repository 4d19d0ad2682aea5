use std::fs;
use std::path::{Path, PathBuf};

/// The start of a JPEG file, enough for the stores, which never decode photos.
pub const JPEG_BYTES: [u8; 4] = [0xFF, 0xD8, 0xFF, 0xE0];

/// Writes a photo file into `directory`, returning its path.
pub fn write_photo(directory: &Path, file_name: &str) -> PathBuf {
    let mut path = PathBuf::from(directory);
    path.push(file_name);
    fs::write(&path, JPEG_BYTES).unwrap();
    path
}

pub fn read_json(path: &Path) -> serde_json::Value {
    let content = fs::read_to_string(path).unwrap();
    serde_json::from_str(&content).unwrap()
}

/// The path of an uploaded photo, using the default photo directory and upload folder prefix.
pub fn uploaded_photo_path(directory: &Path, project: &str, file_name: &str) -> PathBuf {
    let mut path = PathBuf::from(directory);
    path.push("photos");
    path.push("facade");
    path.push(project);
    path.push(file_name);
    path
}
