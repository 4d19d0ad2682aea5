use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub fn build_project_file_path(name: &str, directory: &Path) -> PathBuf {
    let mut project_file_path: PathBuf = PathBuf::from(directory);
    project_file_path.push(format!("project-{}.facade.json", name));
    project_file_path
}

pub fn build_repairs_file_path(name: &str, directory: &Path) -> PathBuf {
    let mut repairs_file_path: PathBuf = PathBuf::from(directory);
    repairs_file_path.push(format!("repairs-{}.facade.json", name));
    repairs_file_path
}

pub fn load<T: for<'de> Deserialize<'de>>(file_path: &Path) -> Result<T, std::io::Error> {
    let file = File::open(file_path)?;
    let mut de = serde_json::Deserializer::from_reader(file);
    let t = T::deserialize(&mut de)?;
    Ok(t)
}

/// Writes pretty, 4-space indented, json with a trailing newline.
pub fn save<T: Serialize + ?Sized>(t: &T, file_path: &Path) -> Result<(), std::io::Error> {
    let file = File::create(file_path)?;
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(file, formatter);
    t.serialize(&mut ser)?;

    let mut file = ser.into_inner();
    let _written = file.write(b"\n")?;

    Ok(())
}
