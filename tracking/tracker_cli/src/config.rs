use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, info};
use tracking::file;

pub const CONFIG_FILE_NAME: &str = "tracker.json";

/// Optional settings, read from `tracker.json` in the project directory.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
#[serde(default)]
pub struct TrackerConfig {
    /// Uploaded photos are stored below this directory, relative to the project directory.
    pub photo_directory: PathBuf,

    /// The project name is appended, e.g. 'facade/tower'.
    pub upload_folder_prefix: String,

    /// A CSV repair type catalog, the built-in catalog is used when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog: Option<PathBuf>,

    /// Used when a phase is submitted without `--author`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_author: Option<String>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            photo_directory: PathBuf::from("photos"),
            upload_folder_prefix: "facade".to_string(),
            catalog: None,
            default_author: None,
        }
    }
}

impl TrackerConfig {
    /// A missing file gives the default configuration.
    pub fn load(directory: &Path) -> anyhow::Result<Self> {
        let path = directory.join(CONFIG_FILE_NAME);
        if !path.exists() {
            debug!("No tracker config, using defaults. file: {}", path.display());
            return Ok(Self::default());
        }

        let config: TrackerConfig =
            file::load(&path).with_context(|| format!("Loading tracker config. file: {}", path.display()))?;
        info!("Loaded tracker config. file: {}", path.display());

        Ok(config)
    }

    pub fn upload_folder(&self, project_name: &str) -> String {
        if self.upload_folder_prefix.is_empty() {
            return project_name.to_string();
        }
        format!("{}/{}", self.upload_folder_prefix, project_name)
    }
}
