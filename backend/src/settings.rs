use std::path::{Path, PathBuf};
use serde::{Serialize, Deserialize};

use crate::types::ConvertError;

pub const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertSettings {
    /// Directory receiving `NN.Title.txt` files when writing to file.
    pub data_dir: PathBuf,
    /// Optional JSON book number to title table, overriding document titles.
    pub titles_file: Option<PathBuf>,
}

impl Default for ConvertSettings {
    fn default() -> Self {
        ConvertSettings {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            titles_file: None,
        }
    }
}

impl ConvertSettings {
    /// Defaults overridden by `SWETE_DATA_DIR` and `SWETE_TITLES_FILE`.
    pub fn from_env() -> Self {
        let mut settings = ConvertSettings::default();
        settings.apply_env();
        settings
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConvertError> {
        serde_json::from_str(json)
            .map_err(|e| ConvertError::Settings(format!("Invalid settings JSON: {}", e)))
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConvertError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConvertError::UnopenedInput {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn apply_env(&mut self) {
        if let Some(dir) = env_path("SWETE_DATA_DIR") {
            self.data_dir = dir;
        }
        if let Some(file) = env_path("SWETE_TITLES_FILE") {
            self.titles_file = Some(file);
        }
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}
