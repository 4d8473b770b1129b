//! Local storage configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

/// Configuration for the gateway's local data directory
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding gateway-local data files
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// File name of the participant profile document inside `data_dir`
    #[serde(default = "default_profile_file")]
    pub profile_file: String,

    /// Largest accepted upload in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,

    /// Accepted upload file extensions (comma-separated, no dots)
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: String,
}

impl StorageConfig {
    /// Full path of the profile document
    pub fn profile_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(&self.profile_file)
    }

    /// Get allowed extensions as a normalized vector
    pub fn allowed_extensions_list(&self) -> Vec<String> {
        self.allowed_extensions
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Whether a file extension is accepted for upload (case-insensitive)
    pub fn extension_allowed(&self, extension: &str) -> bool {
        let normalized = extension.to_lowercase();
        self.allowed_extensions_list()
            .iter()
            .any(|e| e == &normalized)
    }

    /// Validate storage configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_upload_bytes == 0 {
            return Err(ValidationError::InvalidUploadLimit);
        }
        if self.allowed_extensions_list().is_empty() {
            return Err(ValidationError::NoAllowedExtensions);
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            profile_file: default_profile_file(),
            max_upload_bytes: default_max_upload_bytes(),
            allowed_extensions: default_allowed_extensions(),
        }
    }
}

fn default_data_dir() -> String {
    "./data".to_string()
}

fn default_profile_file() -> String {
    "user_profiles.json".to_string()
}

fn default_max_upload_bytes() -> u64 {
    10 * 1024 * 1024
}

fn default_allowed_extensions() -> String {
    "jpg,jpeg,png,gif,pdf,doc,docx".to_string()
}
