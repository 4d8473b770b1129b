//! Filesystem storage adapter for participant profiles
//!
//! Keeps every profile in a single JSON document on disk, keyed by
//! lowercased wallet address. The file is re-read on every call so an
//! operator can inspect or edit it between requests; writes go through
//! a mutex and a temporary file so concurrent saves cannot interleave
//! or tear the document.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

use crate::domain::foundation::UserAddress;
use crate::domain::user::UserProfile;
use crate::ports::{ProfileStore, ProfileStoreError};

/// Filesystem-based profile store
///
/// Stores all profiles in one JSON file: `{data_dir}/{profile_file}`.
pub struct FsProfileStore {
    path: PathBuf,
    write_guard: Mutex<()>,
}

impl FsProfileStore {
    /// Create a store backed by the given file path.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_guard: Mutex::new(()),
        }
    }

    /// Read the whole document. A missing file is an empty store.
    async fn load_map(&self) -> Result<HashMap<String, UserProfile>, ProfileStoreError> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write the whole document atomically using a temporary file.
    async fn store_map(&self, map: &HashMap<String, UserProfile>) -> Result<(), ProfileStoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(map)?;
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, content).await?;

        // Rename to final location (atomic operation on Unix)
        fs::rename(&temp_path, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for FsProfileStore {
    async fn save(&self, profile: UserProfile) -> Result<(), ProfileStoreError> {
        // Hold the guard across the read-modify-write so two saves
        // cannot drop each other's entries.
        let _guard = self.write_guard.lock().await;

        let mut map = self.load_map().await?;
        let key = profile.address.storage_key();
        map.insert(key, profile);
        self.store_map(&map).await
    }

    async fn load(&self, address: &UserAddress) -> Result<Option<UserProfile>, ProfileStoreError> {
        let map = self.load_map().await?;
        Ok(map.get(&address.storage_key()).cloned())
    }

    async fn load_all(&self) -> Result<Vec<UserProfile>, ProfileStoreError> {
        let map = self.load_map().await?;
        let mut profiles: Vec<UserProfile> = map.into_values().collect();
        profiles.sort_by(|a, b| a.address.storage_key().cmp(&b.address.storage_key()));
        Ok(profiles)
    }

    async fn exists(&self, address: &UserAddress) -> Result<bool, ProfileStoreError> {
        let map = self.load_map().await?;
        Ok(map.contains_key(&address.storage_key()))
    }
}
