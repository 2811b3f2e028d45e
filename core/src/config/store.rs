//! Persisted user configuration store
//!
//! One JSON file under the platform data directory, written atomically via
//! a temp file and rename so a crash mid-save never corrupts it.

use crate::config::UserConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsersFile {
    pub schema_version: u32,
    pub users: BTreeMap<String, UserConfig>,
}

impl Default for UsersFile {
    fn default() -> Self {
        Self {
            schema_version: 1,
            users: BTreeMap::new(),
        }
    }
}

pub struct ConfigStore {
    root_dir: PathBuf,
    users_path: PathBuf,
}

impl ConfigStore {
    pub fn new() -> Result<Self> {
        let root_dir = dirs::data_dir()
            .context("Could not find data directory")?
            .join("punchcard");
        Ok(Self::new_in(root_dir))
    }

    pub fn new_in(root_dir: PathBuf) -> Self {
        let users_path = root_dir.join("users.json");
        Self {
            root_dir,
            users_path,
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn users_path(&self) -> &Path {
        &self.users_path
    }

    /// Load the store; a missing or empty file is an empty store, not an
    /// error, so first runs need no setup step.
    pub fn load(&self) -> Result<UsersFile> {
        if !self.users_path.exists() {
            return Ok(UsersFile::default());
        }

        let content = fs::read_to_string(&self.users_path)
            .with_context(|| format!("Failed to read users file: {:?}", self.users_path))?;

        if content.trim().is_empty() {
            return Ok(UsersFile::default());
        }

        let parsed: UsersFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse users file: {:?}", self.users_path))?;

        Ok(parsed)
    }

    pub fn save(&self, users_file: &UsersFile) -> Result<()> {
        fs::create_dir_all(&self.root_dir)
            .with_context(|| format!("Failed to create config dir: {:?}", self.root_dir))?;

        let content =
            serde_json::to_string_pretty(users_file).context("Failed to serialize users file")?;

        atomic_write(&self.users_path, content.as_bytes()).with_context(|| {
            format!(
                "Failed to atomically write users file: {:?}",
                self.users_path
            )
        })?;

        Ok(())
    }
}

fn atomic_write(dest: &Path, bytes: &[u8]) -> Result<()> {
    let parent = dest
        .parent()
        .context("Destination path has no parent directory")?;
    fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create parent dir: {:?}", parent))?;

    let tmp = dest.with_extension(format!("tmp.{}", uuid::Uuid::new_v4()));

    fs::write(&tmp, bytes).with_context(|| format!("Failed to write temp file: {:?}", tmp))?;

    // Best-effort cleanup on failure.
    if let Err(rename_err) = fs::rename(&tmp, dest) {
        let _ = fs::remove_file(&tmp);
        return Err(rename_err).context("Failed to rename temp file into place");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{ConfigStore, UsersFile};
    use crate::config::{NotificationLevel, UserConfig};
    use std::path::PathBuf;

    fn unique_temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("punchcard-test-store-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn users_round_trip_save_load() {
        let dir = unique_temp_dir();
        let store = ConfigStore::new_in(dir.clone());

        let mut file = UsersFile::default();
        let mut cfg = UserConfig {
            cookie: "sess123".to_string(),
            lat: "20.000000".to_string(),
            lng: "100.000000".to_string(),
            class_id: "42".to_string(),
            auto_enabled: true,
            ..UserConfig::default()
        };
        cfg.notifications
            .insert("console".to_string(), NotificationLevel::FailureOnly);
        file.users.insert("default".to_string(), cfg);

        store.save(&file).expect("save");
        let loaded = store.load().expect("load");
        assert_eq!(loaded.schema_version, 1);
        assert_eq!(loaded.users.len(), 1);

        let cfg = &loaded.users["default"];
        assert_eq!(cfg.cookie, "sess123");
        assert_eq!(cfg.class_id, "42");
        assert!(cfg.auto_enabled);
        assert_eq!(
            cfg.notifications["console"],
            NotificationLevel::FailureOnly
        );

        // Cleanup
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn load_missing_file_returns_default() {
        let dir = unique_temp_dir();
        let store = ConfigStore::new_in(dir.clone());
        let loaded = store.load().expect("load");
        assert_eq!(loaded.schema_version, 1);
        assert!(loaded.users.is_empty());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn save_overwrites_previous_contents() {
        let dir = unique_temp_dir();
        let store = ConfigStore::new_in(dir.clone());

        let mut file = UsersFile::default();
        file.users.insert("a".to_string(), UserConfig::default());
        store.save(&file).expect("save");

        file.users.clear();
        file.users.insert("b".to_string(), UserConfig::default());
        store.save(&file).expect("save again");

        let loaded = store.load().expect("load");
        assert_eq!(loaded.users.len(), 1);
        assert!(loaded.users.contains_key("b"));
        let _ = std::fs::remove_dir_all(dir);
    }
}
