//! Tracker settings persisted as a small JSON file next to the data store.

use std::{
    env,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    time::Duration,
};

use dirs::home_dir;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::file_backend::tmp_path;

const DEFAULT_DIR_NAME: &str = ".contas_core";
const HOME_ENV: &str = "CONTAS_CORE_HOME";
const CONFIG_FILE: &str = "config.json";
const STORE_DIR: &str = "store";

pub const DEFAULT_AUTOSAVE_SECS: u64 = 30;
pub const DEFAULT_LITE_BILL_LIMIT: usize = 100;
pub const DEFAULT_DUE_SOON_DAYS: i64 = 7;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Directory for the key-value store. Defaults to `<base>/store`.
    pub data_dir: Option<PathBuf>,
    #[serde(default = "TrackerConfig::default_autosave_secs")]
    pub autosave_interval_secs: u64,
    #[serde(default = "TrackerConfig::default_lite_bill_limit")]
    pub lite_bill_limit: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota_bytes: Option<usize>,
    #[serde(default = "TrackerConfig::default_due_soon_days")]
    pub due_soon_days: i64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            autosave_interval_secs: DEFAULT_AUTOSAVE_SECS,
            lite_bill_limit: DEFAULT_LITE_BILL_LIMIT,
            quota_bytes: None,
            due_soon_days: DEFAULT_DUE_SOON_DAYS,
        }
    }
}

impl TrackerConfig {
    fn default_autosave_secs() -> u64 {
        DEFAULT_AUTOSAVE_SECS
    }

    fn default_lite_bill_limit() -> usize {
        DEFAULT_LITE_BILL_LIMIT
    }

    fn default_due_soon_days() -> i64 {
        DEFAULT_DUE_SOON_DAYS
    }

    pub fn autosave_interval(&self) -> Duration {
        Duration::from_secs(self.autosave_interval_secs.max(1))
    }
}

/// Returns the application data directory, honouring `CONTAS_CORE_HOME`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Loads and saves [`TrackerConfig`].
#[derive(Debug, Clone)]
pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        fs::create_dir_all(&base)?;
        let path = base.join(CONFIG_FILE);
        Ok(Self { base, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<TrackerConfig, ConfigError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            serde_json::from_str(&data).map_err(|err| ConfigError::Serde(err.to_string()))
        } else {
            Ok(TrackerConfig::default())
        }
    }

    pub fn save(&self, config: &TrackerConfig) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(config)
            .map_err(|err| ConfigError::Serde(err.to_string()))?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Store directory for `config`, relative to this manager's base.
    pub fn store_dir(&self, config: &TrackerConfig) -> PathBuf {
        config
            .data_dir
            .clone()
            .unwrap_or_else(|| self.base.join(STORE_DIR))
    }
}

fn write_atomic(path: &Path, data: &str) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().expect("tempdir");
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");
        let config = manager.load().expect("load");
        assert_eq!(config, TrackerConfig::default());
        assert_eq!(config.autosave_interval(), Duration::from_secs(30));
    }

    #[test]
    fn persists_and_reloads() {
        let dir = tempdir().expect("tempdir");
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");
        let config = TrackerConfig {
            lite_bill_limit: 25,
            quota_bytes: Some(4096),
            ..TrackerConfig::default()
        };
        manager.save(&config).expect("save");
        assert_eq!(manager.load().expect("load"), config);
        assert_eq!(manager.store_dir(&config), dir.path().join("store"));
    }

    #[test]
    fn partial_files_fill_in_defaults() {
        let dir = tempdir().expect("tempdir");
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");
        fs::write(manager.path(), r#"{"quota_bytes": 100}"#).expect("write");
        let config = manager.load().expect("load");
        assert_eq!(config.quota_bytes, Some(100));
        assert_eq!(config.lite_bill_limit, DEFAULT_LITE_BILL_LIMIT);
    }
}
