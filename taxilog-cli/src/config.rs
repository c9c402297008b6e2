//! Configuration for the taxilog CLI.
//!
//! Loads a TOML file, then applies environment variable overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub backup: BackupConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the app's collection documents
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupConfig {
    /// Where backup blobs land
    #[serde(default = "default_backup_dir")]
    pub backup_dir: PathBuf,

    /// Where exported spreadsheets land
    #[serde(default = "default_sheets_dir")]
    pub sheets_dir: PathBuf,

    /// Dated backups kept before the oldest are pruned
    #[serde(default = "default_keep_backups")]
    pub keep_backups: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default values
fn default_data_dir() -> PathBuf {
    PathBuf::from("./taxilog-data")
}

fn default_backup_dir() -> PathBuf {
    PathBuf::from("./taxilog-backups")
}

fn default_sheets_dir() -> PathBuf {
    PathBuf::from("./taxilog-sheets")
}

fn default_keep_backups() -> usize {
    7
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            data_dir: default_data_dir(),
        }
    }
}

impl Default for BackupConfig {
    fn default() -> Self {
        BackupConfig {
            backup_dir: default_backup_dir(),
            sheets_dir: default_sheets_dir(),
            keep_backups: default_keep_backups(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load from `path` if given (defaults otherwise), then apply
    /// environment overrides. A `.env` file is honored when present.
    pub fn load(path: Option<&PathBuf>) -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();

        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Config::default(),
        };

        if let Ok(dir) = std::env::var("TAXILOG_DATA_DIR") {
            config.storage.data_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var("TAXILOG_BACKUP_DIR") {
            config.backup.backup_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var("TAXILOG_SHEETS_DIR") {
            config.backup.sheets_dir = PathBuf::from(dir);
        }
        if let Ok(keep) = std::env::var("TAXILOG_KEEP_BACKUPS") {
            if let Ok(n) = keep.parse() {
                config.backup.keep_backups = n;
            }
        }
        if let Ok(level) = std::env::var("TAXILOG_LOG_LEVEL") {
            config.log.level = level;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_sections_fall_back_to_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.backup.keep_backups, 7);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_partial_file_overrides_only_named_keys() {
        let config: Config = toml::from_str(
            r#"
            [backup]
            keep_backups = 14

            [log]
            level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.backup.keep_backups, 14);
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.storage.data_dir, default_data_dir());
    }
}
