pub mod preferences;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory name under the platform config dir
pub const APP_DIR: &str = "tablewatch";

fn default_refresh_interval() -> u64 {
    crate::refresh::DEFAULT_INTERVAL.as_secs()
}

fn default_search_debounce() -> u64 {
    crate::debounce::DEFAULT_WAIT.as_millis() as u64
}

fn default_date_columns() -> Vec<String> {
    vec!["created_at".to_string(), "updated_at".to_string()]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Seconds between automatic reloads of the source file
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,

    /// Quiet time before search input is applied
    #[serde(default = "default_search_debounce")]
    pub search_debounce_ms: u64,

    /// Send error toasts to the desktop notification daemon too
    #[serde(default)]
    pub notifications: bool,

    /// Columns rendered as dates
    #[serde(default = "default_date_columns")]
    pub date_columns: Vec<String>,

    /// Accent colour override, `#RRGGBB` or `#RGB`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval(),
            search_debounce_ms: default_search_debounce(),
            notifications: false,
            date_columns: default_date_columns(),
            accent: None,
        }
    }
}

impl AppConfig {
    /// Directory holding config.toml and preferences.toml
    pub fn config_dir() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join(APP_DIR);
        Ok(dir)
    }

    /// Load config from the default location. The file is optional and
    /// never written; problems fall back to defaults.
    pub fn load() -> Self {
        match Self::config_dir() {
            Ok(dir) => Self::load_from(&dir.join("config.toml")),
            Err(e) => {
                tracing::warn!("{}", e);
                AppConfig::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return AppConfig::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => return config,
                Err(e) => tracing::warn!("Failed to parse config: {}", e),
            },
            Err(e) => tracing::warn!("Failed to read config: {}", e),
        }

        AppConfig::default()
    }

    /// Never zero: a configured `0` is raised to one second
    pub fn refresh_interval(&self) -> std::time::Duration {
        if self.refresh_interval_secs == 0 {
            tracing::warn!("refresh_interval_secs = 0 is not allowed, using 1");
        }
        std::time::Duration::from_secs(self.refresh_interval_secs.max(1))
    }

    pub fn search_debounce(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.search_debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serialization() {
        let config = AppConfig {
            refresh_interval_secs: 10,
            search_debounce_ms: 150,
            notifications: true,
            date_columns: vec!["due".to_string()],
            accent: Some("#FFC107".to_string()),
        };

        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&serialized).unwrap();

        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AppConfig = toml::from_str("refresh_interval_secs = 5\n").unwrap();

        assert_eq!(config.refresh_interval_secs, 5);
        assert_eq!(config.search_debounce_ms, 300);
        assert_eq!(config.date_columns, vec!["created_at", "updated_at"]);
        assert!(config.accent.is_none());
    }

    #[test]
    fn test_zero_refresh_interval_is_raised() {
        let config: AppConfig = toml::from_str("refresh_interval_secs = 0\n").unwrap();
        assert_eq!(config.refresh_interval(), std::time::Duration::from_secs(1));

        let config: AppConfig = toml::from_str("refresh_interval_secs = 12\n").unwrap();
        assert_eq!(config.refresh_interval(), std::time::Duration::from_secs(12));
    }

    #[test]
    fn test_missing_or_broken_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert_eq!(AppConfig::load_from(&path), AppConfig::default());

        std::fs::write(&path, "refresh_interval_secs = \"soon\"").unwrap();
        assert_eq!(AppConfig::load_from(&path), AppConfig::default());
    }
}
