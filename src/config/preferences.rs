//! Persisted user preferences (currently only the theme)

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::theme::ThemeMode;

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("Could not find config directory")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode preferences: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// Where the theme choice is kept
pub trait ThemeStore {
    fn load(&self) -> Option<ThemeMode>;
    fn save(&mut self, mode: ThemeMode) -> Result<(), PreferenceError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PreferenceFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    theme: Option<ThemeMode>,
}

/// `preferences.toml` next to the app config
#[derive(Debug, Clone)]
pub struct FilePreferences {
    path: PathBuf,
}

impl FilePreferences {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn default_location() -> Result<Self, PreferenceError> {
        let dir = dirs::config_dir()
            .ok_or(PreferenceError::NoConfigDir)?
            .join(super::APP_DIR);
        Ok(Self::new(dir.join("preferences.toml")))
    }

    fn read(&self) -> PreferenceFile {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => return PreferenceFile::default(),
        };

        toml::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("Ignoring unreadable preferences {}: {}", self.path.display(), e);
            PreferenceFile::default()
        })
    }
}

impl ThemeStore for FilePreferences {
    fn load(&self) -> Option<ThemeMode> {
        self.read().theme
    }

    fn save(&mut self, mode: ThemeMode) -> Result<(), PreferenceError> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }

        let mut prefs = self.read();
        prefs.theme = Some(mode);
        std::fs::write(&self.path, toml::to_string_pretty(&prefs)?)?;
        tracing::debug!("Saved theme {} to {}", mode, self.path.display());
        Ok(())
    }
}

/// Keeps the preference in memory only
#[derive(Debug, Default, Clone)]
pub struct MemoryPreferences {
    theme: Option<ThemeMode>,
}

impl MemoryPreferences {
    #[cfg(test)]
    pub fn with_theme(mode: ThemeMode) -> Self {
        Self { theme: Some(mode) }
    }
}

impl ThemeStore for MemoryPreferences {
    fn load(&self) -> Option<ThemeMode> {
        self.theme
    }

    fn save(&mut self, mode: ThemeMode) -> Result<(), PreferenceError> {
        self.theme = Some(mode);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("preferences.toml");

        let mut prefs = FilePreferences::new(path.clone());
        assert_eq!(prefs.load(), None);

        prefs.save(ThemeMode::Light).unwrap();
        assert_eq!(FilePreferences::new(path.clone()).load(), Some(ThemeMode::Light));
        assert_eq!(std::fs::read_to_string(&path).unwrap().trim(), "theme = \"light\"");
    }

    #[test]
    fn test_unreadable_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.toml");
        std::fs::write(&path, "theme = \"purple\"").unwrap();

        assert_eq!(FilePreferences::new(path).load(), None);
    }

    #[test]
    fn test_memory_store() {
        let mut prefs = MemoryPreferences::default();
        assert_eq!(prefs.load(), None);
        prefs.save(ThemeMode::Dark).unwrap();
        assert_eq!(prefs.load(), Some(ThemeMode::Dark));
    }
}
