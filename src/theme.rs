//! Light/dark theme
//!
//! `ThemeService` is the single owner of the current mode. It is created
//! once at startup with a preference store and handed to whatever draws.

use std::fmt;
use std::str::FromStr;

use ratatui::style::Color;
use serde::{Deserialize, Serialize};

use crate::config::preferences::{PreferenceError, ThemeStore};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Dark,
    Light,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Dark => ThemeMode::Light,
            ThemeMode::Light => ThemeMode::Dark,
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThemeMode::Dark => write!(f, "dark"),
            ThemeMode::Light => write!(f, "light"),
        }
    }
}

impl FromStr for ThemeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(ThemeMode::Dark),
            "light" => Ok(ThemeMode::Light),
            other => Err(format!("unknown theme '{}' (expected dark or light)", other)),
        }
    }
}

/// Theme colors for the UI
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub accent: Color,      // Active borders, selected column
    pub danger: Color,      // Errors
    pub success: Color,
    pub warning: Color,     // Confirm dialog
    pub text: Color,
    pub text_dim: Color,
    pub bg: Color,
    pub bg_selected: Color, // Selected row
    pub inactive: Color,    // Borders
    pub header: Color,      // Table header text
}

impl Theme {
    pub fn for_mode(mode: ThemeMode) -> Self {
        match mode {
            // Catppuccin Mocha
            ThemeMode::Dark => Self {
                accent: Color::Rgb(250, 179, 135),
                danger: Color::Rgb(243, 139, 168),
                success: Color::Rgb(166, 218, 149),
                warning: Color::Rgb(249, 226, 175),
                text: Color::Rgb(205, 214, 244),
                text_dim: Color::Rgb(147, 153, 178),
                bg: Color::Rgb(30, 30, 46),
                bg_selected: Color::Rgb(69, 71, 90),
                inactive: Color::Rgb(88, 91, 112),
                header: Color::Rgb(137, 180, 250),
            },
            // Catppuccin Latte
            ThemeMode::Light => Self {
                accent: Color::Rgb(254, 100, 11),
                danger: Color::Rgb(210, 15, 57),
                success: Color::Rgb(64, 160, 43),
                warning: Color::Rgb(223, 142, 29),
                text: Color::Rgb(76, 79, 105),
                text_dim: Color::Rgb(108, 111, 133),
                bg: Color::Rgb(239, 241, 245),
                bg_selected: Color::Rgb(204, 208, 218),
                inactive: Color::Rgb(156, 160, 176),
                header: Color::Rgb(30, 102, 245),
            },
        }
    }

    /// Parse a hex color string (#RRGGBB or #RGB)
    pub fn parse_hex_color(s: &str) -> Option<Color> {
        let s = s.trim().trim_start_matches('#');
        if !s.is_ascii() {
            return None;
        }

        if s.len() == 6 {
            let r = u8::from_str_radix(&s[0..2], 16).ok()?;
            let g = u8::from_str_radix(&s[2..4], 16).ok()?;
            let b = u8::from_str_radix(&s[4..6], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        } else if s.len() == 3 {
            let r = u8::from_str_radix(&s[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&s[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&s[2..3], 16).ok()? * 17;
            Some(Color::Rgb(r, g, b))
        } else {
            None
        }
    }
}

pub struct ThemeService {
    store: Box<dyn ThemeStore>,
    mode: ThemeMode,
    accent: Option<Color>,
    palette: Theme,
}

impl fmt::Debug for ThemeService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeService")
            .field("mode", &self.mode)
            .field("accent", &self.accent)
            .finish()
    }
}

impl ThemeService {
    /// Start from the saved mode, or dark when nothing was saved.
    /// `accent` overrides the palette accent when it parses.
    pub fn init(store: Box<dyn ThemeStore>, accent: Option<&str>) -> Self {
        let mode = store.load().unwrap_or_default();
        let accent = accent.and_then(|s| {
            let color = Theme::parse_hex_color(s);
            if color.is_none() {
                tracing::warn!("Ignoring invalid accent color: {}", s);
            }
            color
        });

        Self {
            store,
            mode,
            accent,
            palette: Self::build_palette(mode, accent),
        }
    }

    fn build_palette(mode: ThemeMode, accent: Option<Color>) -> Theme {
        let mut palette = Theme::for_mode(mode);
        if let Some(accent) = accent {
            palette.accent = accent;
        }
        palette
    }

    #[allow(dead_code)]
    pub fn get(&self) -> ThemeMode {
        self.mode
    }

    /// Persist and apply `mode`. The mode is only applied once saved.
    pub fn set(&mut self, mode: ThemeMode) -> Result<(), PreferenceError> {
        self.store.save(mode)?;
        self.mode = mode;
        self.palette = Self::build_palette(mode, self.accent);
        tracing::info!("Theme set to {}", mode);
        Ok(())
    }

    pub fn toggle(&mut self) -> Result<ThemeMode, PreferenceError> {
        let next = self.mode.toggled();
        self.set(next)?;
        Ok(next)
    }

    pub fn palette(&self) -> &Theme {
        &self.palette
    }

    /// Moon in dark mode, sun in light mode
    pub fn icon(&self) -> &'static str {
        match self.mode {
            ThemeMode::Dark => "󰖔",
            ThemeMode::Light => "󰖙",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::preferences::MemoryPreferences;

    struct FailingStore;

    impl ThemeStore for FailingStore {
        fn load(&self) -> Option<ThemeMode> {
            None
        }

        fn save(&mut self, _mode: ThemeMode) -> Result<(), PreferenceError> {
            Err(PreferenceError::NoConfigDir)
        }
    }

    #[test]
    fn test_defaults_to_dark() {
        let service = ThemeService::init(Box::new(MemoryPreferences::default()), None);
        assert_eq!(service.get(), ThemeMode::Dark);
        assert_eq!(service.palette(), &Theme::for_mode(ThemeMode::Dark));
    }

    #[test]
    fn test_restores_saved_mode() {
        let store = MemoryPreferences::with_theme(ThemeMode::Light);
        let service = ThemeService::init(Box::new(store), None);
        assert_eq!(service.get(), ThemeMode::Light);
        assert_eq!(service.icon(), "󰖙");
    }

    #[test]
    fn test_toggle_switches_palette() {
        let mut service = ThemeService::init(Box::new(MemoryPreferences::default()), None);

        assert_eq!(service.toggle().unwrap(), ThemeMode::Light);
        assert_eq!(service.palette().bg, Theme::for_mode(ThemeMode::Light).bg);

        assert_eq!(service.toggle().unwrap(), ThemeMode::Dark);
        assert_eq!(service.icon(), "󰖔");
    }

    #[test]
    fn test_failed_save_keeps_mode() {
        let mut service = ThemeService::init(Box::new(FailingStore), None);
        assert!(service.toggle().is_err());
        assert_eq!(service.get(), ThemeMode::Dark);
    }

    #[test]
    fn test_accent_override() {
        let mut service = ThemeService::init(Box::new(MemoryPreferences::default()), Some("#FFC107"));
        assert_eq!(service.palette().accent, Color::Rgb(255, 193, 7));

        service.set(ThemeMode::Light).unwrap();
        assert_eq!(service.palette().accent, Color::Rgb(255, 193, 7));

        let service = ThemeService::init(Box::new(MemoryPreferences::default()), Some("orange"));
        assert_eq!(service.palette().accent, Theme::for_mode(ThemeMode::Dark).accent);
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(Theme::parse_hex_color("#fff"), Some(Color::Rgb(255, 255, 255)));
        assert_eq!(Theme::parse_hex_color("10b981"), Some(Color::Rgb(16, 185, 129)));
        assert_eq!(Theme::parse_hex_color("#12345"), None);
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("Light".parse::<ThemeMode>(), Ok(ThemeMode::Light));
        assert!("blue".parse::<ThemeMode>().is_err());
    }
}
