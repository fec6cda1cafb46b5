//! User settings from ~/.config/confirm/config.toml

use crate::typo::DEFAULT_TYPO_RATIO;
use serde::Deserialize;
use std::path::PathBuf;

/// User settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Defaults for `confirm validate`.
    pub validate: ValidateSettings,
}

/// Defaults for `confirm validate`. Command-line flags can only turn these on.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ValidateSettings {
    /// Print warnings.
    pub warnings: bool,
    /// Print infos.
    pub infos: bool,
    /// Report deprecated sections and options as errors.
    pub deprecation: bool,
    /// Minimum similarity for typo suggestions.
    pub typo_ratio: f64,
}

impl Default for ValidateSettings {
    fn default() -> Self {
        Self {
            warnings: false,
            infos: false,
            deprecation: false,
            typo_ratio: DEFAULT_TYPO_RATIO,
        }
    }
}

impl Settings {
    /// Load settings from the default path, falling back to defaults.
    pub fn load() -> Self {
        Self::from_path(Self::default_path()).unwrap_or_default()
    }

    /// Load settings from a specific path.
    pub fn from_path(path: Option<PathBuf>) -> Option<Self> {
        let path = path?;
        let contents = std::fs::read_to_string(&path).ok()?;
        match toml::from_str(&contents) {
            Ok(settings) => Some(settings),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring invalid settings file");
                None
            }
        }
    }

    /// Get the default settings path.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("confirm").join("config.toml"))
    }
}
