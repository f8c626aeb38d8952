//! Runtime settings.
//!
//! Resolution order: built-in defaults, then `settings.json` in the
//! platform config directory, then environment variables (a `.env` file
//! in the working directory is honored):
//!   macOS:   ~/Library/Application Support/locshot/settings.json
//!   Linux:   ~/.config/locshot/settings.json
//!   Windows: %APPDATA%/locshot/settings.json

use crate::capture::OverlayStyle;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const ENV_IMPORT_CONCURRENCY: &str = "LOCSHOT_IMPORT_CONCURRENCY";
pub const ENV_SELECTION_POLICY: &str = "LOCSHOT_SELECTION_POLICY";
pub const ENV_DEBUG_OVERLAY: &str = "LOCSHOT_DEBUG_OVERLAY";

/// What happens to the active index when the gallery list shrinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionPolicy {
    /// Leave the index untouched. It may point at a shifted image or past
    /// the end of the list after a delete.
    #[default]
    Preserve,
    /// Keep the index on the same image. Clear it when that image is
    /// removed or when a delete empties the record.
    Revalidate,
}

impl FromStr for SelectionPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "preserve" => Ok(Self::Preserve),
            "revalidate" => Ok(Self::Revalidate),
            other => Err(ConfigError::InvalidValue {
                key: ENV_SELECTION_POLICY,
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Upper bound on drop items resolved and decoded at the same time.
    pub import_concurrency: usize,
    pub selection_policy: SelectionPolicy,
    /// Opacity of the black layer over gallery tiles that are not active.
    pub tile_dim_opacity: f32,
    pub overlay: OverlayStyle,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            import_concurrency: 4,
            selection_policy: SelectionPolicy::default(),
            tile_dim_opacity: 0.5,
            overlay: OverlayStyle::default(),
        }
    }
}

/// Base directory for settings.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("locshot")
}

/// Full path of the settings file.
pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

impl Settings {
    /// Loads settings from the standard locations.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let path = settings_path();
        let settings = if path.exists() {
            Self::from_file(&path)?
        } else {
            log::debug!("[CONFIG] No settings file at {}", path.display());
            Self::default()
        };

        settings.with_overrides(|key| std::env::var(key).ok())
    }

    /// Reads a JSON settings file. Missing fields keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let settings: Settings = serde_json::from_str(&raw)?;
        log::info!("[CONFIG] Loaded settings from {}", path.display());
        Ok(settings.normalized())
    }

    /// Applies overrides from `lookup`, which maps a variable name to its
    /// value if set.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_IMPORT_CONCURRENCY) {
            self.import_concurrency =
                raw.trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue {
                        key: ENV_IMPORT_CONCURRENCY,
                        value: raw.clone(),
                    })?;
        }

        if let Some(raw) = lookup(ENV_SELECTION_POLICY) {
            self.selection_policy = raw.parse()?;
        }

        if let Some(raw) = lookup(ENV_DEBUG_OVERLAY) {
            self.overlay.debug_readout = parse_flag(&raw).ok_or(ConfigError::InvalidValue {
                key: ENV_DEBUG_OVERLAY,
                value: raw.clone(),
            })?;
        }

        Ok(self.normalized())
    }

    fn normalized(mut self) -> Self {
        self.import_concurrency = self.import_concurrency.max(1);
        self.tile_dim_opacity = self.tile_dim_opacity.clamp(0.0, 1.0);
        self.overlay.dim_opacity = self.overlay.dim_opacity.clamp(0.0, 1.0);
        self.overlay.corner_radius = self.overlay.corner_radius.max(0.0);
        self
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read settings from {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed settings file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
}
