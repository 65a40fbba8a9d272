//! Persisted user settings
//!
//! Settings live in `~/.config/chatnav/settings.toml`:
//!
//! ```toml
//! theme_mode = "auto"          # light, dark, blue, lavender or auto
//! geometry_freshness = "500ms"
//!
//! [sites]
//! chatgpt = true
//! grok = false
//! ```
//!
//! Every key is optional. A site missing from `[sites]` is enabled.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::navigation::ThemeMode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Theme name or `auto`
    pub theme_mode: String,
    /// How long a geometry reading stays valid, e.g. `500ms`
    pub geometry_freshness: String,
    /// Per-site switches keyed by adapter key
    pub sites: BTreeMap<String, bool>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme_mode: "auto".to_string(),
            geometry_freshness: "500ms".to_string(),
            sites: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Default settings location (`<config dir>/chatnav/settings.toml`).
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("chatnav").join("settings.toml"))
    }

    /// Load settings from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("settings file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from the default location, falling back to defaults on any error.
    pub fn load_default() -> Self {
        let Some(path) = Self::default_path() else {
            info!("no config directory available, using default settings");
            return Self::default();
        };
        Self::load(&path).unwrap_or_else(|e| {
            warn!("{e}; falling back to default settings");
            Self::default()
        })
    }

    /// Write settings to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        let text = toml::to_string_pretty(self)?;
        let write_error = |source: std::io::Error| Error::ConfigWrite {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }
        std::fs::write(path, text).map_err(write_error)
    }

    pub fn site_enabled(&self, key: &str) -> bool {
        self.sites.get(key).copied().unwrap_or(true)
    }

    pub fn set_site_enabled(&mut self, key: &str, enabled: bool) {
        self.sites.insert(key.to_string(), enabled);
    }

    pub fn theme_mode(&self) -> ThemeMode {
        ThemeMode::parse(&self.theme_mode)
    }

    /// Geometry freshness window.
    pub fn freshness(&self) -> Result<Duration> {
        parse_duration(&self.geometry_freshness)
    }
}

/// Parse a human-readable duration such as `250ms` or `1s`.
pub fn parse_duration(value: &str) -> Result<Duration> {
    humantime::parse_duration(value.trim()).map_err(|source| Error::InvalidDuration {
        value: value.to_string(),
        source,
    })
}
