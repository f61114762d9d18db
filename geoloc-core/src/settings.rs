use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use crate::Location;

/// Application settings stored on disk as JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// OpenWeather API key, used for geocoding.
    #[serde(default)]
    pub open_weather_key: String,

    /// OpenUV API key.
    #[serde(default)]
    pub open_uv_key: String,

    /// Location used when none is given explicitly.
    #[serde(default)]
    pub default_location: Option<Location>,
}

impl Settings {
    pub fn has_open_weather_key(&self) -> bool {
        !self.open_weather_key.is_empty()
    }

    pub fn has_open_uv_key(&self) -> bool {
        !self.open_uv_key.is_empty()
    }
}

/// Reads and writes [`Settings`] at a fixed path.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the platform's per-user config location.
    pub fn at_default_path() -> Result<Self> {
        Ok(Self::new(Self::default_path()?))
    }

    /// Path to the per-user settings file.
    pub fn default_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "geoloc", "geoloc")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("settings.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads settings from disk.
    ///
    /// On first run the file does not exist yet: an empty one is written and
    /// `Ok(None)` is returned.
    pub fn load(&self) -> Result<Option<Settings>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                self.save(&Settings::default())?;
                tracing::info!(path = %self.path.display(), "created empty settings file");
                return Ok(None);
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read settings file: {}", self.path.display())
                });
            }
        };

        let settings: Settings = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse settings file: {}", self.path.display()))?;

        Ok(Some(settings))
    }

    /// Like [`SettingsStore::load`], but yields the empty record on first run.
    pub fn load_or_default(&self) -> Result<Settings> {
        Ok(self.load()?.unwrap_or_default())
    }

    /// Saves settings, creating parent directories as needed.
    pub fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create settings directory: {}", parent.display())
            })?;
        }

        let mut buf = Vec::new();
        let mut ser =
            serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        settings
            .serialize(&mut ser)
            .context("Failed to serialize settings to JSON")?;

        fs::write(&self.path, buf)
            .with_context(|| format!("Failed to write settings file: {}", self.path.display()))?;

        Ok(())
    }
}
