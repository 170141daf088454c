//! TOML-backed [`SettingsStore`].
//!
//! ```toml
//! offset_raw = 64262.0
//! units_per_volt = 12826.0
//! ```

use std::path::{Path, PathBuf};

use acidus_core::Settings;
use acidus_platform::SettingsStore;

use crate::error::ConfigError;
use crate::paths::default_settings_path;

/// Calibration settings stored as a TOML file.
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
    defaults: Settings,
}

impl FileSettingsStore {
    /// Store at `path`. Nothing is read or written until first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            defaults: Settings::default(),
        }
    }

    /// Store at [`default_settings_path`].
    pub fn at_default_location() -> Self {
        Self::new(default_settings_path())
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file without touching it; `None` if it does not exist.
    pub fn read(&self) -> Result<Option<Settings>, ConfigError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| ConfigError::read_file(&self.path, e))?;
        Ok(Some(toml::from_str(&content)?))
    }

    fn write(&self, settings: &Settings) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }
        let content = toml::to_string_pretty(settings)?;
        std::fs::write(&self.path, content).map_err(|e| ConfigError::write_file(&self.path, e))?;
        tracing::debug!(path = %self.path.display(), "settings written");
        Ok(())
    }
}

impl SettingsStore for FileSettingsStore {
    type Error = ConfigError;

    fn load(&mut self, defaults: Settings) -> Result<Settings, ConfigError> {
        self.defaults = defaults;
        match self.read()? {
            Some(settings) => Ok(settings),
            None => {
                self.write(&defaults)?;
                Ok(defaults)
            }
        }
    }

    fn save(&mut self, settings: &Settings) -> Result<(), ConfigError> {
        self.write(settings)
    }

    fn restore_defaults(&mut self) -> Result<Settings, ConfigError> {
        self.write(&self.defaults)?;
        Ok(self.defaults)
    }
}
