//! Platform-specific paths for host-side settings.
//!
//! - Linux: `~/.config/acidus/settings.toml`
//! - macOS: `~/Library/Application Support/acidus/settings.toml`
//! - Windows: `%APPDATA%\acidus\settings.toml`

use std::path::PathBuf;

/// Application name used for directory paths.
const APP_NAME: &str = "acidus";

/// File name of the calibration settings.
const SETTINGS_FILE: &str = "settings.toml";

/// Returns the user-specific configuration directory.
///
/// Falls back to the current directory if the platform config directory
/// cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default location of the calibration settings file.
pub fn default_settings_path() -> PathBuf {
    user_config_dir().join(SETTINGS_FILE)
}
