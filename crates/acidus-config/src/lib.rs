//! Host-side configuration for acidus.
//!
//! # Features
//!
//! - **Settings file**: [`FileSettingsStore`] persists the calibration
//!   record as TOML and implements the firmware's [`SettingsStore`] trait,
//!   so boot and calibration run unchanged on the host
//! - **Scenarios**: [`Scenario`] timelines of panel states for the simulator
//! - **Paths**: platform-specific config directory
//!
//! # Example
//!
//! ```rust,no_run
//! use acidus_config::FileSettingsStore;
//! use acidus_platform::boot;
//!
//! let mut store = FileSettingsStore::at_default_location();
//! let constants = boot(&mut store);
//! println!("offset {} upv {}", constants.offset_raw, constants.units_per_volt);
//! ```
//!
//! [`SettingsStore`]: acidus_platform::SettingsStore

mod error;
mod settings_file;

/// Platform-specific paths for configuration.
pub mod paths;

/// Simulator scenario files.
pub mod scenario;

pub use error::ConfigError;
pub use paths::{default_settings_path, user_config_dir};
pub use scenario::{PanelState, PersonalitySetting, Scenario, ScenarioStep, SwitchSetting};
pub use settings_file::FileSettingsStore;
