//! Persistent storage for the calibration record.

use acidus_core::Settings;

/// Non-volatile storage of [`Settings`].
///
/// Mirrors a flash-backed settings page: the defaults handed to the first
/// [`load`](Self::load) are remembered and reinstated by
/// [`restore_defaults`](Self::restore_defaults).
pub trait SettingsStore {
    /// Storage failure.
    type Error: core::fmt::Debug;

    /// Load the stored settings, persisting `defaults` if nothing is stored.
    fn load(&mut self, defaults: Settings) -> Result<Settings, Self::Error>;

    /// Persist `settings`.
    fn save(&mut self, settings: &Settings) -> Result<(), Self::Error>;

    /// Overwrite the stored settings with the defaults and return them.
    fn restore_defaults(&mut self) -> Result<Settings, Self::Error>;
}

/// In-memory store, for tests and host simulation.
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    stored: Option<Settings>,
    defaults: Option<Settings>,
    saves: usize,
}

impl MemorySettingsStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that already holds `settings`.
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            stored: Some(settings),
            ..Self::default()
        }
    }

    /// Currently stored record.
    pub fn stored(&self) -> Option<Settings> {
        self.stored
    }

    /// Number of successful [`save`](SettingsStore::save) calls.
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl SettingsStore for MemorySettingsStore {
    type Error = core::convert::Infallible;

    fn load(&mut self, defaults: Settings) -> Result<Settings, Self::Error> {
        self.defaults = Some(defaults);
        Ok(*self.stored.get_or_insert(defaults))
    }

    fn save(&mut self, settings: &Settings) -> Result<(), Self::Error> {
        self.stored = Some(*settings);
        self.saves += 1;
        Ok(())
    }

    fn restore_defaults(&mut self) -> Result<Settings, Self::Error> {
        let defaults = self.defaults.unwrap_or_default();
        self.stored = Some(defaults);
        Ok(defaults)
    }
}
