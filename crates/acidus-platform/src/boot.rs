//! Startup: load calibration and recover from a corrupt record.

use acidus_core::{CalibrationConstants, Settings};

use crate::panel::{PanelInputs, Switch, SwitchPosition};
use crate::store::SettingsStore;

/// Load calibration constants, restoring defaults if the stored slope is
/// out of band.
///
/// Must run before the first control-loop iteration. Storage errors fall
/// back to [`CalibrationConstants::DEFAULT`]; this never fails.
pub fn boot<S: SettingsStore + ?Sized>(store: &mut S) -> CalibrationConstants {
    let defaults = Settings::from(CalibrationConstants::DEFAULT);
    let loaded = match store.load(defaults) {
        Ok(settings) => CalibrationConstants::from(settings),
        Err(_err) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = ?_err, "settings load failed, using defaults");
            return CalibrationConstants::DEFAULT;
        }
    };

    if loaded.is_valid() {
        #[cfg(feature = "tracing")]
        tracing::info!(
            offset = loaded.offset_raw,
            units_per_volt = loaded.units_per_volt,
            "calibration loaded"
        );
        return loaded;
    }

    #[cfg(feature = "tracing")]
    tracing::warn!(
        units_per_volt = loaded.units_per_volt,
        "stored calibration out of band, restoring defaults"
    );

    match store.restore_defaults() {
        Ok(restored) => CalibrationConstants::from(restored).sanitized(),
        Err(_err) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = ?_err, "restoring default settings failed");
            CalibrationConstants::DEFAULT
        }
    }
}

/// Calibration entry gesture: both switches right and the tap button held.
pub fn should_enter_calibration<P: PanelInputs + ?Sized>(panel: &P) -> bool {
    panel.switch(Switch::Waveform) == SwitchPosition::Right
        && panel.switch(Switch::Personality) == SwitchPosition::Right
        && panel.tap_pressed()
}
