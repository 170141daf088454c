//! Guided, operator-paced calibration of the pitch input.
//!
//! Blocks the control loop until finished; audio keeps running with the
//! last published parameters. There is no cancellation.
//!
//! ```text
//! ReleaseButton -> wait for the entry button to be let go
//! OneVolt       -> press/release, 1 read
//! TwoVolts      -> press/release, mean of 10 reads
//! ThreeVolts    -> press/release, mean of 10 reads
//! Done          -> estimate, persist
//! ```

use acidus_core::{CalibrationConstants, CalibrationStep, Calibrator, Settings, mean_reading};

use crate::edge::{Edge, EdgeDetector};
use crate::panel::PanelInputs;
use crate::store::SettingsStore;

/// Pause after each button release before sampling, in milliseconds.
pub const POST_PRESS_DELAY_MS: u32 = 200;

/// Block until the tap button is pressed and released, then settle.
pub fn wait_for_button<P: PanelInputs + ?Sized>(panel: &mut P) {
    let mut tap = EdgeDetector::new(panel.tap_pressed());
    loop {
        panel.poll();
        if tap.update(panel.tap_pressed()) == Edge::Rising {
            break;
        }
    }
    loop {
        panel.poll();
        if tap.update(panel.tap_pressed()) == Edge::Falling {
            break;
        }
    }
    panel.delay_ms(POST_PRESS_DELAY_MS);
}

/// Run the full procedure and persist the result.
///
/// `on_step` is called on entry to every step, for indicator LEDs. The
/// estimate is returned even if it is out of band or cannot be saved; the
/// next boot applies the band check.
pub fn run_calibration<P, S>(
    panel: &mut P,
    store: &mut S,
    mut on_step: impl FnMut(CalibrationStep),
) -> CalibrationConstants
where
    P: PanelInputs + ?Sized,
    S: SettingsStore + ?Sized,
{
    let mut calibrator = Calibrator::new();
    on_step(calibrator.step());

    panel.poll();
    while panel.tap_pressed() {
        panel.poll();
    }
    calibrator.button_released();

    let constants = loop {
        let step = calibrator.step();
        on_step(step);
        wait_for_button(panel);
        let reading = mean_reading(step.reads(), || panel.raw_pitch_cv());

        #[cfg(feature = "tracing")]
        tracing::debug!(?step, reading, "calibration reference sampled");

        if let Some(constants) = calibrator.record(reading) {
            break constants;
        }
    };

    if let Err(_err) = store.save(&Settings::from(constants)) {
        #[cfg(feature = "tracing")]
        tracing::warn!(error = ?_err, "saving calibration failed");
    }
    on_step(CalibrationStep::Done);
    constants
}
