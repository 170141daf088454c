//! Pitch CV calibration: a linear map from volts to raw ADC counts.
//!
//! The pitch input is inverted: raw counts fall as the applied voltage
//! rises. Three reference voltages (1 V, 2 V, 3 V) are sampled and the two
//! per-volt differences averaged:
//!
//! ```text
//! d1 = raw(1V) - raw(2V)
//! d2 = raw(2V) - raw(3V)
//! units_per_volt = round((d1 + d2) / 2)
//! offset         = raw(1V) + (d1 + d2) / 2      // raw count at 0 V
//! ```
//!
//! The procedure assumes the operator applies exactly 1 V spacing. Nothing
//! here validates the spacing; a degenerate run yields an out-of-band
//! `units_per_volt`, which the boot-time band check replaces with defaults.

/// Lowest plausible units-per-volt (inclusive).
pub const MIN_UNITS_PER_VOLT: u16 = 400;

/// Highest plausible units-per-volt (inclusive).
pub const MAX_UNITS_PER_VOLT: u16 = 20000;

/// Reads averaged per reference after the first.
pub const AVERAGED_READS: usize = 10;

/// Linear voltage-to-raw mapping for the pitch input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationConstants {
    /// Raw ADC count corresponding to 0 V.
    pub offset_raw: u16,
    /// Raw ADC counts per volt (counts fall as voltage rises).
    pub units_per_volt: u16,
}

impl CalibrationConstants {
    /// Factory calibration for the reference panel.
    pub const DEFAULT: Self = Self {
        offset_raw: 64262,
        units_per_volt: 12826,
    };

    /// Create constants from an offset and a slope.
    pub const fn new(offset_raw: u16, units_per_volt: u16) -> Self {
        Self {
            offset_raw,
            units_per_volt,
        }
    }

    /// True if `units_per_volt` lies inside the plausible band.
    pub const fn is_valid(&self) -> bool {
        self.units_per_volt >= MIN_UNITS_PER_VOLT && self.units_per_volt <= MAX_UNITS_PER_VOLT
    }

    /// These constants, or [`DEFAULT`](Self::DEFAULT) if they are out of band.
    pub const fn sanitized(self) -> Self {
        if self.is_valid() { self } else { Self::DEFAULT }
    }
}

impl Default for CalibrationConstants {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// The persisted calibration record.
///
/// Stored as floats to stay layout-compatible with panels calibrated by
/// earlier firmware. Conversion to [`CalibrationConstants`] rounds and
/// saturates into `u16`, so NaN and negative values land out of band.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Settings {
    /// Raw ADC count corresponding to 0 V.
    pub offset_raw: f32,
    /// Raw ADC counts per volt.
    pub units_per_volt: f32,
}

impl Default for Settings {
    fn default() -> Self {
        CalibrationConstants::DEFAULT.into()
    }
}

impl From<CalibrationConstants> for Settings {
    fn from(c: CalibrationConstants) -> Self {
        Self {
            offset_raw: c.offset_raw as f32,
            units_per_volt: c.units_per_volt as f32,
        }
    }
}

impl From<Settings> for CalibrationConstants {
    fn from(s: Settings) -> Self {
        Self {
            offset_raw: libm::roundf(s.offset_raw) as u16,
            units_per_volt: libm::roundf(s.units_per_volt) as u16,
        }
    }
}

/// Raw readings taken at the three reference voltages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceReadings {
    /// Raw count at 1 V.
    pub one_volt: f32,
    /// Raw count at 2 V (averaged).
    pub two_volts: f32,
    /// Raw count at 3 V (averaged).
    pub three_volts: f32,
}

impl ReferenceReadings {
    /// Estimate calibration constants from the three readings.
    ///
    /// ```rust
    /// use acidus_core::calibration::ReferenceReadings;
    ///
    /// let readings = ReferenceReadings { one_volt: 1000.0, two_volts: 800.0, three_volts: 600.0 };
    /// let c = readings.estimate();
    /// assert_eq!(c.units_per_volt, 200);
    /// assert_eq!(c.offset_raw, 1200);
    /// ```
    pub fn estimate(&self) -> CalibrationConstants {
        let first = self.one_volt - self.two_volts;
        let second = self.two_volts - self.three_volts;
        let per_volt = (first + second) / 2.0;

        CalibrationConstants {
            offset_raw: (self.one_volt + per_volt) as u16,
            units_per_volt: libm::roundf(per_volt) as u16,
        }
    }
}

/// Mean of `count` successive reads. Returns 0 when `count` is 0.
pub fn mean_reading(count: usize, mut read: impl FnMut() -> u16) -> f32 {
    if count == 0 {
        return 0.0;
    }
    let total: f32 = (0..count).map(|_| f32::from(read())).sum();
    total / count as f32
}

/// Operator-facing steps of the guided calibration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CalibrationStep {
    /// Waiting for the entry button to be let go.
    #[default]
    ReleaseButton,
    /// Apply 1 V and press the button.
    OneVolt,
    /// Apply 2 V and press the button.
    TwoVolts,
    /// Apply 3 V and press the button.
    ThreeVolts,
    /// Constants have been estimated.
    Done,
}

impl CalibrationStep {
    /// Number of raw reads averaged at this step; 0 for non-sampling steps.
    pub const fn reads(self) -> usize {
        match self {
            Self::OneVolt => 1,
            Self::TwoVolts | Self::ThreeVolts => AVERAGED_READS,
            Self::ReleaseButton | Self::Done => 0,
        }
    }

    /// Reference voltage applied at this step, if any.
    pub const fn reference_volts(self) -> Option<u8> {
        match self {
            Self::OneVolt => Some(1),
            Self::TwoVolts => Some(2),
            Self::ThreeVolts => Some(3),
            Self::ReleaseButton | Self::Done => None,
        }
    }
}

/// Event-driven calibration state machine.
///
/// The platform layer owns the blocking button waits and ADC reads; this
/// type only sequences the steps and does the estimation.
///
/// ```rust
/// use acidus_core::calibration::{Calibrator, CalibrationStep};
///
/// let mut cal = Calibrator::new();
/// cal.button_released();
/// assert_eq!(cal.record(1000.0), None);
/// assert_eq!(cal.record(800.0), None);
/// let constants = cal.record(600.0).unwrap();
/// assert_eq!(constants.units_per_volt, 200);
/// assert_eq!(cal.step(), CalibrationStep::Done);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Calibrator {
    step: CalibrationStep,
    one_volt: f32,
    two_volts: f32,
}

impl Calibrator {
    /// Start at [`CalibrationStep::ReleaseButton`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Current step.
    pub fn step(&self) -> CalibrationStep {
        self.step
    }

    /// The entry button has been released; begin sampling references.
    pub fn button_released(&mut self) {
        if self.step == CalibrationStep::ReleaseButton {
            self.step = CalibrationStep::OneVolt;
        }
    }

    /// Record the (averaged) reading for the current step.
    ///
    /// Returns the estimated constants after the 3 V reading. Readings
    /// outside a sampling step are ignored.
    pub fn record(&mut self, reading: f32) -> Option<CalibrationConstants> {
        match self.step {
            CalibrationStep::OneVolt => {
                self.one_volt = reading;
                self.step = CalibrationStep::TwoVolts;
                None
            }
            CalibrationStep::TwoVolts => {
                self.two_volts = reading;
                self.step = CalibrationStep::ThreeVolts;
                None
            }
            CalibrationStep::ThreeVolts => {
                self.step = CalibrationStep::Done;
                let constants = ReferenceReadings {
                    one_volt: self.one_volt,
                    two_volts: self.two_volts,
                    three_volts: reading,
                }
                .estimate();

                #[cfg(feature = "tracing")]
                tracing::info!(
                    offset = constants.offset_raw,
                    units_per_volt = constants.units_per_volt,
                    "calibration estimated"
                );

                Some(constants)
            }
            CalibrationStep::ReleaseButton | CalibrationStep::Done => None,
        }
    }
}
