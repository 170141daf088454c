//! Pitch and trigger resolution: raw CV sample to a note decision.
//!
//! Runs once per rising trigger edge on the control loop. The raw pitch
//! count is converted to volts through the [`CalibrationConstants`],
//! quantized to a MIDI note at 1 V/octave, and combined with the slide and
//! accent knobs into a [`TriggerDecision`].
//!
//! # Note mapping
//!
//! ```text
//! volts = clamp((offset - raw) / units_per_volt, 0, 5)     // raw <= rest threshold
//! volts = 0                                                // raw >  rest threshold (unpatched)
//! note  = clamp(round(volts * 12 + 12 * (base_octave + 1)),
//!               12 * base_octave, 12 * (base_octave + 6))
//! ```

use crate::calibration::CalibrationConstants;

/// Velocity sent for accented notes.
pub const ACCENT_VELOCITY: u8 = 127;

/// Velocity sent for regular notes.
pub const NORMAL_VELOCITY: u8 = 100;

/// Tunable constants of the resolver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolverConfig {
    /// Octave of 0 V, in MIDI octaves (note = 12 * (base_octave + 1) at 0 V).
    /// Note bounds saturate at 127 for octaves past the MIDI range.
    pub base_octave: u8,
    /// Raw counts above this read as an unpatched jack (0 V).
    pub rest_threshold: u16,
    /// Upper clamp of the converted voltage.
    pub max_volts: f32,
    /// Slide knob values above this enable slide.
    pub slide_threshold: f32,
    /// Slide time at knob 0.0, in milliseconds.
    pub slide_min_ms: f32,
    /// Slide time at knob 1.0, in milliseconds.
    pub slide_max_ms: f32,
    /// Slide time used for non-sliding notes.
    pub default_slide_ms: f32,
    /// Accent knob values above this produce [`ACCENT_VELOCITY`].
    pub accent_threshold: f32,
    /// Settle time between the trigger edge and the pitch read.
    pub settle_ms: u32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            base_octave: 2,
            rest_threshold: 63200,
            max_volts: 5.0,
            slide_threshold: 0.05,
            slide_min_ms: 50.0,
            slide_max_ms: 400.0,
            default_slide_ms: 60.0,
            accent_threshold: 0.9,
            settle_ms: 4,
        }
    }
}

impl ResolverConfig {
    /// Lowest note the resolver emits.
    pub const fn min_note(&self) -> u8 {
        midi_note(12 * self.base_octave as u16)
    }

    /// Highest note the resolver emits.
    pub const fn max_note(&self) -> u8 {
        midi_note(12 * (self.base_octave as u16 + 6))
    }
}

const fn midi_note(n: u16) -> u8 {
    if n > 127 { 127 } else { n as u8 }
}

/// Everything the voice needs to start a note.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerDecision {
    /// MIDI note, clamped to the resolver range.
    pub note: u8,
    /// [`ACCENT_VELOCITY`] or [`NORMAL_VELOCITY`].
    pub velocity: u8,
    /// Glide from the previous pitch and keep the envelope cycle.
    pub is_slide: bool,
    /// Glide time in milliseconds.
    pub slide_time_ms: f32,
}

impl TriggerDecision {
    /// True if this note carries the accent velocity.
    pub fn is_accent(&self) -> bool {
        self.velocity == ACCENT_VELOCITY
    }
}

/// Converts raw pitch samples and knob values into trigger decisions.
///
/// # Example
///
/// ```rust
/// use acidus_core::{CalibrationConstants, PitchResolver, ResolverConfig};
///
/// let resolver = PitchResolver::new(CalibrationConstants::new(1200, 200), ResolverConfig::default());
/// let decision = resolver.resolve(1000, 0.0, 0.5);
/// assert_eq!(decision.note, 48);
/// assert!(!decision.is_slide);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PitchResolver {
    constants: CalibrationConstants,
    config: ResolverConfig,
}

impl PitchResolver {
    /// Create a resolver for the given calibration.
    pub fn new(constants: CalibrationConstants, config: ResolverConfig) -> Self {
        Self { constants, config }
    }

    /// Calibration in use.
    pub fn constants(&self) -> CalibrationConstants {
        self.constants
    }

    /// Replace the calibration (after a calibration run).
    pub fn set_constants(&mut self, constants: CalibrationConstants) {
        self.constants = constants;
    }

    /// Resolver configuration.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Convert a raw count to volts in `[0, max_volts]`.
    pub fn volts(&self, raw: u16) -> f32 {
        if raw > self.config.rest_threshold || self.constants.units_per_volt == 0 {
            return 0.0;
        }
        let volts = (f32::from(self.constants.offset_raw) - f32::from(raw))
            / f32::from(self.constants.units_per_volt);
        volts.clamp(0.0, self.config.max_volts)
    }

    /// Quantize a voltage to a clamped MIDI note.
    pub fn note_for_volts(&self, volts: f32) -> u8 {
        let base = 12.0 * (f32::from(self.config.base_octave) + 1.0);
        let note = libm::roundf(volts * 12.0 + base);
        let min = f32::from(self.config.min_note());
        let max = f32::from(self.config.max_note());
        note.clamp(min, max) as u8
    }

    /// Quantize a raw count to a clamped MIDI note.
    pub fn note(&self, raw: u16) -> u8 {
        self.note_for_volts(self.volts(raw))
    }

    /// Slide time for a slide knob value, or `None` when slide is off.
    pub fn slide_time(&self, slide: f32) -> Option<f32> {
        if slide > self.config.slide_threshold {
            let t = slide.clamp(0.0, 1.0);
            Some(self.config.slide_min_ms + t * (self.config.slide_max_ms - self.config.slide_min_ms))
        } else {
            None
        }
    }

    /// Velocity for an accent knob value.
    pub fn velocity(&self, accent: f32) -> u8 {
        if accent > self.config.accent_threshold {
            ACCENT_VELOCITY
        } else {
            NORMAL_VELOCITY
        }
    }

    /// Resolve a trigger from a settled raw pitch sample and the knobs.
    pub fn resolve(&self, raw: u16, slide: f32, accent: f32) -> TriggerDecision {
        let slide_time = self.slide_time(slide);
        let decision = TriggerDecision {
            note: self.note(raw),
            velocity: self.velocity(accent),
            is_slide: slide_time.is_some(),
            slide_time_ms: slide_time.unwrap_or(self.config.default_slide_ms),
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            raw,
            note = decision.note,
            velocity = decision.velocity,
            slide = decision.is_slide,
            slide_ms = decision.slide_time_ms,
            "trigger resolved"
        );

        decision
    }
}
