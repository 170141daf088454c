//! Acidus Core - real-time parameter pipeline for a 303-style bass voice
//!
//! This crate holds everything between the panel and the synthesis voice
//! that has to run on the module itself. It is `no_std` compatible; disable
//! the default `std` feature for embedded targets.
//!
//! # Components
//!
//! ## Envelope
//!
//! - [`DecayEnvelope`] - two-phase (attack/decay) RC-style envelope whose
//!   output is continuous across retriggers
//!
//! ```rust
//! use acidus_core::DecayEnvelope;
//!
//! let mut env = DecayEnvelope::new(48000.0);
//! env.set_decay_time_constant(200.0);
//! env.trigger();
//! let level = env.advance();
//! assert!(level > 0.99);
//! ```
//!
//! ## Calibration
//!
//! - [`CalibrationConstants`] - linear raw-count-to-volt mapping with a
//!   validity band
//! - [`Calibrator`] / [`ReferenceReadings`] - three-point estimate
//! - [`Settings`] - the persisted record
//!
//! ## Pitch and triggers
//!
//! - [`PitchResolver`] - raw CV to clamped MIDI note, slide and accent
//!   decisions
//!
//! ## Cross-rate handoff
//!
//! - [`Bridge`] - split into a [`ControlSide`] writer and an [`AudioSide`]
//!   reader; atomics for continuous parameters, an SPSC queue for notes
//! - [`AudioEngine`] - drains the bridge once per block and drives a
//!   [`VoiceEngine`]
//!
//! ## Personalities
//!
//! - [`Personality`] - selects one of three constant knob range tables
//!
//! # Features
//!
//! - `std` (default): standard library support
//! - `tracing`: debug/info events from the control-rate paths
//! - `serde`: `Serialize`/`Deserialize` for [`Settings`]

#![cfg_attr(not(feature = "std"), no_std)]

pub mod audio;
pub mod bridge;
pub mod calibration;
pub mod envelope;
pub mod personality;
pub mod pitch;
pub mod voice;

// Re-export main types at crate root
pub use audio::AudioEngine;
pub use bridge::{AudioSide, Bridge, ControlSide, EVENT_QUEUE_LEN, NoteEvent, ParameterFrame};
pub use calibration::{
    AVERAGED_READS, CalibrationConstants, CalibrationStep, Calibrator, MAX_UNITS_PER_VOLT,
    MIN_UNITS_PER_VOLT, ReferenceReadings, Settings, mean_reading,
};
pub use envelope::{DecayEnvelope, EnvelopePhase};
pub use personality::{KnobFrame, KnobRange, Personality, PersonalityTable, VoiceParams};
pub use pitch::{
    ACCENT_VELOCITY, NORMAL_VELOCITY, PitchResolver, ResolverConfig, TriggerDecision,
};
pub use voice::{BasicVoice, VoiceEngine, note_to_hz};
