//! The synthesis backend consumed by the audio engine.
//!
//! [`VoiceEngine`] is the seam to whatever renders the waveform (a 303
//! filter model on hardware, a test double on the host). The engine feeds
//! it discrete note calls plus one envelope sample per audio frame.
//!
//! [`BasicVoice`] is a small blended saw/square oscillator with glide,
//! enough to hear and inspect the envelope and trigger behavior.

use libm::{exp2f, expf};

use crate::personality::VoiceParams;
use crate::pitch::ACCENT_VELOCITY;

/// A monophonic synthesis voice.
///
/// Note calls follow MIDI conventions: a note-on with velocity 0 is a
/// note-off.
pub trait VoiceEngine {
    /// Start `note` with a new envelope cycle.
    fn note_on(&mut self, note: u8, velocity: u8);

    /// Release `note`.
    fn note_off(&mut self, note: u8) {
        self.note_on(note, 0);
    }

    /// Glide to `note`. The envelope is retriggered from its current level.
    fn note_on_portamento(&mut self, note: u8, velocity: u8);

    /// Release everything that is sounding.
    fn all_notes_off(&mut self);

    /// Glide time used by subsequent portamento notes.
    fn set_slide_time(&mut self, slide_ms: f32);

    /// Apply continuous parameters. Called only when they change.
    fn set_params(&mut self, params: &VoiceParams);

    /// Render one sample shaped by `envelope`.
    fn render(&mut self, envelope: f32) -> f32;
}

/// MIDI note to frequency in Hz (A4 = 440 Hz).
#[inline]
pub fn note_to_hz(note: u8) -> f32 {
    440.0 * exp2f((f32::from(note) - 69.0) / 12.0)
}

const GATE_SMOOTHING_MS: f32 = 2.0;
const OUTPUT_GAIN: f32 = 0.5;

/// Blended saw/square oscillator with glide and a declicked gate.
#[derive(Debug, Clone)]
pub struct BasicVoice {
    sample_rate: f32,
    phase: f32,
    freq: f32,
    target_freq: f32,
    glide_coeff: f32,
    gate_coeff: f32,
    gate: bool,
    level: f32,
    note: Option<u8>,
    accented: bool,
    params: VoiceParams,
}

impl BasicVoice {
    /// Create a silent voice.
    pub fn new(sample_rate: f32) -> Self {
        let mut voice = Self {
            sample_rate,
            phase: 0.0,
            freq: note_to_hz(36),
            target_freq: note_to_hz(36),
            glide_coeff: 1.0,
            gate_coeff: 1.0,
            gate: false,
            level: 0.0,
            note: None,
            accented: false,
            params: VoiceParams::DEFAULT,
        };
        voice.gate_coeff = one_pole_coeff(GATE_SMOOTHING_MS, sample_rate);
        voice.set_slide_time(60.0);
        voice
    }

    /// Currently held note.
    pub fn note(&self) -> Option<u8> {
        self.note
    }

    /// Instantaneous oscillator frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.freq
    }

    /// Frequency the glide is heading to.
    pub fn target_frequency(&self) -> f32 {
        self.target_freq
    }

    /// True while a note is held.
    pub fn is_gated(&self) -> bool {
        self.gate
    }

    fn start(&mut self, note: u8, velocity: u8) {
        self.note = Some(note);
        self.gate = true;
        self.accented = velocity >= ACCENT_VELOCITY;
        self.target_freq = note_to_hz(note);
    }
}

fn one_pole_coeff(time_ms: f32, sample_rate: f32) -> f32 {
    let samples = time_ms * 0.001 * sample_rate;
    if samples <= 1.0 {
        1.0
    } else {
        1.0 - expf(-1.0 / samples)
    }
}

impl VoiceEngine for BasicVoice {
    fn note_on(&mut self, note: u8, velocity: u8) {
        if velocity == 0 {
            if self.note == Some(note) {
                self.gate = false;
                self.note = None;
            }
            return;
        }
        self.start(note, velocity);
        self.freq = self.target_freq;
    }

    fn note_on_portamento(&mut self, note: u8, velocity: u8) {
        if velocity == 0 {
            self.note_on(note, 0);
            return;
        }
        self.start(note, velocity);
    }

    fn all_notes_off(&mut self) {
        self.gate = false;
        self.note = None;
    }

    fn set_slide_time(&mut self, slide_ms: f32) {
        self.glide_coeff = one_pole_coeff(slide_ms, self.sample_rate);
    }

    fn set_params(&mut self, params: &VoiceParams) {
        self.params = *params;
    }

    fn render(&mut self, envelope: f32) -> f32 {
        self.freq += self.glide_coeff * (self.target_freq - self.freq);
        self.phase += self.freq / self.sample_rate;
        self.phase -= libm::floorf(self.phase);

        let saw = 2.0 * self.phase - 1.0;
        let square = if self.phase < 0.5 { 1.0 } else { -1.0 };
        let blend = self.params.waveform;
        let osc = saw * (1.0 - blend) + square * blend;

        let gate_target = if self.gate { 1.0 } else { 0.0 };
        self.level += self.gate_coeff * (gate_target - self.level);

        let accent = if self.accented {
            1.0 + self.params.accent * 0.01
        } else {
            1.0
        };
        osc * self.level * envelope * accent * OUTPUT_GAIN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_to_hz() {
        assert!((note_to_hz(69) - 440.0).abs() < 1e-3);
        assert!((note_to_hz(57) - 220.0).abs() < 1e-3);
        assert!((note_to_hz(81) - 880.0).abs() < 1e-2);
    }

    #[test]
    fn test_zero_velocity_releases() {
        let mut v = BasicVoice::new(48000.0);
        v.note_on(48, 100);
        assert_eq!(v.note(), Some(48));
        v.note_off(48);
        assert_eq!(v.note(), None);
        assert!(!v.is_gated());
    }

    #[test]
    fn test_note_off_for_other_note_is_ignored() {
        let mut v = BasicVoice::new(48000.0);
        v.note_on(48, 100);
        v.note_off(50);
        assert_eq!(v.note(), Some(48));
    }

    #[test]
    fn test_hard_note_jumps_pitch() {
        let mut v = BasicVoice::new(48000.0);
        v.note_on(69, 100);
        assert_eq!(v.frequency(), v.target_frequency());
    }

    #[test]
    fn test_portamento_glides() {
        let mut v = BasicVoice::new(48000.0);
        v.note_on(57, 100);
        v.set_slide_time(100.0);
        v.note_on_portamento(69, 100);
        assert!((v.frequency() - 220.0).abs() < 1e-3);

        v.render(1.0);
        let f1 = v.frequency();
        assert!(f1 > 220.0 && f1 < 440.0);
        for _ in 0..48000 {
            v.render(1.0);
        }
        assert!((v.frequency() - 440.0).abs() < 0.1);
    }

    #[test]
    fn test_silent_until_gated() {
        let mut v = BasicVoice::new(48000.0);
        for _ in 0..64 {
            assert_eq!(v.render(1.0), 0.0);
        }
        v.note_on(48, 100);
        let energy: f32 = (0..512).map(|_| v.render(1.0).abs()).sum();
        assert!(energy > 0.0);
    }

    #[test]
    fn test_output_bounded() {
        let mut v = BasicVoice::new(48000.0);
        v.set_params(&VoiceParams {
            accent: 100.0,
            waveform: 0.5,
            ..VoiceParams::DEFAULT
        });
        v.note_on(40, ACCENT_VELOCITY);
        for _ in 0..4800 {
            let s = v.render(1.0);
            assert!(s.is_finite());
            assert!(s.abs() <= 1.0 + 1e-6);
        }
    }
}
