//! Panel inputs: knobs, switches, gate jack, tap button and pitch CV.

use acidus_core::Personality;

/// Position of a three-way toggle switch.
///
/// Normalized values follow the usual toggle convention: 0.0 left,
/// 0.5 center, 1.0 right.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SwitchPosition {
    /// Left (0.0).
    #[default]
    Left,
    /// Center (0.5).
    Center,
    /// Right (1.0).
    Right,
}

impl SwitchPosition {
    /// Nearest position for a normalized value.
    pub fn from_value(value: f32) -> Self {
        if value < 0.25 {
            Self::Left
        } else if value < 0.75 {
            Self::Center
        } else {
            Self::Right
        }
    }

    /// Normalized value of this position.
    pub const fn value(self) -> f32 {
        match self {
            Self::Left => 0.0,
            Self::Center => 0.5,
            Self::Right => 1.0,
        }
    }

    /// Personality selected when this is the personality switch.
    pub const fn personality(self) -> Personality {
        match self {
            Self::Left => Personality::Babyfish,
            Self::Center => Personality::Normal,
            Self::Right => Personality::Devilfish,
        }
    }
}

/// Sound-shaping knobs, in panel order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Knob {
    /// Filter envelope decay.
    Decay,
    /// Filter cutoff.
    Cutoff,
    /// Slide amount; above the threshold notes glide.
    Slide,
    /// Filter resonance.
    Resonance,
    /// Envelope modulation depth.
    EnvMod,
    /// Accent depth; near full travel notes are accented.
    Accent,
}

impl Knob {
    /// All knobs in panel order.
    pub const ALL: [Knob; 6] = [
        Self::Decay,
        Self::Cutoff,
        Self::Slide,
        Self::Resonance,
        Self::EnvMod,
        Self::Accent,
    ];
}

/// The two toggle switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Switch {
    /// Oscillator waveform blend.
    Waveform,
    /// Knob range personality.
    Personality,
}

/// Polled access to the module's panel.
///
/// Implementations cache debounced state in [`poll`](Self::poll); the
/// accessors return that cached state. [`raw_pitch_cv`](Self::raw_pitch_cv)
/// is the exception and performs a fresh conversion on every call, so
/// repeated calls can be averaged.
pub trait PanelInputs {
    /// Sample every input and update debounced state.
    fn poll(&mut self);

    /// Normalized knob position in [0, 1].
    fn knob(&self, knob: Knob) -> f32;

    /// Fresh raw conversion of the pitch CV input.
    fn raw_pitch_cv(&mut self) -> u16;

    /// Gate jack level.
    fn gate(&self) -> bool;

    /// Debounced tap button state.
    fn tap_pressed(&self) -> bool;

    /// Current switch position.
    fn switch(&self, switch: Switch) -> SwitchPosition;

    /// Block the control loop for `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switch_values() {
        assert_eq!(SwitchPosition::Left.value(), 0.0);
        assert_eq!(SwitchPosition::Center.value(), 0.5);
        assert_eq!(SwitchPosition::Right.value(), 1.0);
    }

    #[test]
    fn test_switch_from_value() {
        for pos in [
            SwitchPosition::Left,
            SwitchPosition::Center,
            SwitchPosition::Right,
        ] {
            assert_eq!(SwitchPosition::from_value(pos.value()), pos);
        }
        assert_eq!(SwitchPosition::from_value(0.2), SwitchPosition::Left);
        assert_eq!(SwitchPosition::from_value(0.8), SwitchPosition::Right);
    }

    #[test]
    fn test_switch_personality() {
        assert_eq!(SwitchPosition::Left.personality(), Personality::Babyfish);
        assert_eq!(SwitchPosition::Center.personality(), Personality::Normal);
        assert_eq!(SwitchPosition::Right.personality(), Personality::Devilfish);
    }
}
