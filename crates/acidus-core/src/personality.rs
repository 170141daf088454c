//! Panel personalities: knob-to-parameter range tables.
//!
//! Each [`Personality`] selects one constant [`PersonalityTable`] of affine
//! knob mappings (`value = knob * scale + offset`). The mapping code is
//! shared; only the table differs.
//!
//! | Parameter    | Babyfish       | Normal        | Devilfish      |
//! |--------------|----------------|---------------|----------------|
//! | decay ms     | 1000x + 200    | 1800x + 200   | 3000x + 30     |
//! | accent decay | 1000x + 200    | 200 (fixed)   | 3000x + 30     |
//! | resonance %  | 80x + 10       | 90x           | 100x           |
//! | cutoff Hz    | 4000x          | 5000x         | 10000x         |
//! | accent %     | 40x            | 50x           | 100x           |
//! | env mod %    | 80x + 10       | 100x          | 100x           |

/// One affine knob mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnobRange {
    /// Multiplier applied to the normalized knob.
    pub scale: f32,
    /// Value at knob 0.0.
    pub offset: f32,
}

impl KnobRange {
    /// Range `offset..offset + scale`.
    pub const fn new(scale: f32, offset: f32) -> Self {
        Self { scale, offset }
    }

    /// A range that ignores the knob.
    pub const fn fixed(value: f32) -> Self {
        Self::new(0.0, value)
    }

    /// Map a normalized knob value (clamped to 0..1).
    #[inline]
    pub fn map(&self, knob: f32) -> f32 {
        knob.clamp(0.0, 1.0) * self.scale + self.offset
    }
}

/// Knob mappings of one personality.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PersonalityTable {
    /// Filter envelope decay time constant (ms).
    pub decay: KnobRange,
    /// Decay used for accented notes (ms).
    pub accent_decay: KnobRange,
    /// Filter resonance (percent).
    pub resonance: KnobRange,
    /// Filter cutoff (Hz).
    pub cutoff: KnobRange,
    /// Accent depth (percent).
    pub accent: KnobRange,
    /// Envelope-to-cutoff modulation depth (percent).
    pub env_mod: KnobRange,
}

const BABYFISH: PersonalityTable = PersonalityTable {
    decay: KnobRange::new(1000.0, 200.0),
    accent_decay: KnobRange::new(1000.0, 200.0),
    resonance: KnobRange::new(80.0, 10.0),
    cutoff: KnobRange::new(4000.0, 0.0),
    accent: KnobRange::new(40.0, 0.0),
    env_mod: KnobRange::new(80.0, 10.0),
};

const NORMAL: PersonalityTable = PersonalityTable {
    decay: KnobRange::new(1800.0, 200.0),
    accent_decay: KnobRange::fixed(200.0),
    resonance: KnobRange::new(90.0, 0.0),
    cutoff: KnobRange::new(5000.0, 0.0),
    accent: KnobRange::new(50.0, 0.0),
    env_mod: KnobRange::new(100.0, 0.0),
};

const DEVILFISH: PersonalityTable = PersonalityTable {
    decay: KnobRange::new(3000.0, 30.0),
    accent_decay: KnobRange::new(3000.0, 30.0),
    resonance: KnobRange::new(100.0, 0.0),
    cutoff: KnobRange::new(10000.0, 0.0),
    accent: KnobRange::new(100.0, 0.0),
    env_mod: KnobRange::new(100.0, 0.0),
};

/// Panel personality, selected by a three-position switch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Personality {
    /// Tamed ranges; the decay knob also sets accent decay.
    #[default]
    Babyfish,
    /// Stock behavior; accent decay is fixed.
    Normal,
    /// Wide ranges; the decay knob also sets accent decay.
    Devilfish,
}

impl Personality {
    /// All personalities in switch order (left, center, right).
    pub const ALL: [Personality; 3] = [Self::Babyfish, Self::Normal, Self::Devilfish];

    /// Range table of this personality.
    pub const fn table(self) -> &'static PersonalityTable {
        match self {
            Self::Babyfish => &BABYFISH,
            Self::Normal => &NORMAL,
            Self::Devilfish => &DEVILFISH,
        }
    }

    /// Display name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Babyfish => "babyfish",
            Self::Normal => "normal",
            Self::Devilfish => "devilfish",
        }
    }
}

/// Normalized positions of the sound-shaping knobs.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KnobFrame {
    /// Decay knob.
    pub decay: f32,
    /// Cutoff knob.
    pub cutoff: f32,
    /// Resonance knob.
    pub resonance: f32,
    /// Envelope modulation knob.
    pub env_mod: f32,
    /// Accent knob.
    pub accent: f32,
}

/// Continuous voice parameters published to the audio callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceParams {
    /// Filter cutoff in Hz.
    pub cutoff_hz: f32,
    /// Resonance in percent.
    pub resonance: f32,
    /// Envelope modulation depth in percent.
    pub env_mod: f32,
    /// Accent depth in percent.
    pub accent: f32,
    /// Decay time constant in milliseconds.
    pub decay_ms: f32,
    /// Accented-note decay time constant in milliseconds.
    pub accent_decay_ms: f32,
    /// Oscillator blend, 0.0 saw to 1.0 square.
    pub waveform: f32,
}

impl VoiceParams {
    /// Parameters of the default personality with every knob at zero.
    pub const DEFAULT: Self = Self {
        cutoff_hz: 0.0,
        resonance: 10.0,
        env_mod: 10.0,
        accent: 0.0,
        decay_ms: 200.0,
        accent_decay_ms: 200.0,
        waveform: 0.0,
    };
}

impl Default for VoiceParams {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl PersonalityTable {
    /// Map a knob frame and waveform blend to voice parameters.
    pub fn apply(&self, knobs: &KnobFrame, waveform: f32) -> VoiceParams {
        VoiceParams {
            cutoff_hz: self.cutoff.map(knobs.cutoff),
            resonance: self.resonance.map(knobs.resonance),
            env_mod: self.env_mod.map(knobs.env_mod),
            accent: self.accent.map(knobs.accent),
            decay_ms: self.decay.map(knobs.decay),
            accent_decay_ms: self.accent_decay.map(knobs.decay),
            waveform: waveform.clamp(0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn knobs(v: f32) -> KnobFrame {
        KnobFrame {
            decay: v,
            cutoff: v,
            resonance: v,
            env_mod: v,
            accent: v,
        }
    }

    #[test]
    fn test_knob_range_map() {
        let r = KnobRange::new(1000.0, 200.0);
        assert_eq!(r.map(0.0), 200.0);
        assert_eq!(r.map(1.0), 1200.0);
        assert_eq!(r.map(0.5), 700.0);
        // Out-of-range knobs clamp.
        assert_eq!(r.map(-1.0), 200.0);
        assert_eq!(r.map(2.0), 1200.0);
        assert_eq!(KnobRange::fixed(200.0).map(0.7), 200.0);
    }

    #[test]
    fn test_babyfish_extremes() {
        let table = Personality::Babyfish.table();
        let lo = table.apply(&knobs(0.0), 0.0);
        assert_eq!(lo.decay_ms, 200.0);
        assert_eq!(lo.accent_decay_ms, 200.0);
        assert_eq!(lo.resonance, 10.0);
        assert_eq!(lo.env_mod, 10.0);
        let hi = table.apply(&knobs(1.0), 0.0);
        assert_eq!(hi.decay_ms, 1200.0);
        assert_eq!(hi.accent_decay_ms, 1200.0);
        assert_eq!(hi.cutoff_hz, 4000.0);
        assert_eq!(hi.accent, 40.0);
    }

    #[test]
    fn test_normal_fixes_accent_decay() {
        let table = Personality::Normal.table();
        for v in [0.0, 0.3, 1.0] {
            assert_eq!(table.apply(&knobs(v), 0.0).accent_decay_ms, 200.0);
        }
        assert_eq!(table.apply(&knobs(1.0), 0.0).decay_ms, 2000.0);
    }

    #[test]
    fn test_devilfish_ranges() {
        let hi = Personality::Devilfish.table().apply(&knobs(1.0), 1.0);
        assert_eq!(hi.decay_ms, 3030.0);
        assert_eq!(hi.accent_decay_ms, 3030.0);
        assert_eq!(hi.cutoff_hz, 10000.0);
        assert_eq!(hi.waveform, 1.0);
        let lo = Personality::Devilfish.table().apply(&knobs(0.0), 0.0);
        assert_eq!(lo.decay_ms, 30.0);
    }

    #[test]
    fn test_switch_order() {
        assert_eq!(Personality::ALL[0], Personality::Babyfish);
        assert_eq!(Personality::ALL[1], Personality::Normal);
        assert_eq!(Personality::ALL[2], Personality::Devilfish);
        assert_eq!(Personality::Devilfish.name(), "devilfish");
    }

    #[test]
    fn test_default_params_match_default_table() {
        let mapped = Personality::default()
            .table()
            .apply(&KnobFrame::default(), 0.0);
        assert_eq!(VoiceParams::default(), mapped);
    }
}
