//! Simulator scenarios: a timeline of panel states in TOML.
//!
//! ```toml
//! duration_ms = 2000.0
//!
//! [calibration]
//! offset_raw = 1200.0
//! units_per_volt = 200.0
//!
//! [panel]
//! decay = 0.4
//! cutoff = 0.6
//! personality = "devilfish"
//!
//! [[step]]
//! at_ms = 0.0
//! gate = true
//! volts = 1.0
//!
//! [[step]]
//! at_ms = 250.0
//! gate = false
//! ```
//!
//! Each step overrides only the fields it names; everything else carries
//! over from the previous state. `volts` is converted to a raw count with
//! the scenario's calibration.

use std::path::Path;

use acidus_core::{CalibrationConstants, Settings};
use acidus_platform::SwitchPosition;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Toggle position as written in scenario files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwitchSetting {
    /// Left position.
    #[default]
    Left,
    /// Center position.
    Center,
    /// Right position.
    Right,
}

impl From<SwitchSetting> for SwitchPosition {
    fn from(s: SwitchSetting) -> Self {
        match s {
            SwitchSetting::Left => SwitchPosition::Left,
            SwitchSetting::Center => SwitchPosition::Center,
            SwitchSetting::Right => SwitchPosition::Right,
        }
    }
}

/// Personality switch, by name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonalitySetting {
    /// Left position.
    #[default]
    Babyfish,
    /// Center position.
    Normal,
    /// Right position.
    Devilfish,
}

impl From<PersonalitySetting> for SwitchPosition {
    fn from(p: PersonalitySetting) -> Self {
        match p {
            PersonalitySetting::Babyfish => SwitchPosition::Left,
            PersonalitySetting::Normal => SwitchPosition::Center,
            PersonalitySetting::Devilfish => SwitchPosition::Right,
        }
    }
}

/// Complete panel state at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelState {
    /// Decay knob.
    pub decay: f32,
    /// Cutoff knob.
    pub cutoff: f32,
    /// Slide knob.
    pub slide: f32,
    /// Resonance knob.
    pub resonance: f32,
    /// Envelope modulation knob.
    pub env_mod: f32,
    /// Accent knob.
    pub accent: f32,
    /// Raw pitch CV count.
    pub raw_cv: u16,
    /// Gate jack.
    pub gate: bool,
    /// Tap button.
    pub tap: bool,
    /// Waveform switch.
    pub waveform: SwitchSetting,
    /// Personality switch.
    pub personality: PersonalitySetting,
}

impl Default for PanelState {
    fn default() -> Self {
        Self {
            decay: 0.5,
            cutoff: 0.5,
            slide: 0.0,
            resonance: 0.5,
            env_mod: 0.5,
            accent: 0.5,
            raw_cv: u16::MAX,
            gate: false,
            tap: false,
            waveform: SwitchSetting::Left,
            personality: PersonalitySetting::Babyfish,
        }
    }
}

/// Changes applied at `at_ms`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioStep {
    /// Time of the change in milliseconds from the start.
    pub at_ms: f32,
    /// Decay knob.
    pub decay: Option<f32>,
    /// Cutoff knob.
    pub cutoff: Option<f32>,
    /// Slide knob.
    pub slide: Option<f32>,
    /// Resonance knob.
    pub resonance: Option<f32>,
    /// Envelope modulation knob.
    pub env_mod: Option<f32>,
    /// Accent knob.
    pub accent: Option<f32>,
    /// Pitch CV in volts.
    pub volts: Option<f32>,
    /// Pitch CV as a raw count; wins over `volts`.
    pub raw_cv: Option<u16>,
    /// Gate jack.
    pub gate: Option<bool>,
    /// Tap button.
    pub tap: Option<bool>,
    /// Waveform switch.
    pub waveform: Option<SwitchSetting>,
    /// Personality switch.
    pub personality: Option<PersonalitySetting>,
}

/// A simulator scenario.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Total rendered length; defaults to one second past the last step.
    pub duration_ms: Option<f32>,
    /// Calibration used to read the CV; defaults to the factory values.
    pub calibration: Option<Settings>,
    /// State before the first step.
    #[serde(default)]
    pub panel: PanelState,
    /// Timeline, in non-decreasing `at_ms` order.
    #[serde(default, rename = "step")]
    pub steps: Vec<ScenarioStep>,
}

const TAIL_MS: f32 = 1000.0;

impl Scenario {
    /// Load and validate a scenario file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse and validate a scenario.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let scenario: Scenario = toml::from_str(toml_str)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check timing and knob ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut last = 0.0f32;
        for (i, step) in self.steps.iter().enumerate() {
            if !step.at_ms.is_finite() || step.at_ms < last {
                return Err(ConfigError::InvalidScenario(format!(
                    "step {i} at {} ms is before the previous step",
                    step.at_ms
                )));
            }
            last = step.at_ms;
            for (name, value) in step.knobs() {
                check_knob(name, value, i)?;
            }
        }
        if let Some(d) = self.duration_ms
            && !(d.is_finite() && d > 0.0)
        {
            return Err(ConfigError::InvalidScenario(format!(
                "duration_ms must be positive, got {d}"
            )));
        }
        Ok(())
    }

    /// Calibration used to convert `volts`.
    pub fn constants(&self) -> CalibrationConstants {
        self.calibration
            .map(CalibrationConstants::from)
            .unwrap_or_default()
    }

    /// Rendered length in milliseconds.
    pub fn duration_ms(&self) -> f32 {
        self.duration_ms.unwrap_or_else(|| {
            self.steps.last().map_or(0.0, |s| s.at_ms) + TAIL_MS
        })
    }

    /// Panel state in effect at `time_ms`.
    pub fn panel_at(&self, time_ms: f32) -> PanelState {
        let constants = self.constants();
        let mut state = self.panel;
        for step in self.steps.iter().take_while(|s| s.at_ms <= time_ms) {
            step.apply(&mut state, constants);
        }
        state
    }
}

impl ScenarioStep {
    fn knobs(&self) -> impl Iterator<Item = (&'static str, f32)> + '_ {
        [
            ("decay", self.decay),
            ("cutoff", self.cutoff),
            ("slide", self.slide),
            ("resonance", self.resonance),
            ("env_mod", self.env_mod),
            ("accent", self.accent),
        ]
        .into_iter()
        .filter_map(|(name, v)| v.map(|v| (name, v)))
    }

    fn apply(&self, state: &mut PanelState, constants: CalibrationConstants) {
        macro_rules! carry {
            ($($field:ident),*) => {
                $(if let Some(v) = self.$field { state.$field = v; })*
            };
        }
        carry!(decay, cutoff, slide, resonance, env_mod, accent, gate, tap, waveform, personality);

        if let Some(raw) = self.raw_cv {
            state.raw_cv = raw;
        } else if let Some(volts) = self.volts {
            state.raw_cv = volts_to_raw(volts, constants);
        }
    }
}

/// Raw count that reads as `volts` under `constants`.
pub fn volts_to_raw(volts: f32, constants: CalibrationConstants) -> u16 {
    let raw = f32::from(constants.offset_raw) - volts * f32::from(constants.units_per_volt);
    raw.round().clamp(0.0, f32::from(u16::MAX)) as u16
}

fn check_knob(name: &str, value: f32, step: usize) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidScenario(format!(
            "step {step}: {name} = {value} is outside [0, 1]"
        )))
    }
}
