//! The cooperative control loop: panel in, bridge out.
//!
//! Each [`ControlLoop::poll`] reads the panel once, publishes the
//! personality-mapped voice parameters, and turns gate/tap edges into note
//! events. The settle delay before a pitch read blocks this loop only.

use acidus_core::{
    CalibrationStep, ControlSide, KnobFrame, NoteEvent, Personality, PitchResolver,
    ResolverConfig, VoiceParams,
};

use crate::boot::{boot, should_enter_calibration};
use crate::calibration::run_calibration;
use crate::edge::{TriggerAction, TriggerInputs};
use crate::panel::{Knob, PanelInputs, Switch};
use crate::store::SettingsStore;

/// Note held before the first trigger.
pub const INITIAL_NOTE: u8 = 60;

/// Control-rate half of the firmware.
pub struct ControlLoop<'a, P> {
    panel: P,
    resolver: PitchResolver,
    control: ControlSide<'a>,
    triggers: TriggerInputs,
    personality: Personality,
    active_note: u8,
    params: VoiceParams,
}

impl<'a, P: PanelInputs> ControlLoop<'a, P> {
    /// Wrap an already-booted panel.
    pub fn new(panel: P, resolver: PitchResolver, control: ControlSide<'a>) -> Self {
        Self {
            panel,
            resolver,
            control,
            triggers: TriggerInputs::new(),
            personality: Personality::default(),
            active_note: INITIAL_NOTE,
            params: VoiceParams::DEFAULT,
        }
    }

    /// Boot sequence: load calibration (with corruption recovery), then run
    /// the guided calibration if the entry gesture is held.
    pub fn start<S: SettingsStore + ?Sized>(
        mut panel: P,
        store: &mut S,
        config: ResolverConfig,
        control: ControlSide<'a>,
        on_step: impl FnMut(CalibrationStep),
    ) -> Self {
        let mut constants = boot(store);
        panel.poll();
        if should_enter_calibration(&panel) {
            #[cfg(feature = "tracing")]
            tracing::info!("calibration gesture held, entering calibration");
            constants = run_calibration(&mut panel, store, on_step);
        }
        Self::new(panel, PitchResolver::new(constants, config), control)
    }

    /// One iteration. Returns the note events published, gate first.
    pub fn poll(&mut self) -> [Option<NoteEvent>; 2] {
        self.panel.poll();
        self.update_params();

        let actions = self
            .triggers
            .update(self.panel.gate(), self.panel.tap_pressed());
        let mut events = [None; 2];
        for (slot, action) in events.iter_mut().zip(actions) {
            *slot = match action {
                Some(TriggerAction::NoteOn) => Some(self.trigger()),
                Some(TriggerAction::NoteOff) => Some(self.release()),
                None => None,
            };
        }
        events
    }

    fn update_params(&mut self) {
        let personality = self.panel.switch(Switch::Personality).personality();
        if personality != self.personality {
            #[cfg(feature = "tracing")]
            tracing::debug!(personality = personality.name(), "personality changed");
            self.personality = personality;
        }

        let knobs = KnobFrame {
            decay: self.panel.knob(Knob::Decay),
            cutoff: self.panel.knob(Knob::Cutoff),
            resonance: self.panel.knob(Knob::Resonance),
            env_mod: self.panel.knob(Knob::EnvMod),
            accent: self.panel.knob(Knob::Accent),
        };
        let waveform = self.panel.switch(Switch::Waveform).value();
        self.params = self.personality.table().apply(&knobs, waveform);
        self.control.publish(&self.params);
    }

    fn trigger(&mut self) -> NoteEvent {
        self.panel.delay_ms(self.resolver.config().settle_ms);
        self.panel.poll();
        let raw = self.panel.raw_pitch_cv();
        let decision = self.resolver.resolve(
            raw,
            self.panel.knob(Knob::Slide),
            self.panel.knob(Knob::Accent),
        );
        self.active_note = decision.note;
        let event = NoteEvent::On(decision);
        self.control.push(event);
        event
    }

    fn release(&mut self) -> NoteEvent {
        #[cfg(feature = "tracing")]
        tracing::debug!(note = self.active_note, "note off");
        let event = NoteEvent::Off {
            note: self.active_note,
        };
        self.control.push(event);
        event
    }

    /// True while the gate or the tap button is held.
    pub fn gate_active(&self) -> bool {
        self.triggers.is_active()
    }

    /// Personality selected on the last poll.
    pub fn personality(&self) -> Personality {
        self.personality
    }

    /// Parameters published on the last poll.
    pub fn params(&self) -> &VoiceParams {
        &self.params
    }

    /// Note of the last trigger.
    pub fn active_note(&self) -> u8 {
        self.active_note
    }

    /// Resolver in use.
    pub fn resolver(&self) -> &PitchResolver {
        &self.resolver
    }

    /// Events dropped because the audio side fell behind.
    pub fn dropped_events(&self) -> u32 {
        self.control.dropped_events()
    }

    /// The panel.
    pub fn panel(&self) -> &P {
        &self.panel
    }

    /// Mutable access to the panel.
    pub fn panel_mut(&mut self) -> &mut P {
        &mut self.panel
    }
}
