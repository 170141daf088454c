//! Block-rate audio engine: the consumer side of the bridge.
//!
//! Once per block the engine snapshots the parameter frame, drains pending
//! note events, then runs one envelope tick and one voice sample per frame.
//! Nothing here blocks, allocates or logs.

use crate::bridge::{AudioSide, NoteEvent};
use crate::envelope::DecayEnvelope;
use crate::personality::VoiceParams;
use crate::pitch::TriggerDecision;
use crate::voice::VoiceEngine;

/// Owns the envelope and drives a [`VoiceEngine`].
///
/// # Example
///
/// ```rust
/// use acidus_core::{AudioEngine, Bridge, NoteEvent, BasicVoice, TriggerDecision};
///
/// let mut bridge = Bridge::new();
/// let (mut control, mut audio) = bridge.split();
/// let mut engine = AudioEngine::new(BasicVoice::new(48000.0), 48000.0);
///
/// control.push(NoteEvent::On(TriggerDecision {
///     note: 48,
///     velocity: 100,
///     is_slide: false,
///     slide_time_ms: 60.0,
/// }));
///
/// let mut block = [0.0f32; 48];
/// engine.process_block(&mut audio, &mut block);
/// assert!(engine.envelope().output() > 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct AudioEngine<V> {
    envelope: DecayEnvelope,
    voice: V,
    params: VoiceParams,
    accented: bool,
}

impl<V: VoiceEngine> AudioEngine<V> {
    /// Create an engine at `sample_rate` with default parameters.
    pub fn new(mut voice: V, sample_rate: f32) -> Self {
        let params = VoiceParams::DEFAULT;
        voice.set_params(&params);
        let mut envelope = DecayEnvelope::new(sample_rate);
        envelope.set_decay_time_constant(params.decay_ms);
        Self {
            envelope,
            voice,
            params,
            accented: false,
        }
    }

    /// The envelope generator.
    pub fn envelope(&self) -> &DecayEnvelope {
        &self.envelope
    }

    /// Mutable access for attack and normalization settings.
    pub fn envelope_mut(&mut self) -> &mut DecayEnvelope {
        &mut self.envelope
    }

    /// The driven voice.
    pub fn voice(&self) -> &V {
        &self.voice
    }

    /// Parameters applied at the start of the last block.
    pub fn params(&self) -> &VoiceParams {
        &self.params
    }

    /// True if the current envelope cycle was started by an accented note.
    pub fn is_accented(&self) -> bool {
        self.accented
    }

    /// Apply continuous parameters. No-op if unchanged.
    pub fn apply_params(&mut self, params: VoiceParams) {
        if params == self.params {
            return;
        }
        self.params = params;
        self.voice.set_params(&params);
        self.envelope.set_decay_time_constant(self.decay_ms());
    }

    fn decay_ms(&self) -> f32 {
        if self.accented {
            self.params.accent_decay_ms
        } else {
            self.params.decay_ms
        }
    }

    fn note_on(&mut self, decision: TriggerDecision) {
        self.voice.set_slide_time(decision.slide_time_ms);
        if decision.is_slide {
            // No all-notes-off and no accent/decay change. The retrigger
            // charges on from the current output.
            self.voice
                .note_on_portamento(decision.note, decision.velocity);
            self.envelope.trigger();
            return;
        }
        self.accented = decision.is_accent();
        self.envelope.set_decay_time_constant(self.decay_ms());
        self.voice.all_notes_off();
        self.voice.note_on(decision.note, decision.velocity);
        self.envelope.trigger();
    }

    /// Apply one note event.
    pub fn handle_event(&mut self, event: NoteEvent) {
        match event {
            NoteEvent::On(decision) => self.note_on(decision),
            NoteEvent::Off { note } => self.voice.note_off(note),
        }
    }

    /// Render one block.
    pub fn process_block(&mut self, bridge: &mut AudioSide<'_>, output: &mut [f32]) {
        self.apply_params(bridge.params());
        while let Some(event) = bridge.pop() {
            self.handle_event(event);
        }
        for sample in output.iter_mut() {
            let env = self.envelope.advance();
            *sample = self.voice.render(env);
        }
    }
}
