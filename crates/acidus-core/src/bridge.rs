//! Lock-free handoff from the control loop to the audio callback.
//!
//! [`Bridge`] owns two things:
//!
//! - a [`ParameterFrame`] of atomic scalars (continuous knob-derived
//!   parameters plus the last resolved note), written by the control loop
//!   and read by the audio callback once per block
//! - a single-producer/single-consumer queue of discrete [`NoteEvent`]s,
//!   so every note-on and note-off is delivered exactly once
//!
//! [`Bridge::split`] hands out exactly one [`ControlSide`] and one
//! [`AudioSide`]. Neither half is `Clone`, so the single-writer /
//! single-reader discipline is enforced by the type system rather than
//! by convention.
//!
//! Frame fields are independent synthesis parameters. A block may observe
//! a cutoff from one control iteration and a resonance from the next; no
//! transactional snapshot is attempted.
//!
//! # Example
//!
//! ```rust
//! use acidus_core::{Bridge, NoteEvent, VoiceParams};
//!
//! let mut bridge = Bridge::new();
//! let (mut control, mut audio) = bridge.split();
//!
//! control.publish(&VoiceParams { cutoff_hz: 1500.0, ..VoiceParams::default() });
//! control.push(NoteEvent::Off { note: 48 });
//!
//! assert_eq!(audio.params().cutoff_hz, 1500.0);
//! assert_eq!(audio.pop(), Some(NoteEvent::Off { note: 48 }));
//! assert_eq!(audio.pop(), None);
//! ```

use core::sync::atomic::{AtomicU8, AtomicU32, Ordering};

use heapless::spsc::{Consumer, Producer, Queue};

use crate::personality::VoiceParams;
use crate::pitch::TriggerDecision;

/// Queue storage size; holds `EVENT_QUEUE_LEN - 1` pending events.
pub const EVENT_QUEUE_LEN: usize = 16;

/// A discrete note event for the voice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoteEvent {
    /// Start (or slide to) a note.
    On(TriggerDecision),
    /// Release the given note.
    Off {
        /// Note being released.
        note: u8,
    },
}

/// `f32` stored as its bit pattern in an `AtomicU32`.
#[derive(Debug)]
struct AtomicF32(AtomicU32);

impl AtomicF32 {
    const fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    #[inline]
    fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Acquire))
    }

    #[inline]
    fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Release);
    }
}

/// Shared scalar parameters.
#[derive(Debug)]
pub struct ParameterFrame {
    cutoff_hz: AtomicF32,
    resonance: AtomicF32,
    env_mod: AtomicF32,
    accent: AtomicF32,
    decay_ms: AtomicF32,
    accent_decay_ms: AtomicF32,
    waveform: AtomicF32,
    slide_time_ms: AtomicF32,
    last_note: AtomicU8,
    dropped_events: AtomicU32,
}

impl ParameterFrame {
    /// Frame holding [`VoiceParams::DEFAULT`].
    pub const fn new() -> Self {
        let p = VoiceParams::DEFAULT;
        Self {
            cutoff_hz: AtomicF32::new(p.cutoff_hz),
            resonance: AtomicF32::new(p.resonance),
            env_mod: AtomicF32::new(p.env_mod),
            accent: AtomicF32::new(p.accent),
            decay_ms: AtomicF32::new(p.decay_ms),
            accent_decay_ms: AtomicF32::new(p.accent_decay_ms),
            waveform: AtomicF32::new(p.waveform),
            slide_time_ms: AtomicF32::new(0.0),
            last_note: AtomicU8::new(0),
            dropped_events: AtomicU32::new(0),
        }
    }

    fn store_params(&self, p: &VoiceParams) {
        self.cutoff_hz.store(p.cutoff_hz);
        self.resonance.store(p.resonance);
        self.env_mod.store(p.env_mod);
        self.accent.store(p.accent);
        self.decay_ms.store(p.decay_ms);
        self.accent_decay_ms.store(p.accent_decay_ms);
        self.waveform.store(p.waveform);
    }

    fn load_params(&self) -> VoiceParams {
        VoiceParams {
            cutoff_hz: self.cutoff_hz.load(),
            resonance: self.resonance.load(),
            env_mod: self.env_mod.load(),
            accent: self.accent.load(),
            decay_ms: self.decay_ms.load(),
            accent_decay_ms: self.accent_decay_ms.load(),
            waveform: self.waveform.load(),
        }
    }
}

impl Default for ParameterFrame {
    fn default() -> Self {
        Self::new()
    }
}

/// Backing storage for the control/audio handoff.
///
/// `const`-constructible so firmware can place it in a `static`.
pub struct Bridge {
    frame: ParameterFrame,
    events: Queue<NoteEvent, EVENT_QUEUE_LEN>,
}

impl Bridge {
    /// Empty bridge with default parameters.
    pub const fn new() -> Self {
        Self {
            frame: ParameterFrame::new(),
            events: Queue::new(),
        }
    }

    /// Split into the control-loop writer and the audio-callback reader.
    pub fn split(&mut self) -> (ControlSide<'_>, AudioSide<'_>) {
        let Self { frame, events } = self;
        let frame: &ParameterFrame = frame;
        let (producer, consumer) = events.split();
        (
            ControlSide {
                frame,
                events: producer,
            },
            AudioSide {
                frame,
                events: consumer,
            },
        )
    }
}

impl Default for Bridge {
    fn default() -> Self {
        Self::new()
    }
}

/// Writer half, owned by the control loop.
pub struct ControlSide<'a> {
    frame: &'a ParameterFrame,
    events: Producer<'a, NoteEvent, EVENT_QUEUE_LEN>,
}

impl ControlSide<'_> {
    /// Publish the latest continuous parameters.
    pub fn publish(&mut self, params: &VoiceParams) {
        self.frame.store_params(params);
    }

    /// Queue a note event. Returns `false` (and counts a drop) when full.
    pub fn push(&mut self, event: NoteEvent) -> bool {
        if let NoteEvent::On(decision) = event {
            self.frame.last_note.store(decision.note, Ordering::Release);
            self.frame.slide_time_ms.store(decision.slide_time_ms);
        }
        match self.events.enqueue(event) {
            Ok(()) => true,
            Err(_) => {
                self.frame.dropped_events.fetch_add(1, Ordering::Relaxed);
                #[cfg(feature = "tracing")]
                tracing::warn!(?event, "note event queue full, event dropped");
                false
            }
        }
    }

    /// Number of events dropped because the audio side fell behind.
    pub fn dropped_events(&self) -> u32 {
        self.frame.dropped_events.load(Ordering::Relaxed)
    }
}

/// Reader half, owned by the audio callback.
pub struct AudioSide<'a> {
    frame: &'a ParameterFrame,
    events: Consumer<'a, NoteEvent, EVENT_QUEUE_LEN>,
}

impl AudioSide<'_> {
    /// Latest continuous parameters.
    pub fn params(&self) -> VoiceParams {
        self.frame.load_params()
    }

    /// Next pending note event.
    pub fn pop(&mut self) -> Option<NoteEvent> {
        self.events.dequeue()
    }

    /// Note of the most recent note-on, 0 before the first.
    pub fn last_note(&self) -> u8 {
        self.frame.last_note.load(Ordering::Acquire)
    }

    /// Slide time of the most recent note-on.
    pub fn slide_time_ms(&self) -> f32 {
        self.frame.slide_time_ms.load()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch::NORMAL_VELOCITY;

    fn on(note: u8) -> NoteEvent {
        NoteEvent::On(TriggerDecision {
            note,
            velocity: NORMAL_VELOCITY,
            is_slide: false,
            slide_time_ms: 60.0,
        })
    }

    #[test]
    fn test_default_frame() {
        let mut bridge = Bridge::new();
        let (_, audio) = bridge.split();
        assert_eq!(audio.params(), VoiceParams::DEFAULT);
        assert_eq!(audio.last_note(), 0);
    }

    #[test]
    fn test_publish_is_visible() {
        let mut bridge = Bridge::new();
        let (mut control, audio) = bridge.split();
        let params = VoiceParams {
            cutoff_hz: 3210.0,
            resonance: 55.0,
            env_mod: 66.0,
            accent: 12.0,
            decay_ms: 900.0,
            accent_decay_ms: 200.0,
            waveform: 0.5,
        };
        control.publish(&params);
        assert_eq!(audio.params(), params);
    }

    #[test]
    fn test_events_in_order_exactly_once() {
        let mut bridge = Bridge::new();
        let (mut control, mut audio) = bridge.split();
        assert!(control.push(on(40)));
        assert!(control.push(NoteEvent::Off { note: 40 }));
        assert!(control.push(on(52)));

        assert_eq!(audio.pop(), Some(on(40)));
        assert_eq!(audio.pop(), Some(NoteEvent::Off { note: 40 }));
        assert_eq!(audio.pop(), Some(on(52)));
        assert_eq!(audio.pop(), None);
        assert_eq!(audio.last_note(), 52);
        assert_eq!(audio.slide_time_ms(), 60.0);
    }

    #[test]
    fn test_full_queue_drops_newest() {
        let mut bridge = Bridge::new();
        let (mut control, mut audio) = bridge.split();
        for note in 0..(EVENT_QUEUE_LEN as u8 - 1) {
            assert!(control.push(on(note)));
        }
        assert!(!control.push(on(99)));
        assert_eq!(control.dropped_events(), 1);

        assert_eq!(audio.pop(), Some(on(0)));
        // Space again after a pop.
        assert!(control.push(on(100)));
    }

    #[test]
    fn test_sides_cross_threads() {
        use std::thread;

        let mut bridge = Bridge::new();
        let (mut control, mut audio) = bridge.split();
        thread::scope(|s| {
            s.spawn(move || {
                for note in 0..10u8 {
                    while !control.push(on(note)) {
                        thread::yield_now();
                    }
                }
            });
            s.spawn(move || {
                let mut expected = 0u8;
                while expected < 10 {
                    if let Some(event) = audio.pop() {
                        assert_eq!(event, on(expected));
                        expected += 1;
                    } else {
                        thread::yield_now();
                    }
                }
            });
        });
    }
}
