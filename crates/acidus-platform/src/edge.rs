//! Edge detection for the gate jack and the tap button.
//!
//! Both sources can start and end notes. Rising edges always fire. A
//! falling edge only releases the note when the other source is low, so
//! the note stays active while either is held.

/// Transition seen by an [`EdgeDetector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// No change.
    None,
    /// Low to high.
    Rising,
    /// High to low.
    Falling,
}

/// Remembers the previous level of a boolean input.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeDetector {
    level: bool,
}

impl EdgeDetector {
    /// Detector starting at `level`.
    pub const fn new(level: bool) -> Self {
        Self { level }
    }

    /// Feed the current level.
    pub fn update(&mut self, level: bool) -> Edge {
        let edge = match (self.level, level) {
            (false, true) => Edge::Rising,
            (true, false) => Edge::Falling,
            _ => Edge::None,
        };
        self.level = level;
        edge
    }

    /// Last level seen.
    pub const fn level(&self) -> bool {
        self.level
    }
}

/// What the control loop should do for one edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerAction {
    /// Resolve the pitch and start a note.
    NoteOn,
    /// Release the active note.
    NoteOff,
}

/// Gate and tap edge detectors combined with OR semantics.
#[derive(Debug, Clone, Copy, Default)]
pub struct TriggerInputs {
    gate: EdgeDetector,
    tap: EdgeDetector,
}

impl TriggerInputs {
    /// Both sources low.
    pub const fn new() -> Self {
        Self {
            gate: EdgeDetector::new(false),
            tap: EdgeDetector::new(false),
        }
    }

    /// Feed both levels; returns the gate action then the tap action.
    pub fn update(&mut self, gate: bool, tap: bool) -> [Option<TriggerAction>; 2] {
        let gate_edge = self.gate.update(gate);
        let tap_edge = self.tap.update(tap);
        [action(gate_edge, tap), action(tap_edge, gate)]
    }

    /// True while either source is high.
    pub const fn is_active(&self) -> bool {
        self.gate.level() || self.tap.level()
    }
}

fn action(edge: Edge, other_held: bool) -> Option<TriggerAction> {
    match edge {
        Edge::Rising => Some(TriggerAction::NoteOn),
        Edge::Falling if !other_held => Some(TriggerAction::NoteOff),
        Edge::Falling | Edge::None => None,
    }
}
