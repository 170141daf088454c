//! Capacitor-style decay envelope for the filter and amplitude of the voice.
//!
//! The envelope models an RC network: a trigger pulse charges the capacitor
//! toward a peak (attack), after which it discharges through a resistor
//! (decay). Both phases are one-pole exponentials:
//!
//! ```text
//! attack: y[n] = y[n-1] + a * (peak - y[n-1])
//! decay:  y[n] = c * y[n-1],   c = exp(-1 / (tau_s * fs))
//! ```
//!
//! Retriggering restarts the attack phase from the *current* output. The
//! capacitor is never discharged on trigger, so fast note sequences glide
//! from one envelope cycle into the next instead of clicking back to zero.

use libm::expf;

/// Lowest accepted decay time constant in milliseconds (exclusive).
pub const MIN_DECAY_TIME_CONSTANT_MS: f32 = 0.001;

/// Decay time constant set at construction.
pub const DEFAULT_DECAY_TIME_CONSTANT_MS: f32 = 200.0;

/// Sample rate used when constructed with a non-positive rate.
pub const DEFAULT_SAMPLE_RATE: f32 = 44100.0;

/// Envelope phases.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EnvelopePhase {
    /// Charging toward the target peak after a trigger.
    Attack,
    /// Discharging multiplicatively toward zero.
    #[default]
    Decay,
}

/// Two-phase exponential envelope generator.
///
/// # Invariants
///
/// - `output` is continuous across [`trigger`](Self::trigger); only
///   [`advance`](Self::advance) writes it
/// - `decay_coeff` is in (0, 1) for any accepted sample rate and time constant
/// - setters that receive out-of-range values leave all state untouched
///
/// # Example
///
/// ```rust
/// use acidus_core::DecayEnvelope;
///
/// let mut env = DecayEnvelope::new(48000.0);
/// env.set_decay_time_constant(300.0);
/// env.trigger();
///
/// let peak = env.advance();
/// let next = env.advance();
/// assert!(next < peak);
/// ```
#[derive(Debug, Clone)]
pub struct DecayEnvelope {
    phase: EnvelopePhase,
    decay_coeff: f32,
    attack_coeff: f32,
    output: f32,
    target_peak: f32,
    attack_ms: f32,
    decay_tau_ms: f32,
    elapsed_ms: f32,
    sample_interval_ms: f32,
    sample_rate: f32,
    normalize_sum: bool,
}

impl Default for DecayEnvelope {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE)
    }
}

impl DecayEnvelope {
    /// Create an envelope with a 200 ms decay and an instantaneous attack.
    ///
    /// A non-positive `sample_rate` falls back to [`DEFAULT_SAMPLE_RATE`].
    pub fn new(sample_rate: f32) -> Self {
        let sample_rate = if sample_rate > 0.0 {
            sample_rate
        } else {
            DEFAULT_SAMPLE_RATE
        };
        let mut env = Self {
            phase: EnvelopePhase::Decay,
            decay_coeff: 1.0,
            attack_coeff: 1.0,
            output: 0.0,
            target_peak: 1.0,
            attack_ms: 0.0,
            decay_tau_ms: DEFAULT_DECAY_TIME_CONSTANT_MS,
            elapsed_ms: 0.0,
            sample_interval_ms: 1000.0 / sample_rate,
            sample_rate,
            normalize_sum: false,
        };
        env.recalculate_coefficients();
        env
    }

    /// Set the sample rate in Hz. Ignored unless `sample_rate > 0`.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        if sample_rate > 0.0 {
            self.sample_rate = sample_rate;
            self.sample_interval_ms = 1000.0 / sample_rate;
            self.recalculate_coefficients();
        }
    }

    /// Set the attack time in milliseconds. Ignored when negative.
    ///
    /// Zero is an instantaneous attack: the first sample after a trigger
    /// lands on the target peak.
    pub fn set_attack(&mut self, attack_ms: f32) {
        if attack_ms >= 0.0 {
            self.attack_ms = attack_ms;
            self.recalculate_coefficients();
        }
    }

    /// Set the decay time constant in milliseconds.
    ///
    /// Values at or below [`MIN_DECAY_TIME_CONSTANT_MS`] are ignored.
    pub fn set_decay_time_constant(&mut self, tau_ms: f32) {
        if tau_ms > MIN_DECAY_TIME_CONSTANT_MS {
            self.decay_tau_ms = tau_ms;
            self.recalculate_coefficients();
        }
    }

    /// Normalize the impulse response to unit sum instead of unit peak.
    pub fn set_normalize_sum(&mut self, normalize_sum: bool) {
        self.normalize_sum = normalize_sum;
        self.recalculate_coefficients();
    }

    /// Restart the attack phase without touching the current output.
    pub fn trigger(&mut self) {
        self.elapsed_ms = 0.0;
        self.phase = EnvelopePhase::Attack;
    }

    /// Advance the envelope by one sample and return the new output.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        match self.phase {
            EnvelopePhase::Attack => {
                self.output += self.attack_coeff * (self.target_peak - self.output);
                self.elapsed_ms += self.sample_interval_ms;
                if self.elapsed_ms >= self.attack_ms {
                    self.phase = EnvelopePhase::Decay;
                }
            }
            EnvelopePhase::Decay => {
                self.output *= self.decay_coeff;
                // An attack ending exactly on `attack_ms` still needs
                // `elapsed > attack` before `end_is_reached` can hold.
                if self.elapsed_ms <= self.attack_ms {
                    self.elapsed_ms += self.sample_interval_ms;
                }
            }
        }
        self.output
    }

    /// Fill `output` with consecutive envelope samples.
    pub fn process_block(&mut self, output: &mut [f32]) {
        for sample in output.iter_mut() {
            *sample = self.advance();
        }
    }

    /// True once the attack has completed and the output fell below `threshold`.
    pub fn end_is_reached(&self, threshold: f32) -> bool {
        self.elapsed_ms > self.attack_ms && self.output < threshold
    }

    /// Current phase.
    pub fn phase(&self) -> EnvelopePhase {
        self.phase
    }

    /// Current output without advancing.
    pub fn output(&self) -> f32 {
        self.output
    }

    /// Peak the attack phase charges toward.
    pub fn target_peak(&self) -> f32 {
        self.target_peak
    }

    /// Per-sample multiplier applied during decay.
    pub fn decay_coefficient(&self) -> f32 {
        self.decay_coeff
    }

    /// Per-sample charge fraction applied during attack.
    pub fn attack_coefficient(&self) -> f32 {
        self.attack_coeff
    }

    /// Decay time constant in milliseconds.
    pub fn decay_time_constant(&self) -> f32 {
        self.decay_tau_ms
    }

    /// Attack time in milliseconds.
    pub fn attack(&self) -> f32 {
        self.attack_ms
    }

    /// Milliseconds spent in the current attack phase.
    pub fn elapsed_ms(&self) -> f32 {
        self.elapsed_ms
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn recalculate_coefficients(&mut self) {
        self.decay_coeff = expf(-1.0 / (0.001 * self.decay_tau_ms * self.sample_rate));

        self.attack_coeff = if self.attack_ms > 0.0 {
            1.0 - expf(-1.0 / (0.001 * self.attack_ms * self.sample_rate))
        } else {
            1.0
        };

        // Unit peak: the first decay multiply lands the peak on 1.0.
        self.target_peak = if self.normalize_sum {
            (1.0 - self.decay_coeff) / self.decay_coeff
        } else {
            1.0 / self.decay_coeff
        };
    }
}
