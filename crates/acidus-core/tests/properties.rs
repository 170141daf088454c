//! Property-based tests for acidus-core.
//!
//! Covers the envelope decay law and retrigger continuity, the slide and
//! accent decision boundaries, and the calibration validity band.

use acidus_core::{
    ACCENT_VELOCITY, CalibrationConstants, DecayEnvelope, EnvelopePhase, NORMAL_VELOCITY,
    PitchResolver, ResolverConfig,
};
use proptest::prelude::*;

fn resolver() -> PitchResolver {
    PitchResolver::new(CalibrationConstants::new(1200, 200), ResolverConfig::default())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// The decay coefficient is exp(-1 / (tau_s * fs)) for every accepted
    /// time constant and sample rate, and lies in (0, 1).
    #[test]
    fn decay_coefficient_law(
        tau in 0.01f32..5000.0f32,
        fs in 8000.0f32..192000.0f32,
    ) {
        let mut env = DecayEnvelope::new(fs);
        env.set_decay_time_constant(tau);
        let expected = (-1.0f64 / (0.001 * f64::from(tau) * f64::from(fs))).exp();
        let c = env.decay_coefficient();
        prop_assert!(c > 0.0 && c < 1.0, "coefficient {} out of (0, 1)", c);
        prop_assert!(
            (f64::from(c) - expected).abs() < 1e-6,
            "tau={} fs={} c={} expected={}", tau, fs, c, expected
        );
    }

    /// Starting at the target peak, n decay ticks land within 1% of
    /// peak * c^n.
    #[test]
    fn decay_follows_power_law(
        tau in 10.0f32..5000.0f32,
        fs in 22050.0f32..96000.0f32,
        n in 1usize..4096,
    ) {
        let mut env = DecayEnvelope::new(fs);
        env.set_decay_time_constant(tau);
        env.trigger();
        let peak = env.advance();
        prop_assert!((peak - env.target_peak()).abs() < 1e-6);
        prop_assert_eq!(env.phase(), EnvelopePhase::Decay);

        let mut out = peak;
        for _ in 0..n {
            out = env.advance();
        }
        let expected = f64::from(peak) * f64::from(env.decay_coefficient()).powi(n as i32);
        let err = (f64::from(out) - expected).abs() / expected;
        prop_assert!(err < 0.01, "n={} out={} expected={} err={}", n, out, expected, err);
    }

    /// A retrigger never moves the output; the next tick continues from it.
    #[test]
    fn retrigger_preserves_output(
        attack in 0.0f32..20.0f32,
        tau in 5.0f32..2000.0f32,
        before in 1usize..2000,
    ) {
        let mut env = DecayEnvelope::new(48000.0);
        env.set_attack(attack);
        env.set_decay_time_constant(tau);
        env.trigger();
        for _ in 0..before {
            env.advance();
        }
        let held = env.output();
        env.trigger();
        prop_assert_eq!(env.output(), held);
        prop_assert_eq!(env.phase(), EnvelopePhase::Attack);

        let next = env.advance();
        let peak = env.target_peak();
        let (lo, hi) = if held <= peak { (held, peak) } else { (peak, held) };
        prop_assert!(next >= lo - 1e-6 && next <= hi + 1e-6,
            "next {} outside [{}, {}]", next, lo, hi);
    }

    /// end_is_reached stays false during the attack whatever the threshold.
    #[test]
    fn end_not_reached_during_attack(attack in 1.0f32..50.0f32, threshold in 0.0f32..10.0f32) {
        let mut env = DecayEnvelope::new(48000.0);
        env.set_attack(attack);
        env.trigger();
        while env.elapsed_ms() <= env.attack() {
            prop_assert!(!env.end_is_reached(threshold));
            env.advance();
        }
    }

    /// Slide is off at or below 0.05 and on above it, with a time linear in
    /// the knob over [50, 400] ms.
    #[test]
    fn slide_threshold_and_linearity(slide in 0.0f32..=1.0f32) {
        let r = resolver();
        match r.slide_time(slide) {
            None => prop_assert!(slide <= 0.05),
            Some(ms) => {
                prop_assert!(slide > 0.05);
                prop_assert!((ms - (50.0 + slide * 350.0)).abs() < 1e-3);
                prop_assert!((50.0..=400.0).contains(&ms));
            }
        }
    }

    /// Slide time never decreases as the knob turns up.
    #[test]
    fn slide_time_monotonic(a in 0.051f32..=1.0f32, b in 0.051f32..=1.0f32) {
        let r = resolver();
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(r.slide_time(lo).unwrap_or(0.0) <= r.slide_time(hi).unwrap_or(0.0));
    }

    /// Accent velocity is a step at 0.9 with exactly two outputs.
    #[test]
    fn accent_is_a_step(accent in 0.0f32..=1.0f32) {
        let v = resolver().velocity(accent);
        if accent > 0.9 {
            prop_assert_eq!(v, ACCENT_VELOCITY);
        } else {
            prop_assert_eq!(v, NORMAL_VELOCITY);
        }
    }

    /// Validity is exactly the inclusive [400, 20000] band, and sanitizing
    /// keeps valid constants and replaces the rest with the defaults.
    #[test]
    fn validity_band(offset in any::<u16>(), upv in any::<u16>()) {
        let c = CalibrationConstants::new(offset, upv);
        prop_assert_eq!(c.is_valid(), (400..=20000).contains(&upv));
        let s = c.sanitized();
        if c.is_valid() {
            prop_assert_eq!(s, c);
        } else {
            prop_assert_eq!(s, CalibrationConstants::DEFAULT);
        }
    }

    /// Every raw count resolves to a note inside the configured range.
    #[test]
    fn notes_stay_in_range(
        raw in any::<u16>(),
        offset in any::<u16>(),
        upv in 400u16..=20000,
        base_octave in 0u8..=4,
    ) {
        let config = ResolverConfig { base_octave, ..ResolverConfig::default() };
        let r = PitchResolver::new(CalibrationConstants::new(offset, upv), config);
        let note = r.note(raw);
        prop_assert!(note >= config.min_note() && note <= config.max_note());
    }
}
