//! Render the decay envelope on its own.

use std::path::PathBuf;

use acidus_core::DecayEnvelope;
use clap::Args;

/// Render the decay envelope to a WAV file.
#[derive(Args)]
pub struct EnvelopeArgs {
    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Decay time constant in milliseconds
    #[arg(long, default_value = "200")]
    decay_ms: f32,

    /// Attack time in milliseconds
    #[arg(long, default_value = "0")]
    attack_ms: f32,

    /// Additional trigger time in milliseconds (repeatable)
    #[arg(long = "retrigger-ms", value_name = "MS")]
    retrigger_ms: Vec<f32>,

    /// Duration in seconds
    #[arg(short, long, default_value = "1.0")]
    duration: f32,

    /// Sample rate in Hz
    #[arg(long, default_value = "48000")]
    sample_rate: u32,

    /// Normalize the impulse response to unit sum instead of unit peak
    #[arg(long)]
    normalize_sum: bool,
}

/// Run the envelope command.
pub fn run(args: EnvelopeArgs) -> anyhow::Result<()> {
    anyhow::ensure!(args.duration > 0.0, "duration must be positive");
    anyhow::ensure!(args.sample_rate > 0, "sample rate must be positive");
    anyhow::ensure!(
        args.decay_ms > 0.0,
        "decay time constant must be positive, got {}",
        args.decay_ms
    );

    let sample_rate = args.sample_rate as f32;
    let mut env = DecayEnvelope::new(sample_rate);
    env.set_attack(args.attack_ms);
    env.set_decay_time_constant(args.decay_ms);
    env.set_normalize_sum(args.normalize_sum);

    let num_samples = (args.duration * sample_rate) as usize;
    let mut triggers: Vec<usize> = std::iter::once(0.0)
        .chain(args.retrigger_ms.iter().copied())
        .filter(|ms| *ms >= 0.0)
        .map(|ms| (ms * sample_rate / 1000.0) as usize)
        .collect();
    triggers.sort_unstable();
    triggers.dedup();

    let mut samples = Vec::with_capacity(num_samples);
    let mut next = triggers.iter().peekable();
    for n in 0..num_samples {
        if next.next_if(|&&at| at == n).is_some() {
            env.trigger();
        }
        samples.push(env.advance());
    }

    super::write_mono_wav(&args.output, &samples, args.sample_rate)?;

    let peak = samples.iter().fold(0.0f32, |m, &s| m.max(s));
    println!("Rendered {} trigger(s) to {}", triggers.len(), args.output.display());
    println!("  Decay coefficient: {:.6}", env.decay_coefficient());
    println!("  Peak:              {peak:.4}");
    println!("  Final output:      {:.6}", env.output());

    Ok(())
}
