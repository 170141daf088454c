//! Resolve a single raw pitch reading the way the control loop does.

use std::path::PathBuf;

use acidus_core::{CalibrationConstants, PitchResolver, ResolverConfig};
use clap::Args;

/// Resolve one raw pitch reading.
#[derive(Args)]
pub struct ResolveArgs {
    /// Raw pitch CV count
    #[arg(long, value_name = "N")]
    raw: u16,

    /// Slide knob position (0.0 - 1.0)
    #[arg(long, default_value = "0.0")]
    slide: f32,

    /// Accent knob position (0.0 - 1.0)
    #[arg(long, default_value = "0.0")]
    accent: f32,

    /// Override the calibration offset
    #[arg(long, requires = "units_per_volt")]
    offset: Option<u16>,

    /// Override the calibration units per volt
    #[arg(long, requires = "offset")]
    units_per_volt: Option<u16>,

    /// Settings file (defaults to the user config directory)
    #[arg(long, value_name = "PATH")]
    settings: Option<PathBuf>,
}

/// Run the resolve command.
pub fn run(args: ResolveArgs) -> anyhow::Result<()> {
    anyhow::ensure!(
        (0.0..=1.0).contains(&args.slide) && (0.0..=1.0).contains(&args.accent),
        "knob positions must be within 0.0 - 1.0"
    );

    let constants = match (args.offset, args.units_per_volt) {
        (Some(offset), Some(upv)) => CalibrationConstants::new(offset, upv),
        _ => stored_constants(args.settings)?,
    };
    let resolver = PitchResolver::new(constants, ResolverConfig::default());
    let decision = resolver.resolve(args.raw, args.slide, args.accent);

    println!("Volts:    {:.4}", resolver.volts(args.raw));
    println!("Note:     {}", decision.note);
    println!(
        "Velocity: {}{}",
        decision.velocity,
        if decision.is_accent() { " (accent)" } else { "" }
    );
    if decision.is_slide {
        println!("Slide:    {:.1} ms", decision.slide_time_ms);
    } else {
        println!("Slide:    off");
    }

    Ok(())
}

/// Constants as the firmware would boot them, without writing the file.
fn stored_constants(path: Option<PathBuf>) -> anyhow::Result<CalibrationConstants> {
    let store = super::settings_store(path);
    Ok(store
        .read()?
        .map(CalibrationConstants::from)
        .unwrap_or_default()
        .sanitized())
}
