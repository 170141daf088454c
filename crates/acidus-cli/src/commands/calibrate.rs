//! Offline calibration from readings taken at 1 V, 2 V and 3 V.

use std::path::PathBuf;

use acidus_core::{MAX_UNITS_PER_VOLT, MIN_UNITS_PER_VOLT, ReferenceReadings, Settings};
use acidus_platform::SettingsStore;
use clap::Args;

/// Compute calibration constants from reference readings.
#[derive(Args)]
pub struct CalibrateArgs {
    /// Raw count read with 1 V applied
    #[arg(long, value_name = "RAW")]
    one_volt: f32,

    /// Raw count read with 2 V applied (averaged)
    #[arg(long, value_name = "RAW")]
    two_volts: f32,

    /// Raw count read with 3 V applied (averaged)
    #[arg(long, value_name = "RAW")]
    three_volts: f32,

    /// Persist the constants to the settings file
    #[arg(long)]
    save: bool,

    /// Settings file (defaults to the user config directory)
    #[arg(long, value_name = "PATH")]
    settings: Option<PathBuf>,
}

/// Run the calibrate command.
pub fn run(args: CalibrateArgs) -> anyhow::Result<()> {
    let readings = ReferenceReadings {
        one_volt: args.one_volt,
        two_volts: args.two_volts,
        three_volts: args.three_volts,
    };
    let constants = readings.estimate();

    println!("Offset:         {}", constants.offset_raw);
    println!("Units per volt: {}", constants.units_per_volt);
    if constants.is_valid() {
        println!("Valid:          yes");
    } else {
        println!(
            "Valid:          no (units per volt must be within {MIN_UNITS_PER_VOLT}..={MAX_UNITS_PER_VOLT}; \
             the next boot will restore factory defaults)"
        );
    }

    if args.save {
        let mut store = super::settings_store(args.settings);
        store.save(&Settings::from(constants))?;
        println!("Saved to {}", store.path().display());
    }

    Ok(())
}
