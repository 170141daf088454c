//! Inspect or restore the stored calibration.

use std::path::PathBuf;

use acidus_core::CalibrationConstants;
use acidus_platform::SettingsStore;
use clap::{Args, Subcommand};

/// Inspect or restore the settings file.
#[derive(Args)]
pub struct SettingsArgs {
    #[command(subcommand)]
    action: SettingsAction,

    /// Settings file (defaults to the user config directory)
    #[arg(long, global = true, value_name = "PATH")]
    settings: Option<PathBuf>,
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print the stored calibration without modifying the file
    Show,
    /// Overwrite the stored calibration with factory defaults
    Restore,
}

/// Run the settings command.
pub fn run(args: SettingsArgs) -> anyhow::Result<()> {
    let mut store = super::settings_store(args.settings);

    match args.action {
        SettingsAction::Show => {
            println!("File:           {}", store.path().display());
            match store.read()? {
                Some(settings) => {
                    let constants = CalibrationConstants::from(settings);
                    print_constants(constants);
                    if !constants.is_valid() {
                        println!("Status:         invalid, factory defaults used at boot");
                    }
                }
                None => {
                    println!("Status:         not written yet, factory defaults used at boot");
                    print_constants(CalibrationConstants::DEFAULT);
                }
            }
        }
        SettingsAction::Restore => {
            let settings = store.restore_defaults()?;
            tracing::info!(path = %store.path().display(), "settings restored to defaults");
            println!("Restored {}", store.path().display());
            print_constants(CalibrationConstants::from(settings));
        }
    }

    Ok(())
}

fn print_constants(constants: CalibrationConstants) {
    println!("Offset:         {}", constants.offset_raw);
    println!("Units per volt: {}", constants.units_per_volt);
}
