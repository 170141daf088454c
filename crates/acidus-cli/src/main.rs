//! Acidus CLI - host tools for the acidus bass voice firmware.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "acidus")]
#[command(author, version, about = "Acidus bass voice host tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the decay envelope to a WAV file
    Envelope(commands::envelope::EnvelopeArgs),

    /// Run a gate/CV scenario through the full firmware pipeline
    Simulate(commands::simulate::SimulateArgs),

    /// Compute calibration constants from reference readings
    Calibrate(commands::calibrate::CalibrateArgs),

    /// Inspect or restore the stored calibration
    Settings(commands::settings::SettingsArgs),

    /// Resolve a raw pitch CV reading into a trigger decision
    Resolve(commands::resolve::ResolveArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Envelope(args) => commands::envelope::run(args),
        Commands::Simulate(args) => commands::simulate::run(args),
        Commands::Calibrate(args) => commands::calibrate::run(args),
        Commands::Settings(args) => commands::settings::run(args),
        Commands::Resolve(args) => commands::resolve::run(args),
    }
}
