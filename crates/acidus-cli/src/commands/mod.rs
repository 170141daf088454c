//! CLI command implementations.

pub mod calibrate;
pub mod envelope;
pub mod resolve;
pub mod settings;
pub mod simulate;

use std::path::{Path, PathBuf};

use acidus_config::FileSettingsStore;
use hound::{SampleFormat, WavSpec, WavWriter};

/// Write mono 32-bit float samples.
pub fn write_mono_wav(path: &Path, samples: &[f32], sample_rate: u32) -> anyhow::Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Settings store at `path`, or at the platform default location.
pub fn settings_store(path: Option<PathBuf>) -> FileSettingsStore {
    path.map_or_else(FileSettingsStore::at_default_location, FileSettingsStore::new)
}
