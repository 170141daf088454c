//! Integration tests for acidus-cli.
//!
//! Every test invokes the real `acidus` binary; settings files and WAV
//! output live in temporary directories.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn acidus_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_acidus"))
}

fn run(args: &[&str]) -> Output {
    acidus_bin()
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to run acidus")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn wav_len(path: &Path) -> usize {
    let reader = hound::WavReader::open(path).expect("readable wav");
    assert_eq!(reader.spec().channels, 1);
    reader.len() as usize
}

// ---------------------------------------------------------------------------
// acidus envelope
// ---------------------------------------------------------------------------

#[test]
fn envelope_renders_wav() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("env.wav");

    let output = run(&[
        "envelope",
        out.to_str().unwrap(),
        "--decay-ms",
        "100",
        "--retrigger-ms",
        "250",
        "--retrigger-ms",
        "500",
        "--duration",
        "0.5",
        "--sample-rate",
        "8000",
    ]);

    assert!(output.status.success(), "{output:?}");
    assert!(stdout(&output).contains("Rendered 3 trigger(s)"));
    assert_eq!(wav_len(&out), 4000);
}

#[test]
fn envelope_rejects_zero_decay() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("env.wav");

    let output = run(&["envelope", out.to_str().unwrap(), "--decay-ms", "0"]);

    assert!(!output.status.success());
    assert!(!out.exists());
}

// ---------------------------------------------------------------------------
// acidus resolve
// ---------------------------------------------------------------------------

#[test]
fn resolve_with_explicit_constants() {
    let output = run(&[
        "resolve",
        "--raw",
        "1000",
        "--offset",
        "1200",
        "--units-per-volt",
        "200",
    ]);

    assert!(output.status.success(), "{output:?}");
    let text = stdout(&output);
    assert!(text.contains("Note:     48"), "got: {text}");
    assert!(text.contains("Velocity: 100"), "got: {text}");
    assert!(text.contains("Slide:    off"), "got: {text}");
}

#[test]
fn resolve_reports_slide_and_accent() {
    let output = run(&[
        "resolve",
        "--raw",
        "1000",
        "--offset",
        "1200",
        "--units-per-volt",
        "200",
        "--slide",
        "1.0",
        "--accent",
        "0.95",
    ]);

    assert!(output.status.success(), "{output:?}");
    let text = stdout(&output);
    assert!(text.contains("Velocity: 127 (accent)"), "got: {text}");
    assert!(text.contains("Slide:    400.0 ms"), "got: {text}");
}

#[test]
fn resolve_reads_settings_file() {
    let dir = TempDir::new().unwrap();
    let settings = dir.path().join("settings.toml");
    std::fs::write(&settings, "offset_raw = 1200.0\nunits_per_volt = 200.0\n").unwrap();

    let output = run(&[
        "resolve",
        "--raw",
        "800",
        "--settings",
        settings.to_str().unwrap(),
    ]);

    assert!(output.status.success(), "{output:?}");
    // Two volts above the 0 V note (36).
    assert!(stdout(&output).contains("Note:     60"));
}

// ---------------------------------------------------------------------------
// acidus calibrate / settings
// ---------------------------------------------------------------------------

#[test]
fn calibrate_saves_constants() {
    let dir = TempDir::new().unwrap();
    let settings = dir.path().join("settings.toml");

    let output = run(&[
        "calibrate",
        "--one-volt",
        "1000",
        "--two-volts",
        "800",
        "--three-volts",
        "600",
        "--save",
        "--settings",
        settings.to_str().unwrap(),
    ]);

    assert!(output.status.success(), "{output:?}");
    let text = stdout(&output);
    assert!(text.contains("Offset:         1200"), "got: {text}");
    assert!(text.contains("Units per volt: 200"), "got: {text}");
    assert!(text.contains("Valid:          yes"), "got: {text}");

    let content = std::fs::read_to_string(&settings).unwrap();
    assert!(content.contains("1200"), "got: {content}");
}

#[test]
fn calibrate_flags_out_of_band_estimate() {
    let dir = TempDir::new().unwrap();
    let settings = dir.path().join("settings.toml");

    let output = run(&[
        "calibrate",
        "--one-volt",
        "1000",
        "--two-volts",
        "999",
        "--three-volts",
        "998",
        "--settings",
        settings.to_str().unwrap(),
    ]);

    assert!(output.status.success(), "{output:?}");
    assert!(stdout(&output).contains("Valid:          no"));
    assert!(!settings.exists(), "nothing is written without --save");
}

#[test]
fn settings_show_does_not_create_file() {
    let dir = TempDir::new().unwrap();
    let settings = dir.path().join("settings.toml");

    let output = run(&["settings", "show", "--settings", settings.to_str().unwrap()]);

    assert!(output.status.success(), "{output:?}");
    let text = stdout(&output);
    assert!(text.contains("not written yet"), "got: {text}");
    assert!(text.contains("12826"), "got: {text}");
    assert!(!settings.exists());
}

#[test]
fn settings_restore_writes_factory_values() {
    let dir = TempDir::new().unwrap();
    let settings = dir.path().join("settings.toml");
    std::fs::write(&settings, "offset_raw = 1.0\nunits_per_volt = 1.0\n").unwrap();

    let show = run(&["settings", "show", "--settings", settings.to_str().unwrap()]);
    assert!(stdout(&show).contains("invalid"));

    let output = run(&["settings", "restore", "--settings", settings.to_str().unwrap()]);
    assert!(output.status.success(), "{output:?}");

    let content = std::fs::read_to_string(&settings).unwrap();
    assert!(content.contains("64262"), "got: {content}");
    assert!(content.contains("12826"), "got: {content}");
}

// ---------------------------------------------------------------------------
// acidus simulate
// ---------------------------------------------------------------------------

const GATE_SCENARIO: &str = r#"
duration_ms = 300.0

[calibration]
offset_raw = 1200.0
units_per_volt = 200.0

[[step]]
at_ms = 0.0
gate = true
volts = 1.0

[[step]]
at_ms = 100.0
gate = false
"#;

#[test]
fn simulate_gate_scenario() {
    let dir = TempDir::new().unwrap();
    let scenario = dir.path().join("scenario.toml");
    let out = dir.path().join("voice.wav");
    std::fs::write(&scenario, GATE_SCENARIO).unwrap();

    let output = run(&[
        "simulate",
        scenario.to_str().unwrap(),
        "--output",
        out.to_str().unwrap(),
        "--sample-rate",
        "48000",
    ]);

    assert!(output.status.success(), "{output:?}");
    let text = stdout(&output);
    assert!(text.contains("note-on    48  vel 100"), "got: {text}");
    assert!(text.contains("note-off   48"), "got: {text}");
    assert!(text.contains("1 note-on(s), 0 dropped event(s)"), "got: {text}");
    assert_eq!(wav_len(&out), 14400);
}

// The gesture is held at power-up, so the firmware calibrates before
// playing. The scenario carries no [calibration]; the note only lands on
// 48 if the measured constants were applied.
const CALIBRATION_SCENARIO: &str = r#"
duration_ms = 1000.0

[panel]
tap = true
waveform = "right"
personality = "devilfish"

[[step]]
at_ms = 10.0
tap = false

[[step]]
at_ms = 20.0
tap = true
raw_cv = 1000

[[step]]
at_ms = 30.0
tap = false

[[step]]
at_ms = 240.0
tap = true
raw_cv = 800

[[step]]
at_ms = 250.0
tap = false

[[step]]
at_ms = 460.0
tap = true
raw_cv = 600

[[step]]
at_ms = 470.0
tap = false

[[step]]
at_ms = 700.0
gate = true
raw_cv = 1000
"#;

#[test]
fn simulate_runs_calibration_gesture() {
    let dir = TempDir::new().unwrap();
    let scenario = dir.path().join("scenario.toml");
    std::fs::write(&scenario, CALIBRATION_SCENARIO).unwrap();

    let output = run(&["simulate", scenario.to_str().unwrap()]);

    assert!(output.status.success(), "{output:?}");
    let text = stdout(&output);
    assert!(text.contains("apply 3 V"), "got: {text}");
    assert!(text.contains("Calibration: offset 1200 units/V 200"), "got: {text}");
    assert!(text.contains("note-on    48"), "got: {text}");
}

#[test]
fn simulate_reports_unfinished_calibration() {
    let dir = TempDir::new().unwrap();
    let scenario = dir.path().join("scenario.toml");
    std::fs::write(
        &scenario,
        "[panel]\ntap = true\nwaveform = \"right\"\npersonality = \"devilfish\"\n",
    )
    .unwrap();

    let output = run(&["simulate", scenario.to_str().unwrap()]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("calibration"));
}

#[test]
fn simulate_rejects_invalid_scenario() {
    let dir = TempDir::new().unwrap();
    let scenario = dir.path().join("scenario.toml");
    std::fs::write(&scenario, "[[step]]\nat_ms = 0.0\ncutoff = 2.0\n").unwrap();

    let output = run(&["simulate", scenario.to_str().unwrap()]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("cutoff"));
}
