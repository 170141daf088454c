//! Run a scripted scenario through the complete firmware pipeline.
//!
//! The control loop and the audio engine share a [`Bridge`] exactly as
//! they do on hardware; here both halves run interleaved on one thread,
//! one control poll per audio block.

use std::path::PathBuf;

use acidus_config::{PanelState, Scenario};
use acidus_core::{
    AudioEngine, Bridge, CalibrationStep, NoteEvent, BasicVoice, ResolverConfig, Settings,
};
use acidus_platform::{ControlLoop, Knob, MemorySettingsStore, PanelInputs, Switch, SwitchPosition};
use clap::Args;

/// Run a scenario through the control loop and audio engine.
#[derive(Args)]
pub struct SimulateArgs {
    /// Scenario TOML file
    #[arg(value_name = "SCENARIO")]
    scenario: PathBuf,

    /// Write the rendered voice to this WAV file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Sample rate in Hz
    #[arg(long, default_value = "48000")]
    sample_rate: u32,

    /// Samples per audio block (one control poll per block)
    #[arg(long, default_value = "64")]
    block_size: usize,
}

/// Clock step per poll while calibration blocks the control loop.
const CALIBRATION_POLL_MS: f32 = 1.0;

/// Panel whose inputs follow a [`Scenario`] timeline.
struct SimulatedPanel {
    scenario: Scenario,
    state: PanelState,
    now_ms: f32,
    poll_step_ms: f32,
    polls: u64,
    overran: bool,
}

impl SimulatedPanel {
    fn new(scenario: Scenario) -> Self {
        Self {
            state: scenario.panel_at(0.0),
            scenario,
            now_ms: 0.0,
            poll_step_ms: CALIBRATION_POLL_MS,
            polls: 0,
            overran: false,
        }
    }

    /// Move the clock forward to `time_ms`; never backward.
    fn advance_to(&mut self, time_ms: f32) {
        self.now_ms = self.now_ms.max(time_ms);
    }

    /// Stop advancing the clock on every poll.
    fn follow_audio_clock(&mut self) {
        self.poll_step_ms = 0.0;
    }
}

impl PanelInputs for SimulatedPanel {
    fn poll(&mut self) {
        if self.polls > 0 {
            self.now_ms += self.poll_step_ms;
        }
        self.polls += 1;
        self.state = self.scenario.panel_at(self.now_ms);
        if self.poll_step_ms > 0.0 && self.now_ms > self.scenario.duration_ms() {
            // A calibration that outlives the script would wait forever.
            // Keep the tap toggling so it finishes, then report the overrun.
            self.overran = true;
            self.state.tap = self.polls % 2 == 0;
        }
    }

    fn knob(&self, knob: Knob) -> f32 {
        match knob {
            Knob::Decay => self.state.decay,
            Knob::Cutoff => self.state.cutoff,
            Knob::Slide => self.state.slide,
            Knob::Resonance => self.state.resonance,
            Knob::EnvMod => self.state.env_mod,
            Knob::Accent => self.state.accent,
        }
    }

    fn raw_pitch_cv(&mut self) -> u16 {
        self.state.raw_cv
    }

    fn gate(&self) -> bool {
        self.state.gate
    }

    fn tap_pressed(&self) -> bool {
        self.state.tap
    }

    fn switch(&self, switch: Switch) -> SwitchPosition {
        match switch {
            Switch::Waveform => self.state.waveform.into(),
            Switch::Personality => self.state.personality.into(),
        }
    }

    fn delay_ms(&mut self, ms: u32) {
        self.now_ms += ms as f32;
    }
}

/// Run the simulate command.
pub fn run(args: SimulateArgs) -> anyhow::Result<()> {
    anyhow::ensure!(args.sample_rate > 0, "sample rate must be positive");
    anyhow::ensure!(args.block_size > 0, "block size must be positive");

    let scenario = Scenario::load(&args.scenario)?;
    let sample_rate = args.sample_rate as f32;
    let duration_ms = scenario.duration_ms();
    let num_samples = (duration_ms * sample_rate / 1000.0) as usize;

    tracing::info!(
        scenario = %args.scenario.display(),
        steps = scenario.steps.len(),
        duration_ms,
        "starting simulation"
    );

    let mut store = MemorySettingsStore::with_settings(Settings::from(scenario.constants()));
    let mut bridge = Bridge::new();
    let (control, mut audio) = bridge.split();

    let mut ctl = ControlLoop::start(
        SimulatedPanel::new(scenario),
        &mut store,
        ResolverConfig::default(),
        control,
        print_step,
    );
    anyhow::ensure!(
        !ctl.panel().overran,
        "scenario ended before calibration finished"
    );
    ctl.panel_mut().follow_audio_clock();

    let constants = ctl.resolver().constants();
    println!(
        "Calibration: offset {} units/V {}",
        constants.offset_raw, constants.units_per_volt
    );

    // Audio starts once the firmware is up.
    let start_ms = ctl.panel().now_ms;
    let mut engine = AudioEngine::new(BasicVoice::new(sample_rate), sample_rate);
    let mut samples = vec![0.0f32; num_samples];
    let mut note_ons = 0usize;

    for (i, block) in samples.chunks_mut(args.block_size).enumerate() {
        let time_ms = start_ms + (i * args.block_size) as f32 * 1000.0 / sample_rate;
        ctl.panel_mut().advance_to(time_ms);
        for event in ctl.poll().into_iter().flatten() {
            if matches!(event, NoteEvent::On(_)) {
                note_ons += 1;
            }
            print_event(time_ms, event);
        }
        engine.process_block(&mut audio, block);
    }

    let peak = samples.iter().fold(0.0f32, |m, &s| m.max(s.abs()));
    println!(
        "{note_ons} note-on(s), {} dropped event(s), peak {peak:.4}",
        ctl.dropped_events()
    );

    if let Some(output) = &args.output {
        super::write_mono_wav(output, &samples, args.sample_rate)?;
        println!("Wrote {}", output.display());
    }

    Ok(())
}

fn print_step(step: CalibrationStep) {
    match step.reference_volts() {
        Some(volts) => println!("Calibration: apply {volts} V and press the button"),
        None => println!("Calibration: {step:?}"),
    }
}

fn print_event(time_ms: f32, event: NoteEvent) {
    match event {
        NoteEvent::On(d) => println!(
            "{time_ms:9.2} ms  note-on   {:3}  vel {:3}{}",
            d.note,
            d.velocity,
            if d.is_slide {
                format!("  slide {:.0} ms", d.slide_time_ms)
            } else {
                String::new()
            }
        ),
        NoteEvent::Off { note } => println!("{time_ms:9.2} ms  note-off  {note:3}"),
    }
}
