//! HeliRig host runner.
//!
//! Runs the control core against the simulated rig: one thread plays the
//! sample tick interrupt, one plays the encoder edge interrupt, and the
//! main thread runs the coordinator with a log-backed display.
//!
//! ```text
//! ┌──────────────────────┐   ┌──────────────────────┐
//! │ tick thread (10 Hz)  │   │ edge thread (200 Hz) │
//! │ SamplerIsr + SimAdc  │   │ EncoderIsr + SimEnc  │
//! └─────────┬────────────┘   └─────────┬────────────┘
//!           │ SampleWriter             │ EdgeHandler
//!     ┌─────▼──────┐            ┌──────▼──────┐
//!     │ CircBuffer │            │ Quadrature  │
//!     └─────┬──────┘            └──────┬──────┘
//!           │ SampleReader             │ YawReader
//! ┌─────────▼──────────────────────────▼─────────┐
//! │ Coordinator (main thread, local executor)    │──▶ LogDisplaySink
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Usage: `helirig [config.json | -] [seconds]`

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{info, warn};

use helirig::adapters::log_display::LogDisplaySink;
use helirig::adapters::sim::{SimulatedAdc, SimulatedEncoder};
use helirig::app::{Coordinator, DisplayChannel};
use helirig::circ_buf::SampleBuffer;
use helirig::config::SystemConfig;
use helirig::drivers::hw_timer::PeriodicTimer;
use helirig::sensors::{EncoderIsr, HeightEstimator, QuadratureDecoder, SamplerIsr};

/// Simulated encoder edge period.
const EDGE_PERIOD: Duration = Duration::from_millis(5);
/// Edges before the simulated rig reverses (one revolution at 0.8 deg/edge).
const EDGE_SWEEP: u32 = 450;

/// Simulated height sensor: rests near 2050 counts, swings up by 800.
const ADC_BASE: u32 = 1650;
const ADC_SWING: u32 = 800;
const ADC_PERIOD_TICKS: u32 = 100;

fn load_config(arg: Option<&str>) -> Result<SystemConfig> {
    let config = match arg {
        None | Some("-") => {
            info!("Config: defaults");
            SystemConfig::default()
        }
        Some(path) => {
            let path = Path::new(path);
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            let config: SystemConfig = serde_json::from_str(&text)
                .with_context(|| format!("parsing config {}", path.display()))?;
            info!("Config: loaded from {}", path.display());
            config
        }
    };
    config.validate().context("invalid config")?;
    Ok(config)
}

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("HeliRig v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Config ─────────────────────────────────────────────
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = load_config(args.first().map(String::as_str))?;
    let run_for = args
        .get(1)
        .map(|s| s.parse::<u64>())
        .transpose()
        .context("run duration must be whole seconds")?
        .map(embassy_time::Duration::from_secs);
    if run_for.is_none() {
        warn!("No run duration given, running until killed");
    }

    // ── 3. Shared state, created once ─────────────────────────
    let mut buffer = SampleBuffer::new();
    buffer
        .create(usize::from(config.sample_buffer_capacity))
        .context("sample buffer")?;
    let (writer, reader) = buffer.split();

    let mut decoder = QuadratureDecoder::new(&config.quadrature);
    let (edges, yaw) = decoder.split();

    let channel = DisplayChannel::new();
    let stop = AtomicBool::new(false);
    let encoder = SimulatedEncoder::new(EDGE_SWEEP);

    // ── 4. Interrupt sources + coordinator ────────────────────
    let (summary, drawn) = thread::scope(|s| {
        let stop = &stop;
        let encoder = &encoder;
        let sample_period_us = config.sample_period_us();

        s.spawn(move || {
            let mut isr = SamplerIsr::new(SimulatedAdc::new(ADC_BASE, ADC_SWING, ADC_PERIOD_TICKS), writer);
            let period = Duration::from_micros(sample_period_us);
            PeriodicTimer::new("sample tick", period).run_until(stop, || {
                isr.on_tick();
                if let Some(sample) = isr.trigger_mut().take_conversion() {
                    isr.on_sample_ready(sample);
                }
            });
        });

        s.spawn(move || {
            let (pin_a, pin_b) = encoder.pins();
            let mut isr = EncoderIsr::new(pin_a, pin_b, edges);
            PeriodicTimer::new("encoder edge", EDGE_PERIOD).run_until(stop, || {
                encoder.advance();
                let Ok(_) = isr.on_edge();
            });
        });

        let coordinator = Coordinator::new(HeightEstimator::new(reader, config.height_map), yaw, &channel, &config);
        let mut sink = LogDisplaySink::new();
        let outcome = coordinator.run(&mut sink, run_for);
        stop.store(true, Ordering::Relaxed);
        outcome.map(|summary| (summary, sink.drawn()))
    })?;

    info!(
        "Done: {} height / {} yaw iterations, {} messages rendered, {} dropped, {} drawn on the panel",
        summary.height_iterations, summary.yaw_iterations, summary.messages_rendered, summary.messages_dropped, drawn
    );
    Ok(())
}
