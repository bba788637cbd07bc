//! Integration tests for the interrupt-side → task-side data paths.
//!
//! Producer halves run on their own threads, standing in for the tick and
//! edge interrupts; the consumer halves are read back on the test thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use helirig::adapters::sim::{SimulatedAdc, SimulatedEncoder};
use helirig::circ_buf::{MAX_SAMPLE_CAPACITY, SampleBuffer};
use helirig::config::SystemConfig;
use helirig::drivers::hw_timer::PeriodicTimer;
use helirig::error::BufferError;
use helirig::sensors::{EncoderIsr, HeightEstimator, QuadratureDecoder, SamplerIsr};
use helirig::Error;

#[test]
fn tick_thread_fills_window_for_height_task() {
    let config = SystemConfig::default();
    let mut buf = SampleBuffer::new();
    buf.create(usize::from(config.sample_buffer_capacity)).unwrap();
    let (tx, rx) = buf.split();

    thread::scope(|s| {
        s.spawn(move || {
            let mut isr = SamplerIsr::new(SimulatedAdc::new(2050, 0, 10), tx);
            for _ in 0..config.sample_buffer_capacity {
                isr.on_tick();
                if let Some(sample) = isr.trigger_mut().take_conversion() {
                    isr.on_sample_ready(sample);
                }
            }
        });
    });

    let mut height = HeightEstimator::new(rx, config.height_map);
    let reading = height.compute_height();
    assert_eq!(reading.average, 2050);
    assert_eq!(reading.height, 76);
}

#[test]
fn timer_driven_sampler_stops_on_flag() {
    let config = SystemConfig::default();
    let mut buf = SampleBuffer::new();
    buf.create(usize::from(config.sample_buffer_capacity)).unwrap();
    let (tx, rx) = buf.split();
    let stop = AtomicBool::new(false);

    let ticks = thread::scope(|s| {
        let stop = &stop;
        s.spawn(move || {
            let mut isr = SamplerIsr::new(SimulatedAdc::new(1000, 0, 10), tx);
            let mut n = 0;
            PeriodicTimer::new("test tick", Duration::from_millis(1)).run_until(stop, || {
                isr.on_tick();
                if let Some(sample) = isr.trigger_mut().take_conversion() {
                    isr.on_sample_ready(sample);
                }
                n += 1;
                if n == 6 {
                    stop.store(true, Ordering::Relaxed);
                }
            })
        })
        .join()
        .unwrap()
    });

    assert_eq!(ticks, 6);
    let mut height = HeightEstimator::new(rx, config.height_map);
    assert_eq!(height.compute_height().average, 1000);
}

#[test]
fn edge_thread_moves_yaw() {
    let config = SystemConfig::default();
    let mut decoder = QuadratureDecoder::new(&config.quadrature);
    let (edges, mut yaw) = decoder.split();
    let encoder = SimulatedEncoder::new(1000);

    thread::scope(|s| {
        let encoder = &encoder;
        s.spawn(move || {
            let (pin_a, pin_b) = encoder.pins();
            let mut isr = EncoderIsr::new(pin_a, pin_b, edges);
            for _ in 0..100 {
                encoder.advance();
                isr.on_edge().unwrap();
            }
        });
    });

    // seed 1 + 100 edges = 101 counts = 80.8 deg
    assert_eq!(yaw.count(), 101);
    assert_eq!(yaw.angle(), 81);
}

#[test]
fn yaw_wraps_past_full_turn_and_stays_put() {
    let config = SystemConfig::default();
    let mut decoder = QuadratureDecoder::new(&config.quadrature);
    decoder.set_count(449);
    let (edges, mut yaw) = decoder.split();
    let encoder = SimulatedEncoder::new(1000);

    assert_eq!(yaw.angle(), 359);
    {
        let (pin_a, pin_b) = encoder.pins();
        let mut isr = EncoderIsr::new(pin_a, pin_b, edges);
        encoder.advance();
        isr.on_edge().unwrap();
        encoder.advance();
        isr.on_edge().unwrap();
    }
    // 451 counts = 360.8 deg
    assert_eq!(yaw.angle(), 0);
    assert_eq!(yaw.angle(), 0);
    assert_eq!(yaw.count(), 0);
}

#[test]
fn oversized_buffer_is_refused_at_startup() {
    let mut buf = SampleBuffer::new();
    let err = buf.create(MAX_SAMPLE_CAPACITY + 1).unwrap_err();
    assert_eq!(
        err,
        BufferError::CapacityExceeded {
            requested: MAX_SAMPLE_CAPACITY + 1,
            max: MAX_SAMPLE_CAPACITY,
        }
    );
    assert!(matches!(Error::from(err), Error::Buffer(_)));
}
