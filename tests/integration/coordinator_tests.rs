//! Integration tests for the coordinator: activities → channel → sink.

use embassy_time::Duration;
use futures_lite::future::block_on;

use helirig::app::display::{Delivery, DisplayChannel, DisplayMessage, DISPLAY_QUEUE_DEPTH, TITLE};
use helirig::app::Coordinator;
use helirig::circ_buf::SampleBuffer;
use helirig::config::{OverflowPolicy, SystemConfig};
use helirig::sensors::{HeightEstimator, QuadratureDecoder};
use helirig::Error;

use crate::mock_display::RecordingSink;

const REFERENCE_RAW: u32 = 2050;

fn filled_buffer(buf: &mut SampleBuffer, config: &SystemConfig) {
    let capacity = usize::from(config.sample_buffer_capacity);
    buf.create(capacity).unwrap();
    for _ in 0..capacity {
        buf.write(REFERENCE_RAW);
    }
}

// ── Full run ──────────────────────────────────────────────────

#[test]
fn run_renders_title_then_reference_lines() {
    let _ = env_logger::builder().is_test(true).try_init();
    let config = SystemConfig::default();
    let mut buf = SampleBuffer::new();
    filled_buffer(&mut buf, &config);
    let (_, rx) = buf.split();
    let mut decoder = QuadratureDecoder::new(&config.quadrature);
    let (_, yaw) = decoder.split();
    let channel = DisplayChannel::new();

    let coordinator = Coordinator::new(HeightEstimator::new(rx, config.height_map), yaw, &channel, &config);
    let mut sink = RecordingSink::new();
    let summary = coordinator
        .run(&mut sink, Some(Duration::from_millis(160)))
        .expect("default run must not halt");

    assert_eq!(sink.drawn[0], DisplayMessage::title());
    assert_eq!(sink.texts_on(0), vec![TITLE]);

    let heights = sink.texts_on(1);
    assert!(!heights.is_empty());
    assert!(heights.iter().all(|t| *t == "Height (/): 76"));

    let angles = sink.texts_on(2);
    assert!(!angles.is_empty());
    assert!(angles.iter().all(|t| *t == "Angle (deg): 1"));

    // height 76 is above the 50 setpoint: output pinned at the 0 floor
    assert!(sink.texts_on(3).iter().all(|t| *t == "PI out: 0"));

    assert_eq!(summary.messages_rendered as usize, sink.drawn.len() - 1);
    assert!(summary.height_iterations >= summary.yaw_iterations);
    assert_eq!(summary.messages_dropped, 0);
}

#[test]
fn queued_line_zero_message_is_never_rendered() {
    let config = SystemConfig::default();
    let mut buf = SampleBuffer::new();
    filled_buffer(&mut buf, &config);
    let (_, rx) = buf.split();
    let mut decoder = QuadratureDecoder::new(&config.quadrature);
    let (_, yaw) = decoder.split();
    let channel = DisplayChannel::new();

    let coordinator = Coordinator::new(HeightEstimator::new(rx, config.height_map), yaw, &channel, &config);
    coordinator
        .publisher()
        .try_send(DisplayMessage::new(0, 0, "overwrite title"))
        .unwrap();

    let mut sink = RecordingSink::new();
    coordinator.run(&mut sink, Some(Duration::from_millis(50))).unwrap();

    assert_eq!(sink.texts_on(0), vec![TITLE]);
}

// ── Single iterations ─────────────────────────────────────────

#[test]
fn pi_output_follows_setpoint_above_height() {
    let mut config = SystemConfig::default();
    config.pi.setpoint = 100.0;
    let mut buf = SampleBuffer::new();
    filled_buffer(&mut buf, &config);
    let (_, rx) = buf.split();
    let mut decoder = QuadratureDecoder::new(&config.quadrature);
    let (_, yaw) = decoder.split();
    let channel = DisplayChannel::new();
    let mut c = Coordinator::new(HeightEstimator::new(rx, config.height_map), yaw, &channel, &config);

    // error 24: 1.0*24 + 0.5*(24*0.025) = 24.3
    let [height, control] = c.height_messages();
    assert_eq!(height.text.as_str(), "Height (/): 76");
    assert_eq!(control.text.as_str(), "PI out: 24");

    // integral keeps growing: 24 + 0.5*(48*0.025) = 24.6
    let [_, control] = c.height_messages();
    assert_eq!(control.text.as_str(), "PI out: 25");
}

#[test]
fn yaw_message_tracks_decoder() {
    let config = SystemConfig::default();
    let mut buf = SampleBuffer::new();
    buf.create(1).unwrap();
    let (_, rx) = buf.split();
    let mut decoder = QuadratureDecoder::new(&config.quadrature);
    decoder.set_count(450);
    let (_, yaw) = decoder.split();
    let channel = DisplayChannel::new();
    let mut c = Coordinator::new(HeightEstimator::new(rx, config.height_map), yaw, &channel, &config);

    assert_eq!(c.yaw_message().text.as_str(), "Angle (deg): 0");
    assert_eq!(c.yaw_message().text.as_str(), "Angle (deg): 0");
}

// ── Overflow through the coordinator's publisher ──────────────

#[test]
fn undrained_channel_halts_under_default_policy() {
    let config = SystemConfig::default();
    let mut buf = SampleBuffer::new();
    filled_buffer(&mut buf, &config);
    let (_, rx) = buf.split();
    let mut decoder = QuadratureDecoder::new(&config.quadrature);
    let (_, yaw) = decoder.split();
    let channel = DisplayChannel::new();
    let mut c = Coordinator::new(HeightEstimator::new(rx, config.height_map), yaw, &channel, &config);

    for _ in 0..DISPLAY_QUEUE_DEPTH {
        let msg = c.yaw_message();
        assert_eq!(block_on(c.publisher().publish(msg, "yaw")), Ok(Delivery::Queued));
    }
    let msg = c.yaw_message();
    assert_eq!(block_on(c.publisher().publish(msg, "yaw")), Err(Error::Halted("yaw")));
}

#[test]
fn undrained_channel_drops_under_drop_policy() {
    let mut config = SystemConfig::default();
    config.overflow_policy = OverflowPolicy::DropNewest;
    let mut buf = SampleBuffer::new();
    filled_buffer(&mut buf, &config);
    let (_, rx) = buf.split();
    let mut decoder = QuadratureDecoder::new(&config.quadrature);
    let (_, yaw) = decoder.split();
    let channel = DisplayChannel::new();
    let mut c = Coordinator::new(HeightEstimator::new(rx, config.height_map), yaw, &channel, &config);

    for _ in 0..DISPLAY_QUEUE_DEPTH + 2 {
        for msg in c.height_messages() {
            let _ = block_on(c.publisher().publish(msg, "height"));
        }
    }
    // 14 published into 5 slots
    assert_eq!(c.publisher().dropped(), 9);
    assert_eq!(channel.len(), DISPLAY_QUEUE_DEPTH);
}
