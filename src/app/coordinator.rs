//! Coordinator: the task-side core of the rig.
//!
//! [`Coordinator`] owns the consumer halves of the sample buffer and the
//! yaw decoder, the PI controller and the display [`Publisher`]. `run`
//! drives three periodic activities on one local executor:
//!
//! ```text
//!  SampleReader ──▶ ┌──────────────┐
//!                   │ height + PI  │──┐
//!                   └──────────────┘  │  Publisher    ┌─────────┐
//!  YawReader ─────▶ ┌──────────────┐  ├─────────────▶ │ channel │──▶ display ──▶ DisplaySink
//!                   │ yaw          │──┘               └─────────┘    activity
//!                   └──────────────┘
//! ```
//!
//! Each activity sleeps a fixed delay after every iteration. An iteration
//! that runs long pushes the next one back; nothing is skipped.

use core::cell::Cell;

use edge_executor::LocalExecutor;
use embassy_time::{Duration, Timer};
use futures_lite::future;
use log::{debug, error, info, warn};

use crate::circ_buf::MAX_SAMPLE_CAPACITY;
use crate::config::SystemConfig;
use crate::control::pi::PiController;
use crate::error::{Error, Result};
use crate::sensors::height::{HeightEstimator, HeightReading};
use crate::sensors::yaw::YawReader;

use super::display::{DisplayChannel, DisplayMessage, Publisher, TITLE_LINE};
use super::ports::DisplaySink;

// ───────────────────────────────────────────────────────────────
// Activities
// ───────────────────────────────────────────────────────────────

/// Result of one height iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightStep {
    pub reading: HeightReading,
    pub control_output: f64,
}

/// Drain, average, map, then run the PI step on the new height.
pub struct HeightActivity<'a, const N: usize = MAX_SAMPLE_CAPACITY> {
    estimator: HeightEstimator<'a, N>,
    pi: PiController,
    setpoint: f64,
}

impl<'a, const N: usize> HeightActivity<'a, N> {
    pub fn new(estimator: HeightEstimator<'a, N>, pi: PiController, setpoint: f64) -> Self {
        Self {
            estimator,
            pi,
            setpoint,
        }
    }

    pub fn step(&mut self) -> HeightStep {
        let reading = self.estimator.compute_height();
        let control_output = self.pi.step(self.setpoint, f64::from(reading.height));
        debug!(
            "height: avg={} height={} pi_out={:.2} integral={:.2}",
            reading.average,
            reading.height,
            control_output,
            self.pi.integral()
        );
        HeightStep {
            reading,
            control_output,
        }
    }

    pub fn pi(&self) -> &PiController {
        &self.pi
    }
}

/// Read the yaw angle.
pub struct YawActivity<'a> {
    reader: YawReader<'a>,
}

impl<'a> YawActivity<'a> {
    pub fn new(reader: YawReader<'a>) -> Self {
        Self { reader }
    }

    pub fn step(&mut self) -> i32 {
        let angle = self.reader.angle();
        debug!("yaw: count={} angle={}", self.reader.count(), angle);
        angle
    }
}

// ───────────────────────────────────────────────────────────────
// Coordinator
// ───────────────────────────────────────────────────────────────

/// Iteration and message counts for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub height_iterations: u32,
    pub yaw_iterations: u32,
    pub messages_rendered: u32,
    pub messages_dropped: u32,
}

#[derive(Default)]
struct Counters {
    height: Cell<u32>,
    yaw: Cell<u32>,
    rendered: Cell<u32>,
}

fn bump(c: &Cell<u32>) {
    c.set(c.get().wrapping_add(1));
}

pub struct Coordinator<'a, const N: usize = MAX_SAMPLE_CAPACITY> {
    height: HeightActivity<'a, N>,
    yaw: YawActivity<'a>,
    publisher: Publisher<'a>,
    height_period: Duration,
    yaw_period: Duration,
}

impl<'a, const N: usize> Coordinator<'a, N> {
    /// Wire the task-side halves to `channel` using the periods, map and
    /// gains in `config`.
    pub fn new(
        estimator: HeightEstimator<'a, N>,
        yaw: YawReader<'a>,
        channel: &'a DisplayChannel,
        config: &SystemConfig,
    ) -> Self {
        let pi = PiController::from_config(&config.pi);
        Self {
            height: HeightActivity::new(estimator, pi, config.pi.setpoint),
            yaw: YawActivity::new(yaw),
            publisher: Publisher::new(
                channel,
                Duration::from_millis(u64::from(config.publish_wait_ms)),
                config.overflow_policy,
            ),
            height_period: Duration::from_millis(u64::from(config.height_task_period_ms)),
            yaw_period: Duration::from_millis(u64::from(config.yaw_task_period_ms)),
        }
    }

    pub fn publisher(&self) -> &Publisher<'a> {
        &self.publisher
    }

    /// One height iteration: its messages for lines 1 and 3.
    pub fn height_messages(&mut self) -> [DisplayMessage; 2] {
        let step = self.height.step();
        [
            DisplayMessage::height(step.reading.height),
            DisplayMessage::control(step.control_output),
        ]
    }

    /// One yaw iteration: its message for line 2.
    pub fn yaw_message(&mut self) -> DisplayMessage {
        DisplayMessage::angle(self.yaw.step())
    }

    /// Draw the title, then run every activity until `run_for` elapses
    /// (forever if `None`) or one of them halts.
    pub fn run<S: DisplaySink>(self, sink: &mut S, run_for: Option<Duration>) -> Result<RunSummary> {
        let Self {
            height,
            yaw,
            publisher,
            height_period,
            yaw_period,
        } = self;
        let counters = Counters::default();

        sink.draw(&DisplayMessage::title());
        info!(
            "coordinator: height every {}ms, yaw every {}ms, policy {:?}",
            height_period.as_millis(),
            yaw_period.as_millis(),
            publisher.policy()
        );

        let executor: LocalExecutor<'_, 4> = LocalExecutor::new();

        let height_task = executor.spawn(height_loop(height, &publisher, &counters.height, height_period));
        let yaw_task = executor.spawn(yaw_loop(yaw, &publisher, &counters.yaw, yaw_period));
        let display_task = executor.spawn(display_loop(publisher.channel(), sink, &counters.rendered));

        let stop = async {
            match run_for {
                Some(d) => {
                    Timer::after(d).await;
                }
                None => future::pending::<()>().await,
            }
            Ok::<(), Error>(())
        };

        let outcome = future::block_on(executor.run(future::or(
            future::or(height_task, yaw_task),
            future::or(display_task, stop),
        )));

        let summary = RunSummary {
            height_iterations: counters.height.get(),
            yaw_iterations: counters.yaw.get(),
            messages_rendered: counters.rendered.get(),
            messages_dropped: publisher.dropped(),
        };

        match outcome {
            Ok(()) => {
                info!("coordinator: stopped, {:?}", summary);
                Ok(summary)
            }
            Err(e) => {
                error!("coordinator: {} ({:?})", e, summary);
                Err(e)
            }
        }
    }
}

// ── Activity loops ────────────────────────────────────────────

async fn height_loop<const N: usize>(
    mut activity: HeightActivity<'_, N>,
    publisher: &Publisher<'_>,
    iterations: &Cell<u32>,
    period: Duration,
) -> Result<()> {
    loop {
        let step = activity.step();
        publisher
            .publish(DisplayMessage::height(step.reading.height), "height")
            .await?;
        publisher
            .publish(DisplayMessage::control(step.control_output), "height")
            .await?;
        bump(iterations);
        Timer::after(period).await;
    }
}

async fn yaw_loop(
    mut activity: YawActivity<'_>,
    publisher: &Publisher<'_>,
    iterations: &Cell<u32>,
    period: Duration,
) -> Result<()> {
    loop {
        let angle = activity.step();
        publisher.publish(DisplayMessage::angle(angle), "yaw").await?;
        bump(iterations);
        Timer::after(period).await;
    }
}

async fn display_loop<S: DisplaySink>(
    channel: &DisplayChannel,
    sink: &mut S,
    rendered: &Cell<u32>,
) -> Result<()> {
    loop {
        let msg = channel.receive().await;
        if msg.line == TITLE_LINE {
            warn!("display: dropping message for reserved line 0: {:?}", msg.text.as_str());
            continue;
        }
        sink.draw(&msg);
        bump(rendered);
    }
}
