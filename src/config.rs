//! System configuration parameters
//!
//! All tunable parameters for the HeliRig control core. Defaults are the
//! reference rig's values; the host binary can override them from a JSON
//! file.

use serde::{Deserialize, Serialize};

use crate::circ_buf::MAX_SAMPLE_CAPACITY;
use crate::error::{Error, Result};

/// What a periodic activity does when the display channel stays full for
/// the whole publish wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverflowPolicy {
    /// Stop the activity and surface `Error::Halted` (fail fast).
    Halt,
    /// Log, count and discard the message that could not be queued.
    DropNewest,
}

/// Integral handling while the PI output is saturated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AntiWindup {
    /// Integrate unconditionally, even while the output is clamped.
    Off,
    /// Undo the integration step whenever the output lands on a limit.
    Conditional,
}

/// Linear map from averaged raw ADC counts to height units.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HeightMapConfig {
    /// Height units per ADC count (negative: more counts, lower rig).
    pub slope: f64,
    /// Height at zero counts.
    pub intercept: f64,
}

/// Quadrature count to yaw angle mapping.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QuadratureConfig {
    /// Degrees of yaw per decoded edge.
    pub degrees_per_count: f64,
    /// Count the decoder starts from.
    pub initial_count: i32,
    /// Largest displayed angle; anything above wraps to 0.
    pub max_angle_deg: i32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PiConfig {
    pub kp: f64,
    pub ki: f64,
    /// Integration step in seconds.
    pub dt_secs: f64,
    pub output_min: f64,
    pub output_max: f64,
    /// Target height fed to every control step.
    pub setpoint: f64,
    pub anti_windup: AntiWindup,
}

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Sampling ---
    /// Slots in the sample ring; also the averaging window.
    pub sample_buffer_capacity: u16,
    /// Tick source frequency (Hz).
    pub sample_rate_hz: u32,

    // --- Tasks ---
    /// Height averaging + PI + publish period (milliseconds).
    pub height_task_period_ms: u32,
    /// Yaw decode + publish period (milliseconds).
    pub yaw_task_period_ms: u32,
    /// Bounded wait for a full display channel (milliseconds).
    pub publish_wait_ms: u32,
    pub overflow_policy: OverflowPolicy,

    pub height_map: HeightMapConfig,
    pub quadrature: QuadratureConfig,
    pub pi: PiConfig,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Sampling
            sample_buffer_capacity: 4,
            sample_rate_hz: 10,

            // Tasks
            height_task_period_ms: 25,
            yaw_task_period_ms: 100,
            publish_wait_ms: 10, // 10 ticks of the 1 kHz scheduler
            overflow_policy: OverflowPolicy::Halt,

            height_map: HeightMapConfig {
                slope: -0.081,
                intercept: 242.0,
            },
            quadrature: QuadratureConfig {
                degrees_per_count: 0.8,
                initial_count: 1,
                max_angle_deg: 359,
            },
            pi: PiConfig {
                kp: 1.0,
                ki: 0.5,
                dt_secs: 0.025,
                output_min: 0.0,
                output_max: 100.0,
                setpoint: 50.0,
                anti_windup: AntiWindup::Off,
            },
        }
    }
}

impl SystemConfig {
    /// Reject values that would break a runtime invariant.
    pub fn validate(&self) -> Result<()> {
        if usize::from(self.sample_buffer_capacity) > MAX_SAMPLE_CAPACITY {
            return Err(Error::Config("sample_buffer_capacity exceeds arena"));
        }
        if self.sample_rate_hz == 0 {
            return Err(Error::Config("sample_rate_hz must be > 0"));
        }
        if self.height_task_period_ms == 0 || self.yaw_task_period_ms == 0 {
            return Err(Error::Config("task periods must be > 0"));
        }
        if self.publish_wait_ms == 0 {
            return Err(Error::Config("publish_wait_ms must be > 0"));
        }
        if self.pi.output_min > self.pi.output_max {
            return Err(Error::Config("pi.output_min above pi.output_max"));
        }
        if self.pi.dt_secs <= 0.0 {
            return Err(Error::Config("pi.dt_secs must be > 0"));
        }
        if self.quadrature.degrees_per_count <= 0.0 {
            return Err(Error::Config("quadrature.degrees_per_count must be > 0"));
        }
        if self.quadrature.max_angle_deg <= 0 {
            return Err(Error::Config("quadrature.max_angle_deg must be > 0"));
        }
        Ok(())
    }

    /// Tick source period in microseconds.
    pub fn sample_period_us(&self) -> u64 {
        1_000_000 / u64::from(self.sample_rate_hz.max(1))
    }
}
