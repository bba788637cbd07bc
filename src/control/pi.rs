//! PI controller for rig height
//!
//! Proportional-integral controller with output clamping. By default the
//! integral accumulates on every step, saturated or not; set
//! [`AntiWindup::Conditional`] to hold it while the output sits on a limit.

use crate::config::{AntiWindup, PiConfig};

/// PI controller
#[derive(Debug, Clone)]
pub struct PiController {
    kp: f64,
    ki: f64,
    dt: f64,
    output_min: f64,
    output_max: f64,
    integral: f64,
    /// Last error seen. Kept for diagnostics; not used by `step`.
    prev_error: f64,
    anti_windup: AntiWindup,
}

impl PiController {
    pub fn new(kp: f64, ki: f64, dt: f64, output_min: f64, output_max: f64) -> Self {
        Self {
            kp,
            ki,
            dt,
            output_min,
            output_max,
            integral: 0.0,
            prev_error: 0.0,
            anti_windup: AntiWindup::Off,
        }
    }

    pub fn from_config(cfg: &PiConfig) -> Self {
        let mut pi = Self::new(cfg.kp, cfg.ki, cfg.dt_secs, cfg.output_min, cfg.output_max);
        pi.anti_windup = cfg.anti_windup;
        pi
    }

    pub fn set_anti_windup(&mut self, mode: AntiWindup) {
        self.anti_windup = mode;
    }

    /// Replace gains, limits and time step; zero the integral and last error.
    pub fn reconfigure(&mut self, dt: f64, output_max: f64, output_min: f64, kp: f64, ki: f64) {
        self.dt = dt;
        self.output_max = output_max;
        self.output_min = output_min;
        self.kp = kp;
        self.ki = ki;
        self.integral = 0.0;
        self.prev_error = 0.0;
    }

    /// One control step. Returns the clamped output.
    pub fn step(&mut self, setpoint: f64, measured: f64) -> f64 {
        let error = setpoint - measured;

        // Proportional
        let p = self.kp * error;

        // Integral
        self.integral += error * self.dt;
        let i = self.ki * self.integral;

        self.prev_error = error;

        let unclamped = p + i;
        let output = unclamped.max(self.output_min).min(self.output_max);

        if self.anti_windup == AntiWindup::Conditional && output != unclamped {
            self.integral -= error * self.dt;
        }

        output
    }

    pub fn integral(&self) -> f64 {
        self.integral
    }

    pub fn previous_error(&self) -> f64 {
        self.prev_error
    }
}
