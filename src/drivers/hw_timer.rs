//! Periodic interrupt sources on the host.
//!
//! On the rig the sample tick and the encoder edges are hardware
//! interrupts. Here each source is a thread that invokes its handler at a
//! fixed rate until a shared stop flag is raised. Deadlines advance by a
//! whole period every time, so a late wake-up does not shift later ticks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use log::{debug, info};

/// Fixed-rate tick generator.
#[derive(Debug, Clone, Copy)]
pub struct PeriodicTimer {
    name: &'static str,
    period: Duration,
}

impl PeriodicTimer {
    pub fn new(name: &'static str, period: Duration) -> Self {
        Self { name, period }
    }

    /// Call `on_tick` once per period until `stop` is set. Returns the tick count.
    pub fn run_until(&self, stop: &AtomicBool, mut on_tick: impl FnMut()) -> u64 {
        info!("hw_timer(sim): {} every {:?}", self.name, self.period);
        let mut ticks = 0u64;
        let mut deadline = Instant::now() + self.period;
        while !stop.load(Ordering::Relaxed) {
            let now = Instant::now();
            if deadline > now {
                std::thread::sleep(deadline - now);
            }
            if stop.load(Ordering::Relaxed) {
                break;
            }
            on_tick();
            ticks += 1;
            deadline += self.period;
        }
        debug!("hw_timer(sim): {} stopped after {} ticks", self.name, ticks);
        ticks
    }
}
