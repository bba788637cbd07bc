//! Simulated rig peripherals for host runs.
//!
//! - [`SimulatedAdc`]: a conversion trigger whose "conversion" samples a
//!   triangle wave, standing in for the height sensor ADC.
//! - [`SimulatedEncoder`]: two channel levels stepped through the Gray
//!   sequence, sweeping back and forth; read through [`SimPin`]s.

use core::convert::Infallible;
use core::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering};

use embedded_hal::digital::{ErrorType, InputPin};

use crate::app::ports::ConversionTrigger;
use crate::circ_buf::Sample;

/// Full scale of the 12-bit converter.
pub const ADC_MAX: Sample = 4095;

// ── ADC ───────────────────────────────────────────────────────

pub struct SimulatedAdc {
    base: Sample,
    amplitude: Sample,
    period_ticks: u32,
    tick: u32,
    pending: bool,
}

impl SimulatedAdc {
    /// Triangle wave from `base` to `base + amplitude` and back every
    /// `period_ticks` conversions.
    pub fn new(base: Sample, amplitude: Sample, period_ticks: u32) -> Self {
        Self {
            base,
            amplitude,
            period_ticks,
            tick: 0,
            pending: false,
        }
    }

    /// Complete the requested conversion, if any.
    pub fn take_conversion(&mut self) -> Option<Sample> {
        if !self.pending {
            return None;
        }
        self.pending = false;
        let sample = self.sample_at(self.tick);
        self.tick = self.tick.wrapping_add(1);
        Some(sample)
    }

    fn sample_at(&self, tick: u32) -> Sample {
        let half = self.period_ticks / 2;
        if half == 0 {
            return self.base.min(ADC_MAX);
        }
        let phase = tick % self.period_ticks;
        let ramp = if phase < half { phase } else { self.period_ticks - phase };
        let offset = u64::from(self.amplitude) * u64::from(ramp) / u64::from(half);
        (u64::from(self.base) + offset).min(u64::from(ADC_MAX)) as Sample
    }
}

impl ConversionTrigger for SimulatedAdc {
    fn trigger(&mut self) {
        self.pending = true;
    }
}

// ── Encoder ───────────────────────────────────────────────────

/// Channel levels in the order that raises the decoder count.
const GRAY: [(bool, bool); 4] = [(false, false), (false, true), (true, true), (true, false)];

pub struct SimulatedEncoder {
    a: AtomicBool,
    b: AtomicBool,
    phase: AtomicU8,
    increasing: AtomicBool,
    /// Edges per sweep before reversing.
    sweep: u32,
    edges_in_sweep: AtomicU32,
}

impl SimulatedEncoder {
    pub fn new(sweep: u32) -> Self {
        Self {
            a: AtomicBool::new(false),
            b: AtomicBool::new(false),
            phase: AtomicU8::new(0),
            increasing: AtomicBool::new(true),
            sweep,
            edges_in_sweep: AtomicU32::new(0),
        }
    }

    /// Both channel pins.
    pub fn pins(&self) -> (SimPin<'_>, SimPin<'_>) {
        (SimPin(&self.a), SimPin(&self.b))
    }

    /// Move one Gray step, reversing direction after every full sweep.
    pub fn advance(&self) {
        let phase = self.phase.load(Ordering::Relaxed);
        let next = if self.increasing.load(Ordering::Relaxed) {
            (phase + 1) % 4
        } else {
            (phase + 3) % 4
        };
        self.phase.store(next, Ordering::Relaxed);

        let (a, b) = GRAY[usize::from(next)];
        self.a.store(a, Ordering::Relaxed);
        self.b.store(b, Ordering::Relaxed);

        let done = self.edges_in_sweep.load(Ordering::Relaxed) + 1;
        if done >= self.sweep {
            self.edges_in_sweep.store(0, Ordering::Relaxed);
            self.increasing.fetch_xor(true, Ordering::Relaxed);
        } else {
            self.edges_in_sweep.store(done, Ordering::Relaxed);
        }
    }
}

/// Digital input backed by a simulated level.
pub struct SimPin<'a>(&'a AtomicBool);

impl ErrorType for SimPin<'_> {
    type Error = Infallible;
}

impl InputPin for SimPin<'_> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.load(Ordering::Relaxed))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.0.load(Ordering::Relaxed))
    }
}
