//! Height sampler pipeline.
//!
//! Interrupt side: the tick ISR requests a conversion, the sample-ready ISR
//! pushes the result into the circular buffer. Task side: the height
//! activity drains one full window, averages it with rounding and maps the
//! average to height units through the rig's linear calibration.
//!
//! ```text
//!  tick ──▶ SamplerIsr::on_tick ──▶ ConversionTrigger
//!                                          │
//!  ADC done ──▶ SamplerIsr::on_sample_ready ──▶ SampleWriter
//!                                                   │ ring
//!  height task ──▶ HeightEstimator::compute_height ◀─┘
//! ```
//!
//! If the window is shorter than the task period needs, the average mixes
//! in stale samples. That loss is accepted and not reported.

use crate::app::ports::ConversionTrigger;
use crate::circ_buf::{MAX_SAMPLE_CAPACITY, Sample, SampleReader, SampleWriter};
use crate::config::HeightMapConfig;

// ── Interrupt side ─────────────────────────────────────────────

/// Tick + sample-ready interrupt bodies.
pub struct SamplerIsr<'a, T, const N: usize = MAX_SAMPLE_CAPACITY> {
    trigger: T,
    writer: SampleWriter<'a, N>,
}

impl<'a, T: ConversionTrigger, const N: usize> SamplerIsr<'a, T, N> {
    pub fn new(trigger: T, writer: SampleWriter<'a, N>) -> Self {
        Self { trigger, writer }
    }

    /// Periodic tick: start a conversion. Never touches the buffer.
    #[inline]
    pub fn on_tick(&mut self) {
        self.trigger.trigger();
    }

    /// Conversion complete: store the sample. O(1), non-blocking.
    #[inline]
    pub fn on_sample_ready(&mut self, sample: Sample) {
        self.writer.write(sample);
    }

    pub fn trigger_mut(&mut self) -> &mut T {
        &mut self.trigger
    }
}

// ── Task side ──────────────────────────────────────────────────

/// One averaged window and its mapped height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeightReading {
    /// Rounded mean of the raw window.
    pub average: u32,
    /// `round(slope * average + intercept)`.
    pub height: i32,
}

pub struct HeightEstimator<'a, const N: usize = MAX_SAMPLE_CAPACITY> {
    reader: SampleReader<'a, N>,
    map: HeightMapConfig,
}

impl<'a, const N: usize> HeightEstimator<'a, N> {
    pub fn new(reader: SampleReader<'a, N>, map: HeightMapConfig) -> Self {
        Self { reader, map }
    }

    /// Drain `capacity` samples, average and map them.
    pub fn compute_height(&mut self) -> HeightReading {
        let capacity = self.reader.capacity();
        let sum: u64 = (0..capacity).map(|_| u64::from(self.reader.read())).sum();
        let average = rounded_mean(sum, capacity as u64);
        HeightReading {
            average,
            height: map_height(&self.map, average),
        }
    }
}

/// `(2*sum + n) / (2*n)`: integer mean rounded half up. 0 for an empty window.
pub fn rounded_mean(sum: u64, n: u64) -> u32 {
    if n == 0 {
        return 0;
    }
    ((2 * sum + n) / (2 * n)) as u32
}

pub fn map_height(map: &HeightMapConfig, average: u32) -> i32 {
    (map.slope * f64::from(average) + map.intercept).round() as i32
}
