//! Fixed-capacity circular sample buffer.
//!
//! One producer (the sample-ready interrupt) writes raw ADC samples, one
//! consumer (the height activity) reads them back. Storage is a statically
//! sized arena of atomics so both halves can live in different execution
//! contexts without locks.
//!
//! ```text
//!            write_index                 read_index
//!                 │                           │
//!   ┌────┬────┬───▼┬────┐      ┌────┬────┬───▼┬────┐
//!   │ s0 │ s1 │    │    │ ...  │ s0 │ s1 │ s2 │ s3 │
//!   └────┴────┴────┴────┘      └────┴────┴────┴────┘
//!        producer (ISR)             consumer (task)
//! ```
//!
//! The buffer does NOT detect under-run or overrun. A read past the
//! producer returns whatever the slot held (zero after `create`); a write
//! that laps the reader overwrites the oldest unread sample. Averaging
//! consumers rely on this: draining `capacity` entries always yields the
//! most recent window once the buffer has been filled once.

use core::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use crate::error::BufferError;

/// Raw 32-bit ADC sample.
pub type Sample = u32;

/// Slots reserved per buffer. `create` accepts any capacity up to this.
pub const MAX_SAMPLE_CAPACITY: usize = 64;

/// Buffer sized for the sensor pipeline.
pub type SampleBuffer = CircularBuffer<MAX_SAMPLE_CAPACITY>;

pub struct CircularBuffer<const N: usize> {
    slots: [AtomicU32; N],
    capacity: usize,
    write_index: AtomicUsize,
    read_index: AtomicUsize,
}

impl<const N: usize> CircularBuffer<N> {
    /// An empty buffer of capacity 0. Call [`create`](Self::create) before use.
    pub const fn new() -> Self {
        Self {
            slots: [const { AtomicU32::new(0) }; N],
            capacity: 0,
            write_index: AtomicUsize::new(0),
            read_index: AtomicUsize::new(0),
        }
    }

    /// Reserve `capacity` zeroed slots and reset both indices.
    ///
    /// A capacity of 0 is accepted: writes become no-ops and reads return 0.
    pub fn create(&mut self, capacity: usize) -> Result<(), BufferError> {
        if capacity > N {
            return Err(BufferError::CapacityExceeded {
                requested: capacity,
                max: N,
            });
        }
        for slot in &self.slots[..capacity] {
            slot.store(0, Ordering::Relaxed);
        }
        self.capacity = capacity;
        self.write_index.store(0, Ordering::Relaxed);
        self.read_index.store(0, Ordering::Relaxed);
        Ok(())
    }

    /// Store `sample` at the write index and advance it (wrapping).
    pub fn write(&mut self, sample: Sample) {
        store(&self.slots, self.capacity, &self.write_index, sample);
    }

    /// Return the sample at the read index and advance it (wrapping).
    pub fn read(&mut self) -> Sample {
        load(&self.slots, self.capacity, &self.read_index)
    }

    /// Drop the reservation. Capacity and both indices return to 0.
    pub fn release(&mut self) {
        for slot in &self.slots {
            slot.store(0, Ordering::Relaxed);
        }
        self.capacity = 0;
        self.write_index.store(0, Ordering::Relaxed);
        self.read_index.store(0, Ordering::Relaxed);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn write_index(&self) -> usize {
        self.write_index.load(Ordering::Relaxed)
    }

    pub fn read_index(&self) -> usize {
        self.read_index.load(Ordering::Relaxed)
    }

    /// Split into the single producer and single consumer halves.
    ///
    /// The exclusive borrow guarantees no third party can write, read or
    /// re-create the buffer while the halves are alive.
    pub fn split(&mut self) -> (SampleWriter<'_, N>, SampleReader<'_, N>) {
        let this: &Self = self;
        (SampleWriter { buf: this }, SampleReader { buf: this })
    }
}

impl<const N: usize> Default for CircularBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

// ── Producer / consumer halves ─────────────────────────────────

/// Write-only half, owned by the sample-ready interrupt.
pub struct SampleWriter<'a, const N: usize> {
    buf: &'a CircularBuffer<N>,
}

impl<const N: usize> SampleWriter<'_, N> {
    pub fn write(&mut self, sample: Sample) {
        store(&self.buf.slots, self.buf.capacity, &self.buf.write_index, sample);
    }
}

/// Read-only half, owned by the height activity.
pub struct SampleReader<'a, const N: usize> {
    buf: &'a CircularBuffer<N>,
}

impl<const N: usize> SampleReader<'_, N> {
    pub fn read(&mut self) -> Sample {
        load(&self.buf.slots, self.buf.capacity, &self.buf.read_index)
    }

    pub fn capacity(&self) -> usize {
        self.buf.capacity
    }
}

// ── Index helpers ──────────────────────────────────────────────
//
// Each index has exactly one mutator, so a load/store pair is enough;
// no read-modify-write is needed.

fn store(slots: &[AtomicU32], capacity: usize, index: &AtomicUsize, sample: Sample) {
    if capacity == 0 {
        return;
    }
    let i = index.load(Ordering::Relaxed);
    slots[i].store(sample, Ordering::Relaxed);
    index.store(next(i, capacity), Ordering::Relaxed);
}

fn load(slots: &[AtomicU32], capacity: usize, index: &AtomicUsize) -> Sample {
    if capacity == 0 {
        return 0;
    }
    let i = index.load(Ordering::Relaxed);
    let sample = slots[i].load(Ordering::Relaxed);
    index.store(next(i, capacity), Ordering::Relaxed);
    sample
}

#[inline]
fn next(i: usize, capacity: usize) -> usize {
    if i + 1 >= capacity { 0 } else { i + 1 }
}
