//! Quadrature yaw decoder.
//!
//! Two phase-shifted encoder channels (A, B) raise an edge interrupt on
//! every level change. The edge handler folds the 2-bit Gray-code transition
//! into a signed count; the yaw activity maps that count to degrees.
//!
//! ```text
//!   left  = A  ^ B'        (B' / A' = levels seen on the previous edge)
//!   right = B  ^ A'
//!   count += right - left  ∈ {-1, 0, +1}
//! ```
//!
//! The displayed angle lives in `[0, max_angle]`. When the mapped count
//! leaves that range the angle wraps and the count is re-seeded so the next
//! read lands on the wrap point again instead of drifting without bound.
//!
//! Readers take a snapshot: an edge arriving mid-read is counted, never
//! lost, because the re-seed is applied as a delta.

use core::sync::atomic::{AtomicI32, AtomicU8, Ordering};

use embedded_hal::digital::InputPin;

use crate::config::QuadratureConfig;

const BIT_A: u8 = 0b01;
const BIT_B: u8 = 0b10;

/// Count-to-angle mapping with its two wrap re-seed points.
#[derive(Debug, Clone, Copy)]
struct AngleMap {
    degrees_per_count: f64,
    max_angle: i32,
    /// Count that maps to 0 degrees.
    zero_count: i32,
    /// Count that maps to `max_angle`.
    max_count: i32,
}

impl AngleMap {
    fn new(cfg: &QuadratureConfig) -> Self {
        Self {
            degrees_per_count: cfg.degrees_per_count,
            max_angle: cfg.max_angle_deg,
            zero_count: 0,
            max_count: (f64::from(cfg.max_angle_deg) / cfg.degrees_per_count).round() as i32,
        }
    }

    fn angle(&self, count: i32) -> i32 {
        (f64::from(count) * self.degrees_per_count).round() as i32
    }
}

/// Decoder state: previous channel levels plus the accumulated count.
pub struct QuadratureDecoder {
    previous: AtomicU8,
    count: AtomicI32,
    map: AngleMap,
}

impl QuadratureDecoder {
    /// Both channels low, count at `initial_count`.
    pub fn new(cfg: &QuadratureConfig) -> Self {
        Self {
            previous: AtomicU8::new(0),
            count: AtomicI32::new(cfg.initial_count),
            map: AngleMap::new(cfg),
        }
    }

    /// Apply one edge. Returns the count delta (-1, 0 or +1).
    pub fn on_edge(&mut self, a: bool, b: bool) -> i32 {
        transition(&self.previous, &self.count, a, b)
    }

    /// Current angle in degrees, wrapping and re-seeding as needed.
    pub fn angle(&mut self) -> i32 {
        wrap_angle(&self.count, &self.map)
    }

    pub fn count(&self) -> i32 {
        self.count.load(Ordering::Relaxed)
    }

    /// Overwrite the accumulated count.
    pub fn set_count(&mut self, count: i32) {
        self.count.store(count, Ordering::Relaxed);
    }

    /// Split into the edge-interrupt half and the yaw-task half.
    pub fn split(&mut self) -> (EdgeHandler<'_>, YawReader<'_>) {
        let this: &Self = self;
        (EdgeHandler { dec: this }, YawReader { dec: this })
    }
}

// ── Split halves ───────────────────────────────────────────────

/// Transition-only half, owned by the edge interrupt.
pub struct EdgeHandler<'a> {
    dec: &'a QuadratureDecoder,
}

impl EdgeHandler<'_> {
    pub fn on_edge(&mut self, a: bool, b: bool) -> i32 {
        transition(&self.dec.previous, &self.dec.count, a, b)
    }
}

/// Angle-only half, owned by the yaw activity.
pub struct YawReader<'a> {
    dec: &'a QuadratureDecoder,
}

impl YawReader<'_> {
    pub fn angle(&mut self) -> i32 {
        wrap_angle(&self.dec.count, &self.dec.map)
    }

    /// Raw count snapshot, for diagnostics.
    pub fn count(&self) -> i32 {
        self.dec.count.load(Ordering::Relaxed)
    }
}

fn transition(previous: &AtomicU8, count: &AtomicI32, a: bool, b: bool) -> i32 {
    let prev = previous.load(Ordering::Relaxed);
    let prev_a = prev & BIT_A != 0;
    let prev_b = prev & BIT_B != 0;

    let left = i32::from(a ^ prev_b);
    let right = i32::from(b ^ prev_a);
    let delta = right - left;

    count.fetch_add(delta, Ordering::Relaxed);
    previous.store(u8::from(a) | (u8::from(b) << 1), Ordering::Relaxed);
    delta
}

fn wrap_angle(count: &AtomicI32, map: &AngleMap) -> i32 {
    let observed = count.load(Ordering::Relaxed);
    let angle = map.angle(observed);
    if angle > map.max_angle {
        count.fetch_add(map.zero_count - observed, Ordering::Relaxed);
        0
    } else if angle < 0 {
        count.fetch_add(map.max_count - observed, Ordering::Relaxed);
        map.max_angle
    } else {
        angle
    }
}

// ── Edge ISR ───────────────────────────────────────────────────

/// Edge interrupt body: sample both channel pins, then decode.
///
/// Registered on both channels; whichever fired, both levels are read.
pub struct EncoderIsr<'a, A, B> {
    pin_a: A,
    pin_b: B,
    edges: EdgeHandler<'a>,
}

impl<'a, A, B> EncoderIsr<'a, A, B>
where
    A: InputPin,
    B: InputPin<Error = A::Error>,
{
    pub fn new(pin_a: A, pin_b: B, edges: EdgeHandler<'a>) -> Self {
        Self { pin_a, pin_b, edges }
    }

    pub fn on_edge(&mut self) -> Result<i32, A::Error> {
        let a = self.pin_a.is_high()?;
        let b = self.pin_b.is_high()?;
        Ok(self.edges.on_edge(a, b))
    }
}
