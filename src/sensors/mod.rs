//! Sensor subsystem: the interrupt-fed height sampler and yaw decoder.
//!
//! Each sensor splits into an interrupt-side half and a task-side half.
//! The interrupt half can only produce, the task half can only consume, so
//! the single-writer / single-reader discipline holds by construction.

pub mod height;
pub mod yaw;

pub use height::{HeightEstimator, HeightReading, SamplerIsr};
pub use yaw::{EdgeHandler, EncoderIsr, QuadratureDecoder, YawReader};
