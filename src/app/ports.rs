//! Port traits: the boundary between the control core and the rig.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Coordinator / sampler (domain)
//! ```
//!
//! Driven adapters (display, ADC) implement these traits. The domain
//! consumes them through generics, so nothing in the core touches a
//! peripheral directly.

use super::display::DisplayMessage;

// ───────────────────────────────────────────────────────────────
// Display sink (driven adapter: domain → screen)
// ───────────────────────────────────────────────────────────────

/// Renders one message at its line and column.
///
/// Text wider than the panel is the sink's business (truncate or wrap).
pub trait DisplaySink {
    fn draw(&mut self, msg: &DisplayMessage);
}

// ───────────────────────────────────────────────────────────────
// Conversion trigger (driven adapter: tick ISR → ADC)
// ───────────────────────────────────────────────────────────────

/// Starts one ADC conversion. The result arrives later through
/// [`SamplerIsr::on_sample_ready`](crate::sensors::height::SamplerIsr::on_sample_ready).
///
/// Called from interrupt context: must not block.
pub trait ConversionTrigger {
    fn trigger(&mut self);
}
