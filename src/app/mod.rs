//! Application core: display messaging and task coordination.
//!
//! Everything here is pure domain logic. The display and the ADC are
//! reached only through the **port traits** in [`ports`], so the whole
//! layer runs on the host against mock adapters.

pub mod coordinator;
pub mod display;
pub mod ports;

pub use coordinator::{Coordinator, RunSummary};
pub use display::{DisplayChannel, DisplayMessage, Publisher};
