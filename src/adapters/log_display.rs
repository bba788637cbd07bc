//! Log-based display sink adapter.
//!
//! Implements [`DisplaySink`] by writing each message to the `log` facade
//! as `OLED[line:col] text`. Stands in for the OLED driver on the host; a
//! panel driver would implement the same trait.

use log::info;

use crate::app::display::DisplayMessage;
use crate::app::ports::DisplaySink;

/// Adapter that logs every [`DisplayMessage`] instead of drawing it.
#[derive(Debug, Default)]
pub struct LogDisplaySink {
    drawn: u32,
}

impl LogDisplaySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages drawn so far, title included.
    pub fn drawn(&self) -> u32 {
        self.drawn
    }
}

impl DisplaySink for LogDisplaySink {
    fn draw(&mut self, msg: &DisplayMessage) {
        self.drawn = self.drawn.wrapping_add(1);
        info!("OLED[{}:{}] {}", msg.line, msg.column, msg.text);
    }
}
