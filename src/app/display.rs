//! Display messages and the bounded outbound channel.
//!
//! Periodic activities format fixed-width text messages and push them
//! through a [`Publisher`] into one [`DisplayChannel`]; the display activity
//! is the single consumer.
//!
//! ```text
//! ┌───────────────┐  DisplayMessage  ┌──────────────┐      ┌──────────┐
//! │ height / yaw  │─────────────────▶│ channel (5)  │─────▶│ display  │
//! │  activities   │  Publisher       └──────────────┘      │ activity │
//! └───────────────┘  (bounded wait)                        └──────────┘
//! ```
//!
//! A publish that cannot enqueue within its wait is handed to the
//! configured [`OverflowPolicy`]. The policy lives in the publisher, so
//! every call site gets the same treatment.

use core::cell::Cell;
use core::fmt::{self, Write as _};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{Duration, with_timeout};
use heapless::String;
use log::{error, warn};

use crate::config::OverflowPolicy;
use crate::error::{ChannelError, Error, Result};

/// Visible characters per display line.
pub const TEXT_WIDTH: usize = 16;

/// Outbound queue depth.
pub const DISPLAY_QUEUE_DEPTH: usize = 5;

// ── Line map ──────────────────────────────────────────────────
/// Static title row. Never emitted by the periodic paths.
pub const TITLE_LINE: u8 = 0;
pub const HEIGHT_LINE: u8 = 1;
pub const YAW_LINE: u8 = 2;
pub const CONTROL_LINE: u8 = 3;

pub const TITLE: &str = "HeliRig Project";

pub type DisplayChannel = Channel<CriticalSectionRawMutex, DisplayMessage, DISPLAY_QUEUE_DEPTH>;

/// One line of text for the display sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayMessage {
    pub text: String<TEXT_WIDTH>,
    pub line: u8,
    pub column: u8,
}

impl DisplayMessage {
    /// Message with `text` cut to [`TEXT_WIDTH`].
    pub fn new(line: u8, column: u8, text: &str) -> Self {
        Self::format(line, column, format_args!("{text}"))
    }

    /// Render `args`, keeping only what fits in [`TEXT_WIDTH`].
    pub fn format(line: u8, column: u8, args: fmt::Arguments<'_>) -> Self {
        let mut text = String::new();
        // Overflow is cut at the panel width, so the write never fails.
        let _ = Truncating {
            out: &mut text,
            full: false,
        }
        .write_fmt(args);
        Self { text, line, column }
    }

    pub fn title() -> Self {
        Self::new(TITLE_LINE, 0, TITLE)
    }

    pub fn height(height: i32) -> Self {
        Self::format(HEIGHT_LINE, 0, format_args!("Height (/): {height}"))
    }

    pub fn angle(degrees: i32) -> Self {
        Self::format(YAW_LINE, 0, format_args!("Angle (deg): {degrees}"))
    }

    pub fn control(output: f64) -> Self {
        Self::format(CONTROL_LINE, 0, format_args!("PI out: {output:.0}"))
    }
}

/// Writes until the first character that does not fit, then drops the rest.
struct Truncating<'a> {
    out: &'a mut String<TEXT_WIDTH>,
    full: bool,
}

impl fmt::Write for Truncating<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.full {
                break;
            }
            self.full = self.out.push(c).is_err();
        }
        Ok(())
    }
}

// ── Publisher ─────────────────────────────────────────────────

/// What happened to a published message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Queued,
    /// Discarded under [`OverflowPolicy::DropNewest`].
    Dropped,
}

/// Producer handle shared by every periodic activity.
pub struct Publisher<'a> {
    channel: &'a DisplayChannel,
    wait: Duration,
    policy: OverflowPolicy,
    dropped: Cell<u32>,
}

impl<'a> Publisher<'a> {
    pub fn new(channel: &'a DisplayChannel, wait: Duration, policy: OverflowPolicy) -> Self {
        Self {
            channel,
            wait,
            policy,
            dropped: Cell::new(0),
        }
    }

    pub fn channel(&self) -> &'a DisplayChannel {
        self.channel
    }

    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    /// Messages discarded so far.
    pub fn dropped(&self) -> u32 {
        self.dropped.get()
    }

    /// Zero-wait enqueue.
    pub fn try_send(&self, msg: DisplayMessage) -> core::result::Result<(), ChannelError> {
        self.channel
            .try_send(msg)
            .map_err(|_| ChannelError::WouldBlock)
    }

    /// Enqueue, waiting at most the configured duration for space.
    pub async fn send_timeout(&self, msg: DisplayMessage) -> core::result::Result<(), ChannelError> {
        with_timeout(self.wait, self.channel.send(msg))
            .await
            .map_err(|_| ChannelError::Exhausted)
    }

    /// Enqueue with the bounded wait, then apply the overflow policy.
    ///
    /// `activity` names the caller in logs and in [`Error::Halted`].
    pub async fn publish(&self, msg: DisplayMessage, activity: &'static str) -> Result<Delivery> {
        match self.send_timeout(msg).await {
            Ok(()) => Ok(Delivery::Queued),
            Err(e) => self.overflow(e, activity),
        }
    }

    fn overflow(&self, e: ChannelError, activity: &'static str) -> Result<Delivery> {
        match self.policy {
            OverflowPolicy::Halt => {
                error!("{}: {} after {:?}, halting", activity, e, self.wait);
                Err(Error::Halted(activity))
            }
            OverflowPolicy::DropNewest => {
                self.dropped.set(self.dropped.get() + 1);
                warn!("{}: {}, message dropped ({} total)", activity, e, self.dropped.get());
                Ok(Delivery::Dropped)
            }
        }
    }
}
