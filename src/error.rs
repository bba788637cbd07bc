//! Unified error types for the HeliRig control core.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! coordinator's error handling uniform. All variants are `Copy` so they can
//! be returned from interrupt-adjacent code without allocation.
//!
//! Only two conditions in the core are ever surfaced to a caller: the sample
//! arena refusing a capacity (the allocation-failure case) and the outbound
//! display channel staying full. Under-run, PI saturation and angle wrap are
//! silent by contract and never produce an `Error`.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Sample buffer could not be created.
    Buffer(BufferError),
    /// Outbound display channel refused a message.
    Channel(ChannelError),
    /// Configuration is invalid; the message names the field.
    Config(&'static str),
    /// A periodic activity stopped under the fail-fast overflow policy.
    Halted(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buffer(e) => write!(f, "buffer: {e}"),
            Self::Channel(e) => write!(f, "channel: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Halted(activity) => write!(f, "halted: {activity}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Buffer errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    /// Requested capacity does not fit the statically reserved arena.
    CapacityExceeded { requested: usize, max: usize },
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded { requested, max } => {
                write!(f, "capacity {requested} exceeds arena of {max} samples")
            }
        }
    }
}

impl std::error::Error for BufferError {}

impl From<BufferError> for Error {
    fn from(e: BufferError) -> Self {
        Self::Buffer(e)
    }
}

// ---------------------------------------------------------------------------
// Channel errors
// ---------------------------------------------------------------------------

/// Why a publish did not enqueue its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelError {
    /// Zero-wait publish found the channel full.
    WouldBlock,
    /// The channel stayed full for the whole bounded wait.
    Exhausted,
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WouldBlock => write!(f, "channel full (would block)"),
            Self::Exhausted => write!(f, "channel full for the entire wait"),
        }
    }
}

impl std::error::Error for ChannelError {}

impl From<ChannelError> for Error {
    fn from(e: ChannelError) -> Self {
        Self::Channel(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
