//! Interrupt source drivers.

pub mod hw_timer;
