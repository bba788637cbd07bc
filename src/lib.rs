//! HeliRig control core library.
//!
//! Exposes the control core (sample buffer, sensors, PI, coordinator) for
//! the host binary and for integration testing. Peripheral access goes
//! through the port traits in [`app::ports`] and the `embedded-hal` pin
//! traits, so everything here builds and runs on the host.

#![deny(unused_must_use)]

pub mod app;
pub mod circ_buf;
pub mod config;
pub mod control;
pub mod error;
pub mod sensors;

pub mod adapters;
pub mod drivers;

pub use error::{Error, Result};
