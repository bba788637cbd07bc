//! Feedback control.

pub mod pi;

pub use pi::PiController;
