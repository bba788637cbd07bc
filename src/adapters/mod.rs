//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter        | Implements         | Connects to                  |
//! |----------------|--------------------|------------------------------|
//! | `log_display`  | DisplaySink        | `log` output (`OLED[l:c]`)   |
//! | `sim`          | ConversionTrigger  | synthetic height waveform    |
//! |                | InputPin (x2)      | synthetic quadrature encoder |

pub mod log_display;
pub mod sim;
