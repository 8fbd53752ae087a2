//! GSD-Core: Foundation types for gait sequence detection
//!
//! Data model shared by the processing stages: accelerometer tables,
//! scalar signals, index intervals, peaks, pulse trains and gait sequences.

pub mod error;
pub mod signal;
pub mod acceleration;
pub mod intervals;
pub mod gait;

pub use signal::*;
pub use acceleration::*;
pub use intervals::*;
pub use gait::*;
pub use error::{GsdError, GsdResult, ensure_sampling_rate};
