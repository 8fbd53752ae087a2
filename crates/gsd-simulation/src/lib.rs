//! GSD-Simulation: synthetic trunk accelerometer recordings
//!
//! Generates tri-axial recordings from a schedule of still and walking
//! segments, for tests and demonstrations of the detector.

pub mod gait_patterns;
pub mod accel_simulator;

pub use accel_simulator::*;
pub use gait_patterns::*;
