//! Core signal stage trait and types

use gsd_core::{GsdResult, Signal};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Core trait for all whole-signal processing stages
///
/// Stages are pure: they read the input signal and return a new one.
pub trait SignalStage: Send + Sync {
    /// Process a signal and return the processed result
    fn apply(&self, input: &Signal) -> GsdResult<Signal>;

    /// Get stage name/identifier
    fn name(&self) -> &str;

    /// Get stage type for chain organization
    fn stage_type(&self) -> StageType {
        StageType::Filter
    }

    /// Check if stage can handle the given signal
    fn can_process(&self, signal: &Signal) -> bool {
        !signal.is_empty()
    }
}

/// Types of signal stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageType {
    /// Rate conversion
    Resampler,
    /// Low-pass, high-pass and smoothing filters
    Filter,
    /// Feature transforms (wavelet domain)
    Transform,
}

/// Metrics recorded for one stage execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageMetrics {
    /// Stage name
    pub stage: String,
    pub stage_type: StageType,
    /// Actual processing time in microseconds
    pub processing_time_us: u64,
    /// Input length in samples
    pub input_samples: usize,
    /// Output length in samples
    pub output_samples: usize,
}

impl StageMetrics {
    /// Start timing a stage execution
    pub fn start_timing(stage: &dyn SignalStage, input: &Signal) -> StageTimer {
        StageTimer {
            start_time: Instant::now(),
            stage: stage.name().to_string(),
            stage_type: stage.stage_type(),
            input_samples: input.len(),
        }
    }
}

/// Helper for timing stage executions
pub struct StageTimer {
    start_time: Instant,
    stage: String,
    stage_type: StageType,
    input_samples: usize,
}

impl StageTimer {
    /// Finish timing and return metrics
    pub fn finish(self, output: &Signal) -> StageMetrics {
        StageMetrics {
            stage: self.stage,
            stage_type: self.stage_type,
            processing_time_us: self.start_time.elapsed().as_micros() as u64,
            input_samples: self.input_samples,
            output_samples: output.len(),
        }
    }
}
