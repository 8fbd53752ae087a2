//! Signal: immutable scalar time series produced by each processing stage

use crate::error::{ensure_sampling_rate, GsdResult};
use serde::{Deserialize, Serialize};

/// Uniformly sampled scalar signal
///
/// Stages never mutate a signal in place; they build a new one with
/// [`Signal::with_values`] so every intermediate result stays available.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    values: Vec<f64>,
    sampling_rate: f64,
}

impl Signal {
    /// Create new signal, validating the sampling rate
    pub fn new(values: Vec<f64>, sampling_rate: f64) -> GsdResult<Self> {
        ensure_sampling_rate("signal", sampling_rate)?;
        Ok(Signal { values, sampling_rate })
    }

    /// New signal sharing this signal's sampling rate
    pub fn with_values(&self, values: Vec<f64>) -> Signal {
        Signal {
            values,
            sampling_rate: self.sampling_rate,
        }
    }

    /// Sample values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Get sampling rate
    pub fn sampling_rate(&self) -> f64 {
        self.sampling_rate
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if signal is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Signal duration in seconds
    pub fn duration(&self) -> f64 {
        self.values.len() as f64 / self.sampling_rate
    }

    /// Convert a sample index into elapsed seconds
    pub fn index_to_seconds(&self, index: usize) -> f64 {
        index as f64 / self.sampling_rate
    }
}
