//! GSD-Processing: gait sequence detection pipeline
//!
//! Offline detection of walking bouts in lower-back accelerometer recordings:
//! resampling and filtering of the acceleration norm, wavelet features, an
//! envelope gate with adaptive threshold, pulse trains and bout merging.

pub mod processor;
pub mod pipeline;
pub mod filters;
pub mod resample;
pub mod wavelet;
pub mod envelope;
pub mod peaks;
pub mod bouts;
pub mod conditioner;
pub mod config;
pub mod detector;

pub use pipeline::*;
pub use processor::{SignalStage, StageMetrics, StageType};
pub use filters::{
    BoundaryMode, FilterConfig, FilterType, FirLowpassFilter, GaussianFilter,
    MovingAverageFilter, SavitzkyGolayFilter, ZeroPhaseIirFilter,
};
pub use resample::{resample, Resampler};
pub use wavelet::{continuous_wavelet_transform, WaveletFamily, WaveletFeatureExtractor, WaveletFeatures};
pub use envelope::{EnvelopeGate, GateDecision, ThresholdSource};
pub use peaks::{find_local_min_max, identify_pulse_trains, peaks_at, PulseTrainExtractor, PulseTrains};
pub use bouts::{BoutMerger, MergedBouts, WalkingBout};
pub use conditioner::SignalConditioner;
pub use config::{BoutParams, ConditioningParams, DetectorConfig, GateParams, GaussianPass, WaveletParams};
pub use detector::{ActivityPlotter, DetectionReport, GaitSequenceDetector};
