//! Gait sequence detector
//!
//! Runs the full detection on one recording:
//! conditioning, wavelet features, envelope gate, pulse trains and bout
//! finalisation. The detector holds only its configuration and the stages
//! built from it, so one instance can serve any number of recordings.

use crate::bouts::{BoutMerger, MergedBouts};
use crate::conditioner::SignalConditioner;
use crate::config::DetectorConfig;
use crate::envelope::{EnvelopeGate, GateDecision, ThresholdSource};
use crate::peaks::{PulseTrainExtractor, PulseTrains};
use crate::processor::StageMetrics;
use crate::wavelet::{WaveletFeatureExtractor, WaveletFeatures};
use gsd_core::{AccelerometerData, GaitSequences, GsdResult, Signal};
use tracing::{debug, info};

/// External consumer of detection results, e.g. a plotting front end
pub trait ActivityPlotter {
    /// Receive the detected activity signal and the finalised bouts
    fn plot(&self, detected_activity: &Signal, sequences: &GaitSequences) -> GsdResult<()>;
}

/// Detection output together with every intermediate result
#[derive(Debug, Clone)]
pub struct DetectionReport {
    pub sequences: GaitSequences,
    /// Conditioned acceleration norm at the target rate
    pub conditioned: Signal,
    pub features: WaveletFeatures,
    pub gate: GateDecision,
    pub pulse_trains: PulseTrains,
    pub bouts: MergedBouts,
    /// Conditioning stage timings
    pub stage_metrics: Vec<StageMetrics>,
}

impl DetectionReport {
    pub fn threshold_source(&self) -> ThresholdSource {
        self.gate.source
    }

    /// Mid-swing peak indices at the target rate, one per counted step
    pub fn mid_swing_peaks(&self) -> Vec<usize> {
        self.bouts.mid_swing_peaks()
    }

    /// Mid-swing peak times in seconds
    pub fn mid_swing_times(&self) -> Vec<f64> {
        self.mid_swing_peaks()
            .into_iter()
            .map(|i| self.conditioned.index_to_seconds(i))
            .collect()
    }
}

/// Detects gait sequences in lower-back accelerometer recordings
pub struct GaitSequenceDetector {
    config: DetectorConfig,
    conditioner: SignalConditioner,
    features: WaveletFeatureExtractor,
    gate: EnvelopeGate,
    trains: PulseTrainExtractor,
    merger: BoutMerger,
}

impl GaitSequenceDetector {
    /// Create detector, rejecting invalid configurations
    pub fn new(config: DetectorConfig) -> GsdResult<Self> {
        config.validate()?;

        let target_rate = config.target_sampling_freq_hz;
        let conditioner = SignalConditioner::new(&config)?;
        let features = WaveletFeatureExtractor::new(&config.wavelet)?;
        let gate = EnvelopeGate::new(&config.gate, target_rate);
        let trains = PulseTrainExtractor::new(
            config.samples(config.bouts.max_peak_gap_s),
            config.bouts.min_train_steps,
        );
        let merger = BoutMerger::new(
            config.bouts.min_bout_steps,
            config.samples(config.bouts.max_bridged_gap_s),
        );

        Ok(Self {
            config,
            conditioner,
            features,
            gate,
            trains,
            merger,
        })
    }

    /// Get detector configuration
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Detect gait sequences in `data` sampled at `sampling_freq_hz`
    pub fn detect(&self, data: &AccelerometerData, sampling_freq_hz: f64) -> GsdResult<GaitSequences> {
        self.detect_with_plotter(data, sampling_freq_hz, None)
    }

    /// Detect and hand the results to `plotter` when one is given
    pub fn detect_with_plotter(
        &self,
        data: &AccelerometerData,
        sampling_freq_hz: f64,
        plotter: Option<&dyn ActivityPlotter>,
    ) -> GsdResult<GaitSequences> {
        let report = self.analyze(data, sampling_freq_hz)?;
        if let Some(plotter) = plotter {
            plotter.plot(&report.features.detected_activity, &report.sequences)?;
        }
        Ok(report.sequences)
    }

    /// Run the detection and keep the intermediate results
    pub fn analyze(&self, data: &AccelerometerData, sampling_freq_hz: f64) -> GsdResult<DetectionReport> {
        let conditioning = self.conditioner.condition_with_metrics(data, sampling_freq_hz)?;
        let conditioned = conditioning.output_signal;
        debug!(
            input_samples = data.row_count(),
            conditioned_samples = conditioned.len(),
            elapsed_us = conditioning.total_latency_us,
            "recording conditioned"
        );

        let features = self.features.extract(&conditioned)?;
        let gate = self.gate.evaluate(&features.detected_activity);

        let selected = gate.select(&features.detected_activity, &features.smoothed_wavelet);
        let pulse_trains = self.trains.extract(selected, gate.threshold());
        debug!(
            max_trains = pulse_trains.maxima.len(),
            min_trains = pulse_trains.minima.len(),
            threshold = gate.threshold(),
            "pulse trains"
        );

        let bouts = self.merger.merge(&pulse_trains, conditioned.len());
        let target_rate = conditioned.sampling_rate();
        let sequences = GaitSequences::from_bounds(
            bouts
                .intervals
                .iter()
                .map(|iv| (iv.start as f64 / target_rate, iv.end as f64 / target_rate)),
            sampling_freq_hz,
            self.config.metadata.clone(),
        );

        if sequences.is_empty() {
            info!("No gait sequence(s) detected.");
        } else {
            info!(count = sequences.len(), "Gait sequence(s) detected.");
        }

        Ok(DetectionReport {
            sequences,
            conditioned,
            features,
            gate,
            pulse_trains,
            bouts,
            stage_metrics: conditioning.stage_metrics,
        })
    }
}
