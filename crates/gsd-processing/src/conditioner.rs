//! Acceleration norm conditioning: resampling and cascaded filtering

use crate::config::DetectorConfig;
use crate::pipeline::{ChainResult, StageChain, StageChainBuilder};
use crate::resample::Resampler;
use gsd_core::{ensure_sampling_rate, AccelerometerData, GsdResult, Signal};

/// Converts a tri-axial recording into the conditioned norm at the target rate
pub struct SignalConditioner {
    chain: StageChain,
    target_rate: f64,
}

impl SignalConditioner {
    pub fn new(config: &DetectorConfig) -> GsdResult<Self> {
        let target_rate = ensure_sampling_rate("target rate", config.target_sampling_freq_hz)?;

        let mut builder = StageChainBuilder::new("conditioning");
        builder.add_stage(Box::new(Resampler::new(target_rate)?));
        for filter in config.conditioning_filters() {
            builder.add_stage(filter.build(target_rate)?);
        }

        Ok(Self {
            chain: builder.build(),
            target_rate,
        })
    }

    /// Rate of the conditioned signal
    pub fn target_rate(&self) -> f64 {
        self.target_rate
    }

    /// Stage names in execution order
    pub fn stage_names(&self) -> Vec<String> {
        self.chain.stage_names()
    }

    /// Condition `data` sampled at `sampling_freq_hz`
    pub fn condition(&self, data: &AccelerometerData, sampling_freq_hz: f64) -> GsdResult<Signal> {
        Ok(self.condition_with_metrics(data, sampling_freq_hz)?.output_signal)
    }

    /// Condition and keep the per-stage timing metrics
    pub fn condition_with_metrics(
        &self,
        data: &AccelerometerData,
        sampling_freq_hz: f64,
    ) -> GsdResult<ChainResult> {
        data.validate_triaxial()?;
        let rate = ensure_sampling_rate("input recording", sampling_freq_hz)?;

        let norm = Signal::new(data.norm(), rate)?;
        self.chain.process(&norm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gsd_core::GsdError;

    fn still_recording(rows: usize) -> AccelerometerData {
        let z = vec![1.0; rows];
        let zeros = vec![0.0; rows];
        AccelerometerData::from_axes(&zeros, &zeros, &z).unwrap()
    }

    #[test]
    fn test_conditioning_output_rate_and_length() {
        let conditioner = SignalConditioner::new(&DetectorConfig::default()).unwrap();
        let conditioned = conditioner.condition(&still_recording(1000), 100.0).unwrap();

        assert_eq!(conditioned.sampling_rate(), 40.0);
        assert_eq!(conditioned.len(), 400);
        assert!((conditioned.duration() - 10.0).abs() < 1e-9);
        // Gravity only: drift removal leaves nothing behind
        assert!(conditioned.values().iter().all(|v| v.abs() < 1e-6));
    }

    #[test]
    fn test_conditioning_stage_order() {
        let conditioner = SignalConditioner::new(&DetectorConfig::default()).unwrap();
        let names = conditioner.stage_names();
        assert_eq!(names.len(), 4);
        assert!(names[0].starts_with("resample"));
        assert!(names[1].starts_with("savgol"));
        assert!(names[3].starts_with("fir_lowpass"));
    }

    #[test]
    fn test_conditioning_rejects_invalid_input() {
        let conditioner = SignalConditioner::new(&DetectorConfig::default()).unwrap();

        let two_columns = AccelerometerData::from_rows(&[[0.0, 1.0], [0.0, 1.0]]).unwrap();
        assert!(matches!(
            conditioner.condition(&two_columns, 100.0),
            Err(GsdError::InvalidInput { .. })
        ));
        assert!(matches!(
            conditioner.condition(&still_recording(10), 0.0),
            Err(GsdError::InvalidSamplingRate { .. })
        ));
    }

    #[test]
    fn test_metrics_per_stage() {
        let conditioner = SignalConditioner::new(&DetectorConfig::default()).unwrap();
        let result = conditioner.condition_with_metrics(&still_recording(500), 50.0).unwrap();

        assert_eq!(result.stage_metrics.len(), 4);
        assert_eq!(result.stage_metrics[0].input_samples, 500);
        assert_eq!(result.stage_metrics[0].output_samples, 400);
    }
}
