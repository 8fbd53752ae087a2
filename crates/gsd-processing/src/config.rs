//! Detector configuration
//!
//! Every constant the detector relies on lives here. The defaults are the
//! lower-back calibration and should only be changed together with a
//! re-validation of the detector.

use crate::filters::{BoundaryMode, FilterConfig, DRIFT_REMOVAL_A, DRIFT_REMOVAL_B};
use crate::wavelet::WaveletFamily;
use gsd_core::{config_error, EventMetadata, GsdError, GsdResult};
use serde::{Deserialize, Serialize};

/// Complete detector configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Configuration name/profile
    pub name: String,
    /// Rate every recording is resampled to before detection (Hz)
    pub target_sampling_freq_hz: f64,
    /// Descriptive metadata copied onto the output
    pub metadata: EventMetadata,
    /// Norm conditioning filters
    pub conditioning: ConditioningParams,
    /// Wavelet-domain feature extraction
    pub wavelet: WaveletParams,
    /// Envelope gate and threshold selection
    pub gate: GateParams,
    /// Pulse-train and bout finalisation
    pub bouts: BoutParams,
}

/// Filters applied to the resampled acceleration norm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditioningParams {
    pub savgol_window: usize,
    pub savgol_order: usize,
    /// Drift-removal numerator
    pub highpass_b: Vec<f64>,
    /// Drift-removal denominator
    pub highpass_a: Vec<f64>,
    pub lowpass_cutoff_hz: f64,
    /// FIR length, one second of samples when unset
    pub lowpass_taps: Option<usize>,
}

/// One Gaussian smoothing pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaussianPass {
    /// Standard deviation in samples
    pub sigma: f64,
    /// Kernel radius in samples
    pub radius: usize,
    pub mode: BoundaryMode,
}

/// Wavelet feature extraction parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveletParams {
    pub family: WaveletFamily,
    /// Scale of both transforms
    pub scale: f64,
    /// Savitzky-Golay smoothing between the two transforms
    pub savgol_window: usize,
    pub savgol_order: usize,
    /// Smoothing applied after the second transform, in order
    pub smoothing: Vec<GaussianPass>,
}

/// Envelope gate parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateParams {
    /// Envelope moving-average window (s)
    pub envelope_window_s: f64,
    /// Time the envelope must stay above the alarm level (s)
    pub alarm_duration_s: f64,
    /// Shortest alarm run kept as activity (s)
    pub min_active_duration_s: f64,
    /// Envelope percentile taken as the noise floor
    pub noise_percentile: f64,
    /// Alarm level as a multiple of the noise floor
    pub noise_multiplier: f64,
    /// Bounds of the alarm level, in detected-activity units
    pub min_alarm_level: f64,
    pub max_alarm_level: f64,
    /// Percentile of pooled peak magnitudes used as adaptive threshold
    pub threshold_percentile: f64,
    /// Threshold used when no activity survives the gate
    pub default_threshold: f64,
}

/// Pulse-train and bout parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoutParams {
    /// Peak spacing at which a pulse train is split (s)
    pub max_peak_gap_s: f64,
    /// Pulse trains with fewer peaks are discarded
    pub min_train_steps: usize,
    /// Bouts with fewer steps are discarded
    pub min_bout_steps: usize,
    /// Gaps of at most this duration between bouts are bridged (s)
    pub max_bridged_gap_s: f64,
}

impl DetectorConfig {
    /// Calibration for a sensor worn on the lower back
    pub fn lower_back() -> Self {
        DetectorConfig {
            name: "Lower back".to_string(),
            target_sampling_freq_hz: 40.0,
            metadata: EventMetadata::default(),
            conditioning: ConditioningParams {
                savgol_window: 21,
                savgol_order: 7,
                highpass_b: DRIFT_REMOVAL_B.to_vec(),
                highpass_a: DRIFT_REMOVAL_A.to_vec(),
                lowpass_cutoff_hz: 3.2,
                lowpass_taps: None,
            },
            wavelet: WaveletParams {
                family: WaveletFamily::Gaus2,
                scale: 10.0,
                savgol_window: 11,
                savgol_order: 5,
                smoothing: vec![
                    GaussianPass {
                        sigma: 2.0,
                        radius: 4,
                        mode: BoundaryMode::Reflect,
                    },
                    GaussianPass {
                        sigma: 3.0,
                        radius: 7,
                        mode: BoundaryMode::Nearest,
                    },
                ],
            },
            gate: GateParams {
                envelope_window_s: 1.0,
                alarm_duration_s: 1.0,
                min_active_duration_s: 3.0,
                noise_percentile: 5.0,
                noise_multiplier: 10.0,
                min_alarm_level: 0.05,
                max_alarm_level: 0.5,
                threshold_percentile: 5.0,
                default_threshold: 0.15,
            },
            bouts: BoutParams {
                max_peak_gap_s: 3.5,
                min_train_steps: 4,
                min_bout_steps: 5,
                max_bridged_gap_s: 3.0,
            },
        }
    }

    /// Validate entire configuration
    pub fn validate(&self) -> GsdResult<()> {
        if !(self.target_sampling_freq_hz.is_finite() && self.target_sampling_freq_hz > 0.0) {
            return Err(config_error!(
                "Target sampling rate must be positive, got {}",
                self.target_sampling_freq_hz
            ));
        }

        self.validate_conditioning()?;
        self.validate_wavelet()?;

        let gate = &self.gate;
        if !(gate.envelope_window_s > 0.0)
            || !(gate.alarm_duration_s >= 0.0)
            || !(gate.min_active_duration_s >= 0.0)
        {
            return Err(config_error!("Envelope gate durations must be positive"));
        }
        for percentile in [gate.noise_percentile, gate.threshold_percentile] {
            if !(0.0..=100.0).contains(&percentile) {
                return Err(config_error!("Gate percentiles must lie in [0, 100], got {}", percentile));
            }
        }
        if !(gate.noise_multiplier >= 0.0)
            || !(gate.min_alarm_level > 0.0)
            || !(gate.max_alarm_level >= gate.min_alarm_level)
        {
            return Err(config_error!(
                "Alarm level bounds [{}, {}] must be positive and ordered",
                gate.min_alarm_level,
                gate.max_alarm_level
            ));
        }
        if !(gate.default_threshold >= 0.0) {
            return Err(config_error!("Default threshold must be non-negative"));
        }

        let bouts = &self.bouts;
        if !(bouts.max_peak_gap_s > 0.0) || !(bouts.max_bridged_gap_s >= 0.0) {
            return Err(config_error!("Bout gap durations must be positive"));
        }
        if bouts.min_train_steps == 0 {
            return Err(config_error!("Minimum pulse train length must be greater than 0"));
        }

        Ok(())
    }

    fn validate_conditioning(&self) -> GsdResult<()> {
        let conditioning = &self.conditioning;
        let nyquist = self.target_sampling_freq_hz / 2.0;

        if !(conditioning.lowpass_cutoff_hz > 0.0 && conditioning.lowpass_cutoff_hz < nyquist) {
            return Err(config_error!(
                "Low-pass cutoff {}Hz must lie below the target Nyquist frequency {}Hz",
                conditioning.lowpass_cutoff_hz,
                nyquist
            ));
        }
        if conditioning.highpass_a.first().map_or(true, |a0| *a0 == 0.0) || conditioning.highpass_b.is_empty() {
            return Err(config_error!("High-pass coefficients are incomplete"));
        }
        validate_savgol("conditioning", conditioning.savgol_window, conditioning.savgol_order)
    }

    fn validate_wavelet(&self) -> GsdResult<()> {
        let wavelet = &self.wavelet;
        if !(wavelet.scale.is_finite() && wavelet.scale > 0.0) {
            return Err(config_error!("Wavelet scale must be positive, got {}", wavelet.scale));
        }
        for pass in &wavelet.smoothing {
            if !(pass.sigma > 0.0) {
                return Err(config_error!("Gaussian sigma must be positive, got {}", pass.sigma));
            }
        }
        validate_savgol("wavelet", wavelet.savgol_window, wavelet.savgol_order)
    }

    /// Filters applied to the resampled norm, in order
    pub fn conditioning_filters(&self) -> Vec<FilterConfig> {
        let conditioning = &self.conditioning;
        vec![
            FilterConfig::savgol(conditioning.savgol_window, conditioning.savgol_order),
            FilterConfig::iir_highpass(conditioning.highpass_b.clone(), conditioning.highpass_a.clone()),
            FilterConfig::fir_lowpass(conditioning.lowpass_cutoff_hz, conditioning.lowpass_taps),
        ]
    }

    /// Convert a duration to a whole number of samples at the target rate
    pub fn samples(&self, seconds: f64) -> usize {
        (seconds * self.target_sampling_freq_hz).round().max(0.0) as usize
    }

    /// Export configuration to JSON
    pub fn to_json(&self) -> GsdResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| GsdError::SerializationError {
            message: format!("Failed to serialize configuration: {}", e),
        })
    }

    /// Import configuration from JSON
    pub fn from_json(json: &str) -> GsdResult<Self> {
        serde_json::from_str(json).map_err(|e| GsdError::SerializationError {
            message: format!("Failed to deserialize configuration: {}", e),
        })
    }
}

fn validate_savgol(stage: &str, window: usize, order: usize) -> GsdResult<()> {
    if window % 2 == 0 || window < 3 {
        return Err(config_error!(
            "{} Savitzky-Golay window must be odd and at least 3, got {}",
            stage,
            window
        ));
    }
    if order >= window {
        return Err(config_error!(
            "{} Savitzky-Golay order {} must be less than window {}",
            stage,
            order,
            window
        ));
    }
    Ok(())
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self::lower_back()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_calibration() {
        let config = DetectorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.target_sampling_freq_hz, 40.0);
        assert_eq!(config.gate.default_threshold, 0.15);
        assert_eq!(config.bouts.min_train_steps, 4);
        assert_eq!(config.bouts.min_bout_steps, 5);
        assert_eq!(config.samples(config.bouts.max_bridged_gap_s), 120);
        assert_eq!(config.samples(config.bouts.max_peak_gap_s), 140);
        assert_eq!(config.samples(config.gate.alarm_duration_s), 40);
        assert_eq!(config.metadata.tracking_systems, "SU");
    }

    #[test]
    fn test_json_round_trip() {
        let config = DetectorConfig::lower_back();
        let json = config.to_json().unwrap();
        assert!(json.contains("target_sampling_freq_hz"));

        let restored = DetectorConfig::from_json(&json).unwrap();
        assert_eq!(restored, config);
        assert!(DetectorConfig::from_json("{\"name\": 1}").is_err());
    }

    #[test]
    fn test_invalid_configurations() {
        let mut config = DetectorConfig::default();
        config.target_sampling_freq_hz = 0.0;
        assert!(config.validate().is_err());

        let mut config = DetectorConfig::default();
        config.conditioning.lowpass_cutoff_hz = 25.0;
        assert!(config.validate().is_err());

        let mut config = DetectorConfig::default();
        config.wavelet.savgol_window = 10;
        assert!(matches!(
            config.validate(),
            Err(GsdError::InvalidConfiguration { .. })
        ));

        let mut config = DetectorConfig::default();
        config.gate.threshold_percentile = 120.0;
        assert!(config.validate().is_err());

        let mut config = DetectorConfig::default();
        config.gate.max_alarm_level = 0.01;
        assert!(config.validate().is_err());

        let mut config = DetectorConfig::default();
        config.gate.min_alarm_level = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_conditioning_filters_build() {
        let config = DetectorConfig::default();
        let filters = config.conditioning_filters();
        assert_eq!(filters.len(), 3);
        for filter in &filters {
            assert!(filter.build(config.target_sampling_freq_hz).is_ok());
        }
    }
}
