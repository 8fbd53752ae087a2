//! Continuous wavelet transform and wavelet-domain gait features

use crate::config::WaveletParams;
use crate::filters::{GaussianFilter, SavitzkyGolayFilter};
use crate::pipeline::{StageChain, StageChainBuilder};
use crate::processor::{SignalStage, StageType};
use gsd_core::{config_error, GsdResult, Signal};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::debug;

/// Supported mother wavelets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaveletFamily {
    /// Second derivative of a Gaussian, unit energy
    Gaus2,
}

impl WaveletFamily {
    /// Evaluate the mother wavelet at `x`
    pub fn psi(&self, x: f64) -> f64 {
        match self {
            WaveletFamily::Gaus2 => {
                let norm = (2.0 / PI).powf(0.25) / 3.0_f64.sqrt();
                norm * (4.0 * x * x - 2.0) * (-x * x).exp()
            }
        }
    }

    /// Effective support `[-bound, bound]`
    pub fn support(&self) -> f64 {
        match self {
            WaveletFamily::Gaus2 => 5.0,
        }
    }

    /// Frequency of the wavelet at scale 1, in cycles per sample
    pub fn center_frequency(&self) -> f64 {
        match self {
            WaveletFamily::Gaus2 => 0.3,
        }
    }

    /// Frequency in Hz that `scale` corresponds to at `sampling_rate`
    pub fn pseudo_frequency(&self, scale: f64, sampling_rate: f64) -> f64 {
        self.center_frequency() / scale * sampling_rate
    }
}

/// Sampled, scaled wavelet: `psi(k / scale) / sqrt(scale)` over the support
fn wavelet_kernel(family: WaveletFamily, scale: f64) -> Vec<f64> {
    let half = (family.support() * scale).floor() as isize;
    let gain = 1.0 / scale.sqrt();
    (-half..=half)
        .map(|k| family.psi(k as f64 / scale) * gain)
        .collect()
}

/// Single-scale CWT coefficients, same length as `data`
///
/// The input is zero-padded outside its range and the kernel is centred on
/// each sample.
pub fn continuous_wavelet_transform(data: &[f64], scale: f64, family: WaveletFamily) -> Vec<f64> {
    let kernel = wavelet_kernel(family, scale);
    let half = (kernel.len() / 2) as isize;
    let n = data.len() as isize;

    (0..n)
        .map(|i| {
            let lo = (i - half).max(0);
            let hi = (i + half).min(n - 1);
            (lo..=hi)
                .map(|j| data[j as usize] * kernel[(j - i + half) as usize])
                .sum()
        })
        .collect()
}

/// Stage computing the single-scale CWT of a signal
pub struct WaveletTransform {
    family: WaveletFamily,
    scale: f64,
    name: String,
}

impl WaveletTransform {
    pub fn new(family: WaveletFamily, scale: f64) -> GsdResult<Self> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(config_error!("Wavelet scale must be positive, got {}", scale));
        }
        Ok(Self {
            family,
            scale,
            name: format!("cwt({:?}, scale={})", family, scale),
        })
    }
}

impl SignalStage for WaveletTransform {
    fn apply(&self, input: &Signal) -> GsdResult<Signal> {
        Ok(input.with_values(continuous_wavelet_transform(input.values(), self.scale, self.family)))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn stage_type(&self) -> StageType {
        StageType::Transform
    }
}

/// Intermediate and final wavelet-domain signals
#[derive(Debug, Clone, PartialEq)]
pub struct WaveletFeatures {
    /// First transform after Savitzky-Golay smoothing
    pub smoothed_wavelet: Signal,
    /// Second transform after Gaussian smoothing
    pub detected_activity: Signal,
}

/// Two-pass wavelet feature extractor
pub struct WaveletFeatureExtractor {
    first: StageChain,
    second: StageChain,
    family: WaveletFamily,
    scale: f64,
}

impl WaveletFeatureExtractor {
    pub fn new(params: &WaveletParams) -> GsdResult<Self> {
        let mut first = StageChainBuilder::new("wavelet smoothing");
        first
            .add_stage(Box::new(WaveletTransform::new(params.family, params.scale)?))
            .add_stage(Box::new(SavitzkyGolayFilter::new(params.savgol_window, params.savgol_order)?));

        let mut second = StageChainBuilder::new("activity detection");
        second.add_stage(Box::new(WaveletTransform::new(params.family, params.scale)?));
        for pass in &params.smoothing {
            second.add_stage(Box::new(GaussianFilter::new(pass.sigma, pass.radius, pass.mode)));
        }

        Ok(Self {
            first: first.build(),
            second: second.build(),
            family: params.family,
            scale: params.scale,
        })
    }

    /// Compute the smoothed wavelet and detected activity signals
    pub fn extract(&self, conditioned: &Signal) -> GsdResult<WaveletFeatures> {
        debug!(
            scale = self.scale,
            pseudo_frequency_hz = self.family.pseudo_frequency(self.scale, conditioned.sampling_rate()),
            "wavelet feature extraction"
        );

        let smoothed_wavelet = self.first.apply(conditioned)?;
        let detected_activity = self.second.apply(&smoothed_wavelet)?;

        Ok(WaveletFeatures {
            smoothed_wavelet,
            detected_activity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DetectorConfig;

    #[test]
    fn test_gaus2_shape() {
        let family = WaveletFamily::Gaus2;
        assert!(family.psi(0.0) < 0.0);
        assert!(family.psi(0.5_f64.sqrt()).abs() < 1e-12);
        assert!(family.psi(5.0).abs() < 1e-9);

        // Unit energy, zero mean
        let dx = 1e-3;
        let (mut energy, mut mean) = (0.0, 0.0);
        let mut x = -8.0;
        while x <= 8.0 {
            let v = family.psi(x);
            energy += v * v * dx;
            mean += v * dx;
            x += dx;
        }
        assert!((energy - 1.0).abs() < 1e-6, "energy {}", energy);
        assert!(mean.abs() < 1e-6);
    }

    #[test]
    fn test_kernel_length_and_symmetry() {
        let kernel = wavelet_kernel(WaveletFamily::Gaus2, 10.0);
        assert_eq!(kernel.len(), 101);
        for i in 0..50 {
            assert!((kernel[i] - kernel[100 - i]).abs() < 1e-15);
        }
    }

    #[test]
    fn test_cwt_same_length_and_constant_response() {
        let transformed = continuous_wavelet_transform(&vec![1.0; 400], 10.0, WaveletFamily::Gaus2);
        assert_eq!(transformed.len(), 400);
        // Zero-mean kernel: a constant far from the edges gives no response
        assert!(transformed[100..300].iter().all(|v| v.abs() < 1e-6));
    }

    #[test]
    fn test_cwt_responds_to_matching_oscillation() {
        let fs = 40.0;
        let family = WaveletFamily::Gaus2;
        let matched = family.pseudo_frequency(10.0, fs);
        assert!((matched - 1.2).abs() < 1e-12);

        let tone = |freq: f64| -> Vec<f64> {
            (0..800).map(|i| (2.0 * PI * freq * i as f64 / fs).sin()).collect()
        };
        let peak = |data: &[f64]| data[200..600].iter().fold(0.0f64, |m, v| m.max(v.abs()));

        let near = peak(&continuous_wavelet_transform(&tone(1.2), 10.0, family));
        let far = peak(&continuous_wavelet_transform(&tone(8.0), 10.0, family));
        assert!(near > 10.0 * far);
    }

    #[test]
    fn test_feature_extractor() {
        let config = DetectorConfig::default();
        let extractor = WaveletFeatureExtractor::new(&config.wavelet).unwrap();
        let values: Vec<f64> = (0..400)
            .map(|i| (2.0 * PI * 1.0 * i as f64 / 40.0).sin())
            .collect();
        let signal = Signal::new(values, 40.0).unwrap();

        let features = extractor.extract(&signal).unwrap();
        assert_eq!(features.smoothed_wavelet.len(), 400);
        assert_eq!(features.detected_activity.len(), 400);
        assert_eq!(features.detected_activity.sampling_rate(), 40.0);
    }

    #[test]
    fn test_smoothing_passes_in_order() {
        let config = DetectorConfig::default();
        let extractor = WaveletFeatureExtractor::new(&config.wavelet).unwrap();

        let names = extractor.second.stage_names();
        assert_eq!(names.len(), 3);
        assert_eq!(names[1], "gaussian(sigma=2, radius=4)");
        assert_eq!(names[2], "gaussian(sigma=3, radius=7)");
        assert_eq!(extractor.first.stage_names()[1], "savgol(11, 5)");
    }

    #[test]
    fn test_invalid_scale() {
        assert!(WaveletTransform::new(WaveletFamily::Gaus2, 0.0).is_err());
    }
}
