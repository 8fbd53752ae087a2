//! Digital filters for accelerometer signal conditioning
//!
//! All filters operate offline on a complete signal. Filters that would
//! shift the signal in time are applied forward and backward so the
//! output stays aligned with the input.

use crate::processor::SignalStage;
use gsd_core::{ensure_sampling_rate, GsdError, GsdResult, Signal};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Drift-removal high-pass numerator, calibrated at a 40 Hz target rate
pub const DRIFT_REMOVAL_B: [f64; 2] = [1.0, -1.0];
/// Drift-removal high-pass denominator
pub const DRIFT_REMOVAL_A: [f64; 2] = [1.0, -0.9748];

/// Filter types supported by the framework
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterType {
    /// Savitzky-Golay polynomial smoothing (low-pass)
    SavitzkyGolay,
    /// IIR high-pass applied with zero phase
    IirHighpass,
    /// Windowed-sinc FIR low-pass applied with zero phase
    FirLowpass,
}

/// Boundary handling for kernel filters, named after the ndimage modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundaryMode {
    /// `d c b a | a b c d | d c b a`
    Reflect,
    /// `a a a a | a b c d | d d d d`
    Nearest,
    /// `0 0 0 0 | a b c d | 0 0 0 0`
    Constant,
}

/// Filter configuration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Filter type
    pub filter_type: FilterType,
    /// Window length in samples (Savitzky-Golay)
    pub window_length: Option<usize>,
    /// Polynomial order (Savitzky-Golay)
    pub polynomial_order: Option<usize>,
    /// Cutoff frequency in Hz (FIR low-pass)
    pub cutoff_freq: Option<f64>,
    /// Number of taps (FIR low-pass), one second of samples when unset
    pub num_taps: Option<usize>,
    /// Numerator coefficients (IIR)
    pub b_coeffs: Option<Vec<f64>>,
    /// Denominator coefficients (IIR)
    pub a_coeffs: Option<Vec<f64>>,
}

impl FilterConfig {
    fn empty(filter_type: FilterType) -> Self {
        Self {
            filter_type,
            window_length: None,
            polynomial_order: None,
            cutoff_freq: None,
            num_taps: None,
            b_coeffs: None,
            a_coeffs: None,
        }
    }

    /// Create Savitzky-Golay filter configuration
    pub fn savgol(window_length: usize, polynomial_order: usize) -> Self {
        Self {
            window_length: Some(window_length),
            polynomial_order: Some(polynomial_order),
            ..Self::empty(FilterType::SavitzkyGolay)
        }
    }

    /// Create IIR high-pass configuration from transfer function coefficients
    pub fn iir_highpass(b_coeffs: Vec<f64>, a_coeffs: Vec<f64>) -> Self {
        Self {
            b_coeffs: Some(b_coeffs),
            a_coeffs: Some(a_coeffs),
            ..Self::empty(FilterType::IirHighpass)
        }
    }

    /// Create FIR low-pass configuration
    pub fn fir_lowpass(cutoff_freq: f64, num_taps: Option<usize>) -> Self {
        Self {
            cutoff_freq: Some(cutoff_freq),
            num_taps,
            ..Self::empty(FilterType::FirLowpass)
        }
    }

    /// Build the configured filter for a signal sampled at `sampling_rate`
    pub fn build(&self, sampling_rate: f64) -> GsdResult<Box<dyn SignalStage>> {
        match self.filter_type {
            FilterType::SavitzkyGolay => {
                let window = require(self.window_length, "Savitzky-Golay filter requires a window length")?;
                let order = require(self.polynomial_order, "Savitzky-Golay filter requires a polynomial order")?;
                Ok(Box::new(SavitzkyGolayFilter::new(window, order)?))
            }
            FilterType::IirHighpass => {
                let b = require(self.b_coeffs.clone(), "IIR filter requires numerator coefficients")?;
                let a = require(self.a_coeffs.clone(), "IIR filter requires denominator coefficients")?;
                Ok(Box::new(ZeroPhaseIirFilter::new(b, a)?))
            }
            FilterType::FirLowpass => {
                let cutoff = require(self.cutoff_freq, "FIR low-pass filter requires a cutoff frequency")?;
                let taps = self
                    .num_taps
                    .unwrap_or_else(|| sampling_rate.round().max(1.0) as usize);
                Ok(Box::new(FirLowpassFilter::new(cutoff, sampling_rate, taps)?))
            }
        }
    }
}

fn require<T>(value: Option<T>, message: &str) -> GsdResult<T> {
    value.ok_or_else(|| GsdError::InvalidConfiguration {
        message: message.to_string(),
    })
}

/// Savitzky-Golay smoothing filter
///
/// Interior samples use the centered least-squares polynomial fit. The first
/// and last half-windows are evaluated on the polynomial fitted to the first
/// and last full window respectively.
pub struct SavitzkyGolayFilter {
    window_length: usize,
    polynomial_order: usize,
    name: String,
}

impl SavitzkyGolayFilter {
    pub fn new(window_length: usize, polynomial_order: usize) -> GsdResult<Self> {
        if window_length % 2 == 0 || window_length < 3 {
            return Err(GsdError::InvalidConfiguration {
                message: format!("Savitzky-Golay window must be odd and >= 3, got {}", window_length),
            });
        }
        if polynomial_order >= window_length {
            return Err(GsdError::InvalidConfiguration {
                message: format!(
                    "Savitzky-Golay polynomial order {} must be less than window {}",
                    polynomial_order, window_length
                ),
            });
        }

        Ok(Self {
            window_length,
            polynomial_order,
            name: format!("savgol({}, {})", window_length, polynomial_order),
        })
    }

    /// Smooth a slice of samples
    pub fn smooth(&self, data: &[f64]) -> GsdResult<Vec<f64>> {
        let n = data.len();
        let window = if n >= self.window_length {
            self.window_length
        } else if n % 2 == 1 {
            n
        } else {
            n.saturating_sub(1)
        };

        // A polynomial of degree >= window - 1 reproduces its samples exactly
        if window <= self.polynomial_order || window < 3 {
            return Ok(data.to_vec());
        }

        let half = window / 2;
        let center = savgol_weights(window, self.polynomial_order, half)?;
        let mut output = vec![0.0; n];

        for i in half..n - half {
            output[i] = dot(&data[i - half..=i + half], &center);
        }

        for pos in 0..half {
            let weights = savgol_weights(window, self.polynomial_order, pos)?;
            output[pos] = dot(&data[..window], &weights);

            let weights = savgol_weights(window, self.polynomial_order, window - 1 - pos)?;
            output[n - 1 - pos] = dot(&data[n - window..], &weights);
        }

        Ok(output)
    }
}

impl SignalStage for SavitzkyGolayFilter {
    fn apply(&self, input: &Signal) -> GsdResult<Signal> {
        Ok(input.with_values(self.smooth(input.values())?))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Least-squares weights that evaluate the fitted polynomial at `eval_pos`
/// within a window of `window` samples.
fn savgol_weights(window: usize, order: usize, eval_pos: usize) -> GsdResult<Vec<f64>> {
    let half = (window / 2) as f64;
    let p = order + 1;
    // Positions scaled to [-1, 1] keep the normal equations well conditioned
    let position = |i: usize| (i as f64 - half) / half;

    let vandermonde: Vec<Vec<f64>> = (0..window)
        .map(|i| powers(position(i), p))
        .collect();

    let mut normal = vec![vec![0.0; p]; p];
    for row in &vandermonde {
        for r in 0..p {
            for c in 0..p {
                normal[r][c] += row[r] * row[c];
            }
        }
    }

    let z = solve_linear_system(normal, powers(position(eval_pos), p)).ok_or_else(|| {
        GsdError::ProcessingError {
            message: format!("Savitzky-Golay normal equations are singular (window {}, order {})", window, order),
        }
    })?;

    Ok(vandermonde.iter().map(|row| dot(row, &z)).collect())
}

fn powers(x: f64, count: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(count);
    let mut value = 1.0;
    for _ in 0..count {
        out.push(value);
        value *= x;
    }
    out
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Gaussian elimination with partial pivoting
pub(crate) fn solve_linear_system(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();

    for col in 0..n {
        let pivot_row = (col..n).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot_row][col].abs() < 1e-300 {
            return None;
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }

    Some(x)
}

/// Linear filter given by transfer function coefficients, applied forward and backward
///
/// The signal is extended at both ends by odd reflection and each pass starts
/// from the steady-state filter state scaled to the first sample, so a
/// constant input produces no start-up transient.
pub struct ZeroPhaseIirFilter {
    b_coeffs: Vec<f64>,
    a_coeffs: Vec<f64>,
    pad_len: Option<usize>,
    name: String,
}

impl ZeroPhaseIirFilter {
    /// Create filter, padding with the full signal length as for drift removal
    pub fn new(b_coeffs: Vec<f64>, a_coeffs: Vec<f64>) -> GsdResult<Self> {
        let (b_coeffs, a_coeffs) = normalize_transfer_function(b_coeffs, a_coeffs)?;
        Ok(Self {
            b_coeffs,
            a_coeffs,
            pad_len: None,
            name: "iir_highpass".to_string(),
        })
    }

    /// Use a fixed padding length instead of the full signal length
    pub fn with_pad_len(mut self, pad_len: usize) -> Self {
        self.pad_len = Some(pad_len);
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Filter a slice of samples
    pub fn filter(&self, data: &[f64]) -> GsdResult<Vec<f64>> {
        let n = data.len();
        if n == 0 {
            return Ok(Vec::new());
        }

        let pad = self.pad_len.unwrap_or(n - 1).min(n - 1);
        let extended = odd_extension(data, pad);
        let zi = steady_state_initial_conditions(&self.b_coeffs, &self.a_coeffs)?;

        let scaled: Vec<f64> = zi.iter().map(|z| z * extended[0]).collect();
        let mut forward = lfilter(&self.b_coeffs, &self.a_coeffs, &extended, &scaled);

        forward.reverse();
        let scaled: Vec<f64> = zi.iter().map(|z| z * forward[0]).collect();
        let mut backward = lfilter(&self.b_coeffs, &self.a_coeffs, &forward, &scaled);
        backward.reverse();

        Ok(backward[pad..pad + n].to_vec())
    }
}

impl SignalStage for ZeroPhaseIirFilter {
    fn apply(&self, input: &Signal) -> GsdResult<Signal> {
        Ok(input.with_values(self.filter(input.values())?))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Pad `b` and `a` to equal length and scale so that `a[0] == 1`
fn normalize_transfer_function(mut b: Vec<f64>, mut a: Vec<f64>) -> GsdResult<(Vec<f64>, Vec<f64>)> {
    if b.is_empty() || a.is_empty() {
        return Err(GsdError::InvalidConfiguration {
            message: "Filter coefficients cannot be empty".to_string(),
        });
    }
    let a0 = a[0];
    if a0 == 0.0 || !a0.is_finite() {
        return Err(GsdError::InvalidConfiguration {
            message: "Leading denominator coefficient must be non-zero".to_string(),
        });
    }

    let len = a.len().max(b.len());
    b.resize(len, 0.0);
    a.resize(len, 0.0);
    b.iter_mut().for_each(|c| *c /= a0);
    a.iter_mut().for_each(|c| *c /= a0);

    Ok((b, a))
}

/// Odd extension: `2*x[0] - x[pad..0]` before and `2*x[n-1] - x[n-2..n-pad-1]` after
fn odd_extension(data: &[f64], pad: usize) -> Vec<f64> {
    let n = data.len();
    let mut extended = Vec::with_capacity(n + 2 * pad);

    extended.extend((1..=pad).rev().map(|i| 2.0 * data[0] - data[i]));
    extended.extend_from_slice(data);
    extended.extend((1..=pad).map(|i| 2.0 * data[n - 1] - data[n - 1 - i]));

    extended
}

/// Transposed direct form II filtering with initial state `zi`
fn lfilter(b: &[f64], a: &[f64], x: &[f64], zi: &[f64]) -> Vec<f64> {
    let order = b.len() - 1;
    let mut z = zi.to_vec();
    let mut y = Vec::with_capacity(x.len());

    for &sample in x {
        let out = b[0] * sample + z.first().copied().unwrap_or(0.0);
        for k in 0..order {
            let next = if k + 1 < order { z[k + 1] } else { 0.0 };
            z[k] = b[k + 1] * sample + next - a[k + 1] * out;
        }
        y.push(out);
    }

    y
}

/// Filter state for the step response steady state
///
/// Solves `(I - A^T) zi = b[1..] - a[1..] * b[0]` where `A` is the companion
/// matrix of the denominator.
fn steady_state_initial_conditions(b: &[f64], a: &[f64]) -> GsdResult<Vec<f64>> {
    let order = b.len() - 1;
    if order == 0 {
        return Ok(Vec::new());
    }

    let mut system = vec![vec![0.0; order]; order];
    for (i, row) in system.iter_mut().enumerate() {
        row[i] = 1.0;
        row[0] += a[i + 1];
        if i + 1 < order {
            row[i + 1] -= 1.0;
        }
    }
    let rhs: Vec<f64> = (1..=order).map(|k| b[k] - a[k] * b[0]).collect();

    solve_linear_system(system, rhs).ok_or_else(|| GsdError::ProcessingError {
        message: "Filter has no steady state (pole at z = 1)".to_string(),
    })
}

/// Windowed-sinc FIR low-pass (Hamming window), applied forward and backward
pub struct FirLowpassFilter {
    coeffs: Vec<f64>,
    inner: ZeroPhaseIirFilter,
}

impl FirLowpassFilter {
    pub fn new(cutoff_freq: f64, sampling_rate: f64, num_taps: usize) -> GsdResult<Self> {
        ensure_sampling_rate("FIR low-pass design", sampling_rate)?;
        if !(cutoff_freq > 0.0 && cutoff_freq < sampling_rate / 2.0) {
            return Err(GsdError::InvalidConfiguration {
                message: format!(
                    "FIR cutoff {}Hz must lie between 0 and Nyquist ({}Hz)",
                    cutoff_freq,
                    sampling_rate / 2.0
                ),
            });
        }

        let coeffs = design_lowpass_hamming(cutoff_freq, sampling_rate, num_taps);
        let pad_len = 3 * coeffs.len();
        let inner = ZeroPhaseIirFilter::new(coeffs.clone(), vec![1.0])?
            .with_pad_len(pad_len)
            .with_name(&format!("fir_lowpass({}Hz, {} taps)", cutoff_freq, coeffs.len()));

        Ok(Self { coeffs, inner })
    }

    /// Designed filter taps
    pub fn coefficients(&self) -> &[f64] {
        &self.coeffs
    }

    pub fn filter(&self, data: &[f64]) -> GsdResult<Vec<f64>> {
        self.inner.filter(data)
    }
}

impl SignalStage for FirLowpassFilter {
    fn apply(&self, input: &Signal) -> GsdResult<Signal> {
        self.inner.apply(input)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

/// Windowed-sinc low-pass taps with unity DC gain, tap count forced odd
fn design_lowpass_hamming(cutoff_hz: f64, sample_rate: f64, num_taps: usize) -> Vec<f64> {
    let num_taps = if num_taps % 2 == 0 { num_taps + 1 } else { num_taps.max(1) };
    if num_taps == 1 {
        return vec![1.0];
    }
    let fc = cutoff_hz / sample_rate;
    let mid = (num_taps - 1) as f64 / 2.0;

    let mut coeffs: Vec<f64> = (0..num_taps)
        .map(|i| {
            let n = i as f64 - mid;
            let sinc = if n.abs() < 1e-10 {
                2.0 * PI * fc
            } else {
                (2.0 * PI * fc * n).sin() / n
            };
            let window = 0.54 - 0.46 * (2.0 * PI * i as f64 / (num_taps - 1) as f64).cos();
            sinc * window
        })
        .collect();

    let sum: f64 = coeffs.iter().sum();
    if sum.abs() > 1e-10 {
        coeffs.iter_mut().for_each(|c| *c /= sum);
    }

    coeffs
}

/// Gaussian kernel smoothing with configurable boundary handling
pub struct GaussianFilter {
    kernel: Vec<f64>,
    radius: usize,
    mode: BoundaryMode,
    name: String,
}

impl GaussianFilter {
    pub fn new(sigma: f64, radius: usize, mode: BoundaryMode) -> Self {
        let sigma = if sigma > 0.0 { sigma } else { f64::MIN_POSITIVE };
        let mut kernel: Vec<f64> = (0..=2 * radius)
            .map(|i| {
                let x = i as f64 - radius as f64;
                (-0.5 * x * x / (sigma * sigma)).exp()
            })
            .collect();
        let sum: f64 = kernel.iter().sum();
        kernel.iter_mut().for_each(|k| *k /= sum);

        Self {
            kernel,
            radius,
            mode,
            name: format!("gaussian(sigma={}, radius={})", sigma, radius),
        }
    }

    pub fn smooth(&self, data: &[f64]) -> Vec<f64> {
        let n = data.len();
        let radius = self.radius as isize;

        (0..n)
            .map(|i| {
                self.kernel
                    .iter()
                    .enumerate()
                    .map(|(k, w)| {
                        let j = i as isize + k as isize - radius;
                        sample_with_boundary(data, j, self.mode) * w
                    })
                    .sum()
            })
            .collect()
    }
}

impl SignalStage for GaussianFilter {
    fn apply(&self, input: &Signal) -> GsdResult<Signal> {
        Ok(input.with_values(self.smooth(input.values())))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Read `data[index]` with out-of-range indices resolved by `mode`
fn sample_with_boundary(data: &[f64], index: isize, mode: BoundaryMode) -> f64 {
    let n = data.len() as isize;
    if n == 0 {
        return 0.0;
    }
    if (0..n).contains(&index) {
        return data[index as usize];
    }

    match mode {
        BoundaryMode::Constant => 0.0,
        BoundaryMode::Nearest => data[index.clamp(0, n - 1) as usize],
        BoundaryMode::Reflect => {
            // Period of the half-sample symmetric extension is 2n
            let period = 2 * n;
            let mut j = index.rem_euclid(period);
            if j >= n {
                j = period - 1 - j;
            }
            data[j as usize]
        }
    }
}

/// Centered moving average, edges average over the samples available
pub struct MovingAverageFilter {
    window_size: usize,
}

impl MovingAverageFilter {
    /// Create new moving average filter
    pub fn new(window_size: usize) -> Self {
        MovingAverageFilter {
            window_size: window_size.max(1),
        }
    }

    pub fn smooth(&self, data: &[f64]) -> Vec<f64> {
        let n = data.len();
        let before = (self.window_size - 1) / 2;
        let after = self.window_size - 1 - before;

        let mut prefix = Vec::with_capacity(n + 1);
        prefix.push(0.0);
        for &v in data {
            let last = prefix[prefix.len() - 1];
            prefix.push(last + v);
        }

        (0..n)
            .map(|i| {
                let lo = i.saturating_sub(before);
                let hi = (i + after).min(n - 1);
                (prefix[hi + 1] - prefix[lo]) / (hi + 1 - lo) as f64
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f64, fs: f64, n: usize) -> Vec<f64> {
        (0..n).map(|i| (2.0 * PI * freq * i as f64 / fs).sin()).collect()
    }

    #[test]
    fn test_savgol_preserves_polynomials() {
        // A cubic lies in the span of an order-7 fit, edges included
        let data: Vec<f64> = (0..60)
            .map(|i| {
                let t = i as f64 * 0.1;
                0.5 * t * t * t - t + 2.0
            })
            .collect();
        let filter = SavitzkyGolayFilter::new(21, 7).unwrap();
        let smoothed = filter.smooth(&data).unwrap();

        for (a, b) in data.iter().zip(&smoothed) {
            assert!((a - b).abs() < 1e-6, "{} vs {}", a, b);
        }
    }

    #[test]
    fn test_savgol_short_signal() {
        let filter = SavitzkyGolayFilter::new(21, 7).unwrap();
        let data = vec![1.0, 2.0, 0.5, 3.0];
        assert_eq!(filter.smooth(&data).unwrap(), data);
        assert!(filter.smooth(&[]).unwrap().is_empty());

        // 11 samples: window shrinks to 11 and still smooths
        let noisy: Vec<f64> = (0..11).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let smoothed = filter.smooth(&noisy).unwrap();
        assert_eq!(smoothed.len(), 11);
    }

    #[test]
    fn test_savgol_rejects_invalid_window() {
        assert!(SavitzkyGolayFilter::new(20, 7).is_err());
        assert!(SavitzkyGolayFilter::new(5, 5).is_err());
    }

    #[test]
    fn test_savgol_attenuates_alternating_noise() {
        let base = sine(1.0, 40.0, 400);
        let noisy: Vec<f64> = base
            .iter()
            .enumerate()
            .map(|(i, v)| v + if i % 2 == 0 { 0.2 } else { -0.2 })
            .collect();
        let smoothed = SavitzkyGolayFilter::new(11, 5).unwrap().smooth(&noisy).unwrap();

        let error: f64 = smoothed[20..380]
            .iter()
            .zip(&base[20..380])
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max);
        assert!(error < 0.1, "residual {}", error);
    }

    #[test]
    fn test_drift_removal_removes_constant() {
        let filter = ZeroPhaseIirFilter::new(DRIFT_REMOVAL_B.to_vec(), DRIFT_REMOVAL_A.to_vec()).unwrap();
        let output = filter.filter(&vec![9.81; 500]).unwrap();

        assert_eq!(output.len(), 500);
        assert!(output.iter().all(|v| v.abs() < 1e-9));
    }

    #[test]
    fn test_drift_removal_passes_gait_band() {
        let filter = ZeroPhaseIirFilter::new(DRIFT_REMOVAL_B.to_vec(), DRIFT_REMOVAL_A.to_vec()).unwrap();
        let input: Vec<f64> = sine(2.0, 40.0, 800).iter().map(|v| v + 1.0).collect();
        let output = filter.filter(&input).unwrap();

        let peak = output[200..600].iter().fold(0.0f64, |m, v| m.max(v.abs()));
        assert!((peak - 1.0).abs() < 0.1, "peak {}", peak);
    }

    #[test]
    fn test_steady_state_first_order() {
        let zi = steady_state_initial_conditions(&DRIFT_REMOVAL_B, &DRIFT_REMOVAL_A).unwrap();
        assert_eq!(zi.len(), 1);
        assert!((zi[0] + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_fir_lowpass_design() {
        let filter = FirLowpassFilter::new(3.2, 40.0, 40).unwrap();
        let taps = filter.coefficients();

        assert_eq!(taps.len(), 41);
        assert!((taps.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        // Symmetric taps give linear phase
        for i in 0..taps.len() / 2 {
            assert!((taps[i] - taps[taps.len() - 1 - i]).abs() < 1e-12);
        }
        assert!(FirLowpassFilter::new(25.0, 40.0, 41).is_err());
    }

    #[test]
    fn test_fir_lowpass_attenuates_high_frequency() {
        let filter = FirLowpassFilter::new(3.2, 40.0, 41).unwrap();
        let slow = filter.filter(&sine(1.0, 40.0, 800)).unwrap();
        let fast = filter.filter(&sine(12.0, 40.0, 800)).unwrap();

        let slow_peak = slow[200..600].iter().fold(0.0f64, |m, v| m.max(v.abs()));
        let fast_peak = fast[200..600].iter().fold(0.0f64, |m, v| m.max(v.abs()));
        assert!(slow_peak > 0.9);
        assert!(fast_peak < 0.01);
    }

    #[test]
    fn test_gaussian_modes() {
        let data = vec![1.0, 2.0, 3.0];
        assert_eq!(sample_with_boundary(&data, -1, BoundaryMode::Reflect), 1.0);
        assert_eq!(sample_with_boundary(&data, -2, BoundaryMode::Reflect), 2.0);
        assert_eq!(sample_with_boundary(&data, 3, BoundaryMode::Reflect), 3.0);
        assert_eq!(sample_with_boundary(&data, 4, BoundaryMode::Reflect), 2.0);
        assert_eq!(sample_with_boundary(&data, -5, BoundaryMode::Nearest), 1.0);
        assert_eq!(sample_with_boundary(&data, 7, BoundaryMode::Nearest), 3.0);
        assert_eq!(sample_with_boundary(&data, -1, BoundaryMode::Constant), 0.0);
    }

    #[test]
    fn test_gaussian_preserves_constant() {
        let filter = GaussianFilter::new(3.0, 7, BoundaryMode::Nearest);
        let output = filter.smooth(&vec![2.5; 50]);
        assert!(output.iter().all(|v| (v - 2.5).abs() < 1e-12));
    }

    #[test]
    fn test_moving_average() {
        let filter = MovingAverageFilter::new(3);
        let output = filter.smooth(&[0.0, 3.0, 0.0, 3.0]);
        assert_eq!(output, vec![1.5, 1.0, 2.0, 1.5]);

        let constant = MovingAverageFilter::new(40).smooth(&vec![1.0; 100]);
        assert!(constant.iter().all(|v| (v - 1.0).abs() < 1e-12));
    }

    #[test]
    fn test_configs_build_in_sequence() {
        let configs = vec![
            FilterConfig::savgol(21, 7),
            FilterConfig::iir_highpass(DRIFT_REMOVAL_B.to_vec(), DRIFT_REMOVAL_A.to_vec()),
            FilterConfig::fir_lowpass(3.2, None),
        ];

        let mut signal = Signal::new(vec![1.0; 400], 40.0).unwrap();
        for config in &configs {
            signal = config.build(40.0).unwrap().apply(&signal).unwrap();
        }
        assert_eq!(signal.len(), 400);
        assert!(signal.values().iter().all(|v| v.abs() < 1e-6));
    }

    #[test]
    fn test_missing_parameters_rejected() {
        let mut config = FilterConfig::savgol(21, 7);
        config.polynomial_order = None;
        assert!(config.build(40.0).is_err());
    }
}
