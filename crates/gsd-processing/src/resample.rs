//! Band-limited resampling in the Fourier domain

use crate::processor::{SignalStage, StageType};
use gsd_core::{ensure_sampling_rate, GsdError, GsdResult, Signal};
use num_complex::Complex;
use realfft::RealFftPlanner;

/// Number of output samples for a recording of `len` samples resampled `fs_in -> fs_out`
pub fn resampled_len(len: usize, fs_in: f64, fs_out: f64) -> usize {
    if len == 0 {
        return 0;
    }
    ((len as f64 * fs_out / fs_in).round() as usize).max(1)
}

/// Resample `data` from `fs_in` to `fs_out` by truncating or zero-padding its spectrum
///
/// The input is treated as one period of a periodic signal, so content above
/// the lower of the two Nyquist frequencies is discarded.
pub fn resample(data: &[f64], fs_in: f64, fs_out: f64) -> GsdResult<Vec<f64>> {
    ensure_sampling_rate("resampling input", fs_in)?;
    ensure_sampling_rate("resampling target", fs_out)?;

    let n = data.len();
    let m = resampled_len(n, fs_in, fs_out);
    if n == 0 || m == n {
        return Ok(data.to_vec());
    }

    let mut planner = RealFftPlanner::<f64>::new();
    let r2c = planner.plan_fft_forward(n);
    let c2r = planner.plan_fft_inverse(m);

    let mut input = data.to_vec();
    let mut spectrum = r2c.make_output_vec();
    r2c.process(&mut input, &mut spectrum).map_err(fft_error)?;

    let mut resized = c2r.make_input_vec();
    let shared = resized.len().min(spectrum.len());
    resized[..shared].copy_from_slice(&spectrum[..shared]);

    // Split or fold the Nyquist bin of the shorter length
    let shorter = n.min(m);
    if shorter % 2 == 0 {
        let nyquist = shorter / 2;
        if m < n {
            resized[nyquist] = Complex::new(2.0 * resized[nyquist].re, 0.0);
        } else {
            resized[nyquist] *= 0.5;
        }
    }

    // The inverse real transform requires purely real DC and Nyquist bins
    resized[0].im = 0.0;
    if m % 2 == 0 {
        if let Some(last) = resized.last_mut() {
            last.im = 0.0;
        }
    }

    let mut output = c2r.make_output_vec();
    c2r.process(&mut resized, &mut output).map_err(fft_error)?;

    let scale = 1.0 / n as f64;
    output.iter_mut().for_each(|v| *v *= scale);
    Ok(output)
}

fn fft_error(e: realfft::FftError) -> GsdError {
    GsdError::ProcessingError {
        message: format!("FFT resampling failed: {}", e),
    }
}

/// Stage converting a signal to a fixed target rate
pub struct Resampler {
    target_rate: f64,
    name: String,
}

impl Resampler {
    pub fn new(target_rate: f64) -> GsdResult<Self> {
        ensure_sampling_rate("resampling target", target_rate)?;
        Ok(Self {
            target_rate,
            name: format!("resample({}Hz)", target_rate),
        })
    }

    pub fn target_rate(&self) -> f64 {
        self.target_rate
    }
}

impl SignalStage for Resampler {
    fn apply(&self, input: &Signal) -> GsdResult<Signal> {
        let values = resample(input.values(), input.sampling_rate(), self.target_rate)?;
        Signal::new(values, self.target_rate)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn stage_type(&self) -> StageType {
        StageType::Resampler
    }
}
