//! Activity envelope and adaptive threshold selection

use crate::config::GateParams;
use crate::filters::MovingAverageFilter;
use crate::peaks::{local_maxima, local_minima};
use gsd_core::{find_consecutive_groups, IndexInterval, Signal};
use num_traits::Float;
use rustfft::{num_complex::Complex, FftPlanner};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, warn};

/// Magnitude of the analytic signal
pub fn hilbert_magnitude(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }

    let mut planner = FftPlanner::<f64>::new();
    let mut buffer: Vec<Complex<f64>> = values.iter().map(|&x| Complex::new(x, 0.0)).collect();
    planner.plan_fft_forward(n).process(&mut buffer);

    // Keep DC and Nyquist, double positive frequencies, drop negative ones
    let half = n / 2;
    for (k, bin) in buffer.iter_mut().enumerate() {
        if k == 0 || (n % 2 == 0 && k == half) {
            continue;
        }
        if k <= half {
            *bin *= 2.0;
        } else {
            *bin = Complex::new(0.0, 0.0);
        }
    }

    planner.plan_fft_inverse(n).process(&mut buffer);
    let scale = 1.0 / n as f64;
    buffer.iter().map(|c| c.norm() * scale).collect()
}

/// Hilbert magnitude smoothed by a centred moving average
pub fn activity_envelope(values: &[f64], smoothing_window: usize) -> Vec<f64> {
    let magnitude = hilbert_magnitude(values);
    MovingAverageFilter::new(smoothing_window).smooth(&magnitude)
}

/// Alarm raised at sample `i` when `envelope[i..=i + duration]` stays above `level`
///
/// The last `duration` samples can never raise the alarm.
pub fn sustained_alarm(envelope: &[f64], level: f64, duration: usize) -> Vec<bool> {
    let n = envelope.len();
    let mut alarm = vec![false; n];
    if n <= duration {
        return alarm;
    }

    let above: Vec<bool> = envelope.iter().map(|&v| v > level).collect();
    let mut count = above[..=duration].iter().filter(|&&a| a).count();
    for i in 0..n - duration {
        if i > 0 {
            count += above[i + duration] as usize;
            count -= above[i - 1] as usize;
        }
        alarm[i] = count == duration + 1;
    }
    alarm
}

/// Alarm runs of at least `min_len` samples
pub fn sustained_runs(alarm: &[bool], min_len: usize) -> Vec<IndexInterval> {
    find_consecutive_groups(alarm)
        .into_iter()
        .filter(|run| run.len() >= min_len)
        .collect()
}

/// Percentile with linear interpolation between closest ranks, `q` in `[0, 100]`
pub fn percentile<T: Float>(values: &[T], q: f64) -> Option<T> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let position = q.clamp(0.0, 100.0) / 100.0 * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = T::from(position - lower as f64)?;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Where the peak threshold came from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ThresholdSource {
    /// Percentile of the peak magnitudes inside surviving activity
    Adaptive(f64),
    /// Fixed fallback when no activity survives the gate
    Default(f64),
}

impl ThresholdSource {
    pub fn value(&self) -> f64 {
        match *self {
            ThresholdSource::Adaptive(v) | ThresholdSource::Default(v) => v,
        }
    }

    pub fn is_adaptive(&self) -> bool {
        matches!(self, ThresholdSource::Adaptive(_))
    }
}

/// Outcome of the envelope gate
#[derive(Debug, Clone, PartialEq)]
pub struct GateDecision {
    pub source: ThresholdSource,
    /// Envelope level the alarm had to stay above
    pub alarm_level: f64,
    /// Alarm runs long enough to count as activity
    pub active_runs: Vec<IndexInterval>,
    /// Envelope outside the active runs zeroed
    pub gated_envelope: Vec<f64>,
}

impl GateDecision {
    pub fn threshold(&self) -> f64 {
        self.source.value()
    }

    /// Signal the peak search runs on: the detected activity for an adaptive
    /// threshold, the smoothed wavelet otherwise
    pub fn select<'a>(&self, detected_activity: &'a Signal, smoothed_wavelet: &'a Signal) -> &'a Signal {
        match self.source {
            ThresholdSource::Adaptive(_) => detected_activity,
            ThresholdSource::Default(_) => smoothed_wavelet,
        }
    }
}

/// Envelope gate selecting the peak threshold
///
/// The alarm level follows the quiet part of the recording: a multiple of a
/// low envelope percentile, clamped to `[min_alarm_level, max_alarm_level]`.
#[derive(Debug, Clone)]
pub struct EnvelopeGate {
    smoothing_window: usize,
    alarm_duration: usize,
    min_active_len: usize,
    noise_percentile: f64,
    noise_multiplier: f64,
    min_alarm_level: f64,
    max_alarm_level: f64,
    percentile: f64,
    default_threshold: f64,
}

impl EnvelopeGate {
    /// Gate for signals sampled at `sampling_rate`
    pub fn new(params: &GateParams, sampling_rate: f64) -> Self {
        let samples = |seconds: f64| (seconds * sampling_rate).round().max(0.0) as usize;
        Self {
            smoothing_window: samples(params.envelope_window_s).max(1),
            alarm_duration: samples(params.alarm_duration_s),
            min_active_len: samples(params.min_active_duration_s),
            noise_percentile: params.noise_percentile,
            noise_multiplier: params.noise_multiplier,
            min_alarm_level: params.min_alarm_level,
            max_alarm_level: params.max_alarm_level,
            percentile: params.threshold_percentile,
            default_threshold: params.default_threshold,
        }
    }

    /// Envelope level separating activity from the noise floor
    pub fn alarm_level(&self, envelope: &[f64]) -> f64 {
        let floor = percentile(envelope, self.noise_percentile).unwrap_or(0.0);
        (self.noise_multiplier * floor).clamp(self.min_alarm_level, self.max_alarm_level)
    }

    pub fn evaluate(&self, detected_activity: &Signal) -> GateDecision {
        let values = detected_activity.values();
        let envelope = activity_envelope(values, self.smoothing_window);
        let alarm_level = self.alarm_level(&envelope);

        let alarm = sustained_alarm(&envelope, alarm_level, self.alarm_duration);
        let active_runs = sustained_runs(&alarm, self.min_active_len);

        let mut gated_envelope = vec![0.0; envelope.len()];
        for run in &active_runs {
            gated_envelope[run.start..=run.end].copy_from_slice(&envelope[run.start..=run.end]);
        }

        let pool: Vec<f64> = active_runs
            .iter()
            .flat_map(|run| values[run.start..=run.end].iter().copied())
            .collect();

        let source = match self.pooled_threshold(&pool) {
            Some(threshold) => {
                debug!(threshold, alarm_level, runs = active_runs.len(), "adaptive peak threshold");
                ThresholdSource::Adaptive(threshold)
            }
            None => {
                warn!(
                    threshold = self.default_threshold,
                    alarm_level,
                    pooled_samples = pool.len(),
                    "no sustained activity, using default peak threshold"
                );
                ThresholdSource::Default(self.default_threshold)
            }
        };

        GateDecision {
            source,
            alarm_level,
            active_runs,
            gated_envelope,
        }
    }

    /// Percentile of the positive peak magnitudes of both polarities
    fn pooled_threshold(&self, pool: &[f64]) -> Option<f64> {
        let magnitudes: Vec<f64> = local_maxima(pool)
            .into_iter()
            .map(|i| pool[i])
            .chain(local_minima(pool).into_iter().map(|i| -pool[i]))
            .filter(|&m| m > 0.0)
            .collect();

        percentile(&magnitudes, self.percentile)
    }
}
