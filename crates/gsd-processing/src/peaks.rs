//! Peak detection and pulse-train extraction

use gsd_core::{IndexInterval, Peak, PeakPolarity, PulseTrain, Signal};
use num_traits::Float;

/// Indices of local maxima
///
/// A maximum is a sample, or a flat run of equal samples, strictly higher than
/// both neighbours. Flat runs report their middle index (rounded down). The
/// first and last samples are never maxima.
pub fn local_maxima<T: Float>(values: &[T]) -> Vec<usize> {
    let mut maxima = Vec::new();
    if values.len() < 3 {
        return maxima;
    }

    let last = values.len() - 1;
    let mut i = 1;
    while i < last {
        if values[i - 1] < values[i] {
            let mut ahead = i + 1;
            while ahead < last && values[ahead] == values[i] {
                ahead += 1;
            }
            if values[ahead] < values[i] {
                maxima.push((i + ahead - 1) / 2);
                i = ahead;
            }
        }
        i += 1;
    }

    maxima
}

/// Indices of local minima, the maxima of the sign-inverted values
pub fn local_minima<T: Float>(values: &[T]) -> Vec<usize> {
    let inverted: Vec<T> = values.iter().map(|&v| -v).collect();
    local_maxima(&inverted)
}

/// Local maxima with value `> threshold` and local minima with value `< -threshold`
///
/// Returns `(min_indices, max_indices)`, both ascending.
pub fn find_local_min_max<T: Float>(values: &[T], threshold: T) -> (Vec<usize>, Vec<usize>) {
    let maxima = local_maxima(values)
        .into_iter()
        .filter(|&i| values[i] > threshold)
        .collect();
    let minima = local_minima(values)
        .into_iter()
        .filter(|&i| values[i] < -threshold)
        .collect();

    (minima, maxima)
}

/// Typed peaks of one polarity at `indices`
pub fn peaks_at(values: &[f64], indices: &[usize], polarity: PeakPolarity) -> Vec<Peak> {
    indices
        .iter()
        .map(|&index| Peak { index, value: values[index], polarity })
        .collect()
}

/// Group same-polarity peaks, ascending by index, into pulse trains
///
/// A train continues while the distance to the next peak is below `max_gap`
/// samples. Every train reports its peak count as steps, single peaks included.
pub fn identify_pulse_trains(peaks: &[Peak], max_gap: usize) -> Vec<PulseTrain> {
    let mut trains = Vec::new();
    let mut current: Vec<Peak> = Vec::new();

    for &peak in peaks {
        if let Some(previous) = current.last().map(|p| p.index) {
            if peak.index - previous >= max_gap {
                trains.extend(PulseTrain::from_peaks(std::mem::take(&mut current)));
            }
        }
        current.push(peak);
    }
    trains.extend(PulseTrain::from_peaks(current));

    trains
}

/// Pulse trains of both polarities
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PulseTrains {
    /// Trains built from local maxima (mid-swing candidates)
    pub maxima: Vec<PulseTrain>,
    pub minima: Vec<PulseTrain>,
}

impl PulseTrains {
    /// Spans of the max-polarity trains
    pub fn max_intervals(&self) -> Vec<IndexInterval> {
        self.maxima.iter().map(|t| t.interval).collect()
    }

    pub fn min_intervals(&self) -> Vec<IndexInterval> {
        self.minima.iter().map(|t| t.interval).collect()
    }

    /// All max-polarity peak indices, ascending
    pub fn max_peaks(&self) -> Vec<usize> {
        self.maxima.iter().flat_map(|t| t.peak_indices()).collect()
    }
}

/// Extracts thresholded peaks and groups them into pulse trains
#[derive(Debug, Clone)]
pub struct PulseTrainExtractor {
    max_gap: usize,
    min_steps: usize,
}

impl PulseTrainExtractor {
    /// `max_gap` in samples at the signal's rate
    pub fn new(max_gap: usize, min_steps: usize) -> Self {
        Self {
            max_gap: max_gap.max(1),
            min_steps,
        }
    }

    pub fn extract(&self, signal: &Signal, threshold: f64) -> PulseTrains {
        let values = signal.values();
        let (minima, maxima) = find_local_min_max(values, threshold);

        PulseTrains {
            maxima: self.trains(&peaks_at(values, &maxima, PeakPolarity::Maximum)),
            minima: self.trains(&peaks_at(values, &minima, PeakPolarity::Minimum)),
        }
    }

    fn trains(&self, peaks: &[Peak]) -> Vec<PulseTrain> {
        identify_pulse_trains(peaks, self.max_gap)
            .into_iter()
            .filter(|train| train.steps >= self.min_steps)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_maxima_plateaus_and_edges() {
        let values = [5.0, 1.0, 3.0, 3.0, 3.0, 1.0, 2.0, 2.0, 0.0, 4.0];
        assert_eq!(local_maxima(&values), vec![3, 6]);

        // Plateau running into the edge is not a maximum
        assert!(local_maxima(&[0.0, 1.0, 1.0]).is_empty());
        assert!(local_maxima(&[1.0f32, 2.0]).is_empty());
        assert!(local_maxima::<f64>(&[]).is_empty());
    }

    #[test]
    fn test_local_min_max_threshold() {
        let values = [0.0, 0.5, 0.0, -0.5, 0.0, 0.1, 0.0, -0.1, 0.0];
        let (minima, maxima) = find_local_min_max(&values, 0.2);
        assert_eq!(maxima, vec![1]);
        assert_eq!(minima, vec![3]);

        // Strict comparison at the threshold
        let (minima, maxima) = find_local_min_max(&values, 0.5);
        assert!(maxima.is_empty());
        assert!(minima.is_empty());
    }

    #[test]
    fn test_typed_peaks() {
        let values = [0.0, -1.0, 0.0, 1.0, 0.0];
        let (minima, _) = find_local_min_max(&values, 0.5);
        let peaks = peaks_at(&values, &minima, PeakPolarity::Minimum);
        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].index, 1);
        assert_eq!(peaks[0].magnitude(), 1.0);
    }

    #[test]
    fn test_pulse_trains_split_on_gap() {
        let values = vec![1.0; 600];
        let peaks = peaks_at(&values, &[10, 30, 50, 70, 300, 320, 500], PeakPolarity::Maximum);
        let trains = identify_pulse_trains(&peaks, 140);

        assert_eq!(trains.len(), 3);
        assert_eq!(trains[0].interval, IndexInterval { start: 10, end: 70 });
        assert_eq!(trains[0].steps, 4);
        assert_eq!(trains[1].steps, 2);
        assert_eq!(trains[2].steps, 1);
        assert!(identify_pulse_trains(&[], 140).is_empty());
    }

    #[test]
    fn test_extractor_discards_short_trains() {
        // Four cycles of a square-ish wave, then two isolated cycles far away
        let mut values = vec![0.0; 600];
        for cycle in 0..4 {
            values[20 + cycle * 20] = 1.0;
            values[30 + cycle * 20] = -1.0;
        }
        values[400] = 1.0;
        values[410] = -1.0;

        let signal = Signal::new(values, 40.0).unwrap();
        let trains = PulseTrainExtractor::new(140, 4).extract(&signal, 0.5);

        assert_eq!(trains.maxima.len(), 1);
        assert_eq!(trains.maxima[0].steps, 4);
        assert_eq!(trains.maxima[0].peaks[0].value, 1.0);
        assert_eq!(trains.minima.len(), 1);
        assert_eq!(trains.minima[0].polarity, PeakPolarity::Minimum);
        assert_eq!(trains.min_intervals()[0], IndexInterval { start: 30, end: 90 });
        assert_eq!(trains.max_peaks(), vec![20, 40, 60, 80]);
    }
}
