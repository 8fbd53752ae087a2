//! Index-space types shared by the peak, pulse-train and bout stages

use serde::{Deserialize, Serialize};

/// Closed index range `[start, end]` into a signal, `start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexInterval {
    pub start: usize,
    pub end: usize,
}

impl IndexInterval {
    /// Create interval, `None` when `start > end`
    pub fn new(start: usize, end: usize) -> Option<Self> {
        (start <= end).then_some(IndexInterval { start, end })
    }

    /// Number of samples covered (closed range)
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Always false, a closed interval covers at least one sample
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, index: usize) -> bool {
        self.start <= index && index <= self.end
    }

    /// Closed intervals sharing at least one index
    pub fn overlaps(&self, other: &IndexInterval) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Overlapping part of two intervals
    pub fn intersection(&self, other: &IndexInterval) -> Option<IndexInterval> {
        IndexInterval::new(self.start.max(other.start), self.end.min(other.end))
    }
}

/// Maximal runs of `true` in a boolean mask
pub fn find_consecutive_groups(mask: &[bool]) -> Vec<IndexInterval> {
    let mut groups = Vec::new();
    let mut run_start = None;

    for (index, &flag) in mask.iter().enumerate() {
        match (flag, run_start) {
            (true, None) => run_start = Some(index),
            (false, Some(start)) => {
                groups.push(IndexInterval { start, end: index - 1 });
                run_start = None;
            }
            _ => {}
        }
    }

    if let Some(start) = run_start {
        groups.push(IndexInterval { start, end: mask.len() - 1 });
    }

    groups
}

/// Peak polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeakPolarity {
    /// Local maximum
    Maximum,
    /// Local minimum (maximum of the sign-inverted signal)
    Minimum,
}

/// Local extremum of a signal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    pub index: usize,
    pub value: f64,
    pub polarity: PeakPolarity,
}

impl Peak {
    /// Magnitude measured in the peak's own polarity
    pub fn magnitude(&self) -> f64 {
        match self.polarity {
            PeakPolarity::Maximum => self.value,
            PeakPolarity::Minimum => -self.value,
        }
    }
}

/// Run of adjacent same-polarity peaks treated as one candidate gait cluster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PulseTrain {
    /// Span from the first to the last peak
    pub interval: IndexInterval,
    /// Number of peaks composing the train
    pub steps: usize,
    pub polarity: PeakPolarity,
    /// Constituent peaks, ascending by index
    pub peaks: Vec<Peak>,
}

impl PulseTrain {
    /// Build a train from peaks ascending by index, all of the first peak's polarity
    pub fn from_peaks(peaks: Vec<Peak>) -> Option<Self> {
        let first = peaks.first()?;
        let polarity = first.polarity;
        let interval = IndexInterval::new(first.index, peaks.last()?.index)?;
        if peaks.iter().any(|p| p.polarity != polarity) {
            return None;
        }

        Some(PulseTrain {
            interval,
            steps: peaks.len(),
            polarity,
            peaks,
        })
    }

    pub fn peak_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.peaks.iter().map(|p| p.index)
    }
}
