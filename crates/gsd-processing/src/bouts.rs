//! Merging of pulse trains into finalised walking bouts

use crate::peaks::PulseTrains;
use gsd_core::{find_consecutive_groups, IndexInterval};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Overlapping parts of two ascending, internally disjoint interval sets
pub fn intersect_intervals(a: &[IndexInterval], b: &[IndexInterval]) -> Vec<IndexInterval> {
    let mut result = Vec::new();
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        if let Some(overlap) = a[i].intersection(&b[j]) {
            result.push(overlap);
        }
        // Advance whichever interval ends first
        if a[i].end < b[j].end {
            i += 1;
        } else {
            j += 1;
        }
    }

    result
}

/// Provisional walking bout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkingBout {
    pub interval: IndexInterval,
    /// Number of mid-swing peaks inside the interval
    pub steps: usize,
    /// Max-polarity peak indices inside the interval, ascending
    pub mid_swing_peaks: Vec<usize>,
}

impl WalkingBout {
    /// Bout over `interval` counting the peaks from `max_peaks` it contains
    pub fn from_interval(interval: IndexInterval, max_peaks: &[usize]) -> Self {
        let lo = max_peaks.partition_point(|&p| p < interval.start);
        let hi = max_peaks.partition_point(|&p| p <= interval.end);
        let mid_swing_peaks = max_peaks[lo..hi].to_vec();

        WalkingBout {
            interval,
            steps: mid_swing_peaks.len(),
            mid_swing_peaks,
        }
    }
}

/// Build bouts from ascending intervals, merging overlapping or adjacent ones
pub fn organize_bouts(intervals: &[IndexInterval], max_peaks: &[usize]) -> Vec<WalkingBout> {
    let mut merged: Vec<IndexInterval> = Vec::with_capacity(intervals.len());
    for &interval in intervals {
        match merged.last_mut() {
            Some(last) if interval.start <= last.end + 1 => {
                last.end = last.end.max(interval.end);
            }
            _ => merged.push(interval),
        }
    }

    merged
        .into_iter()
        .map(|interval| WalkingBout::from_interval(interval, max_peaks))
        .collect()
}

/// Label every sample covered by a bout
pub fn label_walking(bouts: &[WalkingBout], len: usize) -> Vec<bool> {
    let mut labels = vec![false; len];
    for bout in bouts {
        let end = bout.interval.end.min(len.saturating_sub(1));
        if bout.interval.start <= end {
            labels[bout.interval.start..=end].iter_mut().for_each(|l| *l = true);
        }
    }
    labels
}

/// Relabel runs of unlabelled samples no longer than `max_gap` as walking
pub fn bridge_short_gaps(labels: &mut [bool], max_gap: usize) {
    let gaps: Vec<bool> = labels.iter().map(|&l| !l).collect();
    for gap in find_consecutive_groups(&gaps) {
        if gap.len() <= max_gap {
            labels[gap.start..=gap.end].iter_mut().for_each(|l| *l = true);
        }
    }
}

/// Result of bout finalisation
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MergedBouts {
    /// Provisional bouts that met the minimum step count
    pub provisional: Vec<WalkingBout>,
    /// Final bout spans after gap bridging, ascending and disjoint
    pub intervals: Vec<IndexInterval>,
}

impl MergedBouts {
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Mid-swing peaks of all surviving provisional bouts
    pub fn mid_swing_peaks(&self) -> Vec<usize> {
        self.provisional
            .iter()
            .flat_map(|b| b.mid_swing_peaks.iter().copied())
            .collect()
    }
}

/// Turns pulse trains into final bout spans
#[derive(Debug, Clone)]
pub struct BoutMerger {
    min_steps: usize,
    max_gap: usize,
}

impl BoutMerger {
    /// `max_gap` in samples at the signal's rate
    pub fn new(min_steps: usize, max_gap: usize) -> Self {
        Self { min_steps, max_gap }
    }

    /// Finalise bouts over a conditioned signal of `signal_len` samples
    pub fn merge(&self, trains: &PulseTrains, signal_len: usize) -> MergedBouts {
        let walking_periods = intersect_intervals(&trains.max_intervals(), &trains.min_intervals());
        if walking_periods.is_empty() || signal_len == 0 {
            debug!("no overlapping pulse trains");
            return MergedBouts::default();
        }

        let mut bouts = organize_bouts(&walking_periods, &trains.max_peaks());
        clamp_to_signal(&mut bouts, signal_len);

        let candidates = bouts.len();
        bouts.retain(|b| b.steps >= self.min_steps);
        debug!(candidates, kept = bouts.len(), "provisional bouts");
        if bouts.is_empty() {
            return MergedBouts::default();
        }

        let mut labels = label_walking(&bouts, signal_len);
        bridge_short_gaps(&mut labels, self.max_gap);

        MergedBouts {
            provisional: bouts,
            intervals: find_consecutive_groups(&labels),
        }
    }
}

/// First bout starts at index 1 or later, last bout ends at the final index or earlier
fn clamp_to_signal(bouts: &mut [WalkingBout], signal_len: usize) {
    let last_index = signal_len - 1;

    if let Some(first) = bouts.first_mut() {
        first.interval.start = first.interval.start.max(1).min(first.interval.end.max(1));
        first.interval.end = first.interval.end.max(first.interval.start);
    }
    if let Some(last) = bouts.last_mut() {
        last.interval.end = last.interval.end.min(last_index);
        last.interval.start = last.interval.start.min(last.interval.end);
    }
}
