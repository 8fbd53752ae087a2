//! Detector output: gait sequences and their descriptive metadata

use crate::error::{GsdError, GsdResult};
use serde::{Deserialize, Serialize};

/// Descriptive metadata attached to detector output, not used in computation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Kind of event reported
    pub event_type: String,
    /// Recording system label
    pub tracking_systems: String,
    /// Body location of the sensor
    pub tracked_points: String,
}

impl Default for EventMetadata {
    fn default() -> Self {
        EventMetadata {
            event_type: "gait sequences".to_string(),
            tracking_systems: "SU".to_string(),
            tracked_points: "LowerBack".to_string(),
        }
    }
}

/// One detected walking bout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaitSequence {
    /// Position in the detector output, 0-based
    pub gs_id: usize,
    /// Bout onset in seconds
    #[serde(rename = "Start")]
    pub start: f64,
    /// Bout end in seconds
    #[serde(rename = "End")]
    pub end: f64,
    /// Sampling rate of the input recording
    #[serde(rename = "fs")]
    pub sampling_freq_hz: f64,
}

impl GaitSequence {
    /// Bout duration in seconds
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Row of the exported gait sequence table
#[derive(Serialize)]
struct GaitSequenceRow {
    gs_id: usize,
    #[serde(rename = "Start")]
    start: f64,
    #[serde(rename = "End")]
    end: f64,
}

/// Ordered collection of detected bouts, ascending by start time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaitSequences {
    pub metadata: EventMetadata,
    sequences: Vec<GaitSequence>,
}

impl GaitSequences {
    /// Build the collection from `(start, end)` seconds in output order, ids assigned by position
    pub fn from_bounds<I>(bounds: I, sampling_freq_hz: f64, metadata: EventMetadata) -> Self
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let sequences = bounds
            .into_iter()
            .enumerate()
            .map(|(gs_id, (start, end))| GaitSequence {
                gs_id,
                start,
                end,
                sampling_freq_hz,
            })
            .collect();

        GaitSequences { metadata, sequences }
    }

    pub fn as_slice(&self) -> &[GaitSequence] {
        &self.sequences
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GaitSequence> {
        self.sequences.iter()
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Total walking time in seconds
    pub fn total_duration(&self) -> f64 {
        self.sequences.iter().map(GaitSequence::duration).sum()
    }

    /// Export the `{gs_id, Start, End}` table as JSON rows
    pub fn to_table_json(&self) -> GsdResult<String> {
        let rows: Vec<GaitSequenceRow> = self
            .sequences
            .iter()
            .map(|gs| GaitSequenceRow {
                gs_id: gs.gs_id,
                start: gs.start,
                end: gs.end,
            })
            .collect();

        serde_json::to_string_pretty(&rows).map_err(|e| GsdError::SerializationError {
            message: format!("Failed to serialize gait sequences: {}", e),
        })
    }
}

impl<'a> IntoIterator for &'a GaitSequences {
    type Item = &'a GaitSequence;
    type IntoIter = std::slice::Iter<'a, GaitSequence>;

    fn into_iter(self) -> Self::IntoIter {
        self.sequences.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_follow_output_position() {
        let sequences = GaitSequences::from_bounds(
            vec![(4.5, 9.75), (90.225, 100.525)],
            100.0,
            EventMetadata::default(),
        );

        assert_eq!(sequences.len(), 2);
        let ids: Vec<usize> = sequences.iter().map(|gs| gs.gs_id).collect();
        assert_eq!(ids, vec![0, 1]);
        assert_eq!(sequences.as_slice()[1].sampling_freq_hz, 100.0);
        assert!((sequences.total_duration() - 15.55).abs() < 1e-9);
    }

    #[test]
    fn test_table_export_columns() {
        let sequences = GaitSequences::from_bounds(vec![(1.0, 2.5)], 50.0, EventMetadata::default());
        let json = sequences.to_table_json().unwrap();

        assert!(json.contains("\"gs_id\": 0"));
        assert!(json.contains("\"Start\": 1.0"));
        assert!(json.contains("\"End\": 2.5"));
        assert!(!json.contains("fs"));
    }

    #[test]
    fn test_empty_collection() {
        let sequences = GaitSequences::from_bounds(Vec::<(f64, f64)>::new(), 40.0, EventMetadata::default());
        assert!(sequences.is_empty());
        assert_eq!(sequences.to_table_json().unwrap(), "[]");
        assert_eq!(sequences.metadata.tracked_points, "LowerBack");
    }
}
