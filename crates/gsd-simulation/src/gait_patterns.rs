//! Activity patterns and segment schedules for simulated recordings

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Predefined trunk activity patterns
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ActivityPattern {
    /// Upright and motionless
    Still,
    /// Vertical oscillation at the step frequency
    Walking {
        /// Steps per second
        step_frequency: f64,
        /// Vertical oscillation amplitude in g
        amplitude: f64,
    },
}

impl ActivityPattern {
    /// Vertical acceleration offset from gravity, `elapsed` seconds into the segment
    pub fn vertical_at(&self, elapsed: f64) -> f64 {
        match *self {
            ActivityPattern::Still => 0.0,
            ActivityPattern::Walking { step_frequency, amplitude } => {
                amplitude * (2.0 * PI * step_frequency * elapsed).sin()
            }
        }
    }

    pub fn is_walking(&self) -> bool {
        matches!(self, ActivityPattern::Walking { .. })
    }
}

/// Pattern active over `[start, end)` seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivitySegment {
    pub pattern: ActivityPattern,
    pub start: f64,
    pub end: f64,
}

/// Back-to-back activity segments starting at time zero
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivitySchedule {
    segments: Vec<ActivitySegment>,
}

impl ActivitySchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a segment of `duration` seconds
    pub fn then(mut self, pattern: ActivityPattern, duration: f64) -> Self {
        let start = self.total_duration();
        self.segments.push(ActivitySegment {
            pattern,
            start,
            end: start + duration.max(0.0),
        });
        self
    }

    pub fn still(self, duration: f64) -> Self {
        self.then(ActivityPattern::Still, duration)
    }

    pub fn walking(self, duration: f64, step_frequency: f64, amplitude: f64) -> Self {
        self.then(ActivityPattern::Walking { step_frequency, amplitude }, duration)
    }

    /// 200 s at rest with five-second walks starting at 10 s and 100 s
    pub fn two_short_walks() -> Self {
        Self::new()
            .still(10.0)
            .walking(5.0, 2.0, 0.5)
            .still(85.0)
            .walking(5.0, 2.0, 0.5)
            .still(95.0)
    }

    /// Two walks separated by a pause of `pause` seconds
    pub fn interrupted_walk(walk: f64, pause: f64) -> Self {
        Self::new()
            .still(20.0)
            .walking(walk, 2.0, 0.5)
            .still(pause)
            .walking(walk, 2.0, 0.5)
            .still(20.0)
    }

    pub fn total_duration(&self) -> f64 {
        self.segments.last().map_or(0.0, |s| s.end)
    }

    /// Segment active at `time`, if any
    pub fn segment_at(&self, time: f64) -> Option<&ActivitySegment> {
        self.segments.iter().find(|s| s.start <= time && time < s.end)
    }

    /// `(start, end)` seconds of every walking segment
    pub fn walking_intervals(&self) -> Vec<(f64, f64)> {
        self.segments
            .iter()
            .filter(|s| s.pattern.is_walking())
            .map(|s| (s.start, s.end))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_layout() {
        let schedule = ActivitySchedule::two_short_walks();
        assert_eq!(schedule.total_duration(), 200.0);
        assert_eq!(schedule.walking_intervals(), vec![(10.0, 15.0), (100.0, 105.0)]);
        assert!(schedule.segment_at(12.0).unwrap().pattern.is_walking());
        assert!(!schedule.segment_at(50.0).unwrap().pattern.is_walking());
        assert!(schedule.segment_at(200.0).is_none());
    }

    #[test]
    fn test_walking_oscillation() {
        let walk = ActivityPattern::Walking { step_frequency: 2.0, amplitude: 0.5 };
        assert!(walk.vertical_at(0.0).abs() < 1e-12);
        assert!((walk.vertical_at(0.125) - 0.5).abs() < 1e-12);
        assert_eq!(ActivityPattern::Still.vertical_at(3.0), 0.0);
        assert!(walk.is_walking());
    }
}
