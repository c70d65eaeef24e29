//! Seat assignment plans

use serde::{Deserialize, Serialize};

use super::seat::SeatSegmentRecord;
use crate::Minutes;

/// A stretch of the journey spent in one berth. Indices point into the
/// train's full stop list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatedSegment {
    pub from_station: String,
    pub to_station: String,
    pub from_index: usize,
    pub to_index: usize,
    pub seat: SeatSegmentRecord,
    pub minutes: Minutes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StandingStatus {
    /// No free berth covers this hop
    Standing,
    /// The chart had nothing usable for the whole journey
    NoSeatsAvailable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingSegment {
    pub from_station: String,
    pub to_station: String,
    pub from_index: usize,
    pub to_index: usize,
    pub minutes: Minutes,
    pub status: StandingStatus,
}

/// Seated and standing stretches for one `(train, origin, destination)`.
///
/// Together the segments cover `[origin, destination]` exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatAssignmentPlan {
    pub train_number: String,
    pub origin: String,
    pub destination: String,
    pub seated_segments: Vec<SeatedSegment>,
    pub standing_segments: Vec<StandingSegment>,
    pub total_minutes: Minutes,
    pub seated_minutes: Minutes,
    pub standing_minutes: Minutes,
    pub standing_percentage: f64,
}

impl SeatAssignmentPlan {
    pub fn standing_hours(&self) -> f64 {
        minutes_to_hours(self.standing_minutes)
    }

    pub fn is_empty(&self) -> bool {
        self.seated_segments.is_empty() && self.standing_segments.is_empty()
    }

    pub fn seat_changes(&self) -> usize {
        self.seated_segments.len().saturating_sub(1)
    }

    /// `(from_index, to_index)` of every segment in journey order
    pub fn spans(&self) -> Vec<(usize, usize)> {
        let mut spans: Vec<(usize, usize)> = self
            .seated_segments
            .iter()
            .map(|s| (s.from_index, s.to_index))
            .chain(self.standing_segments.iter().map(|s| (s.from_index, s.to_index)))
            .collect();
        spans.sort_unstable();
        spans
    }
}

#[allow(clippy::cast_precision_loss)]
pub fn minutes_to_hours(minutes: Minutes) -> f64 {
    minutes as f64 / 60.0
}
