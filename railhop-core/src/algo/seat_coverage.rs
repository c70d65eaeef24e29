//! Greedy interval covering of a journey with free berths.
//!
//! The journey `[origin, destination]` is walked left to right. At each
//! uncovered stop the berth that carries the passenger furthest is taken;
//! ties go to the berth that is most convenient after the previous one
//! (same coach, then a nearby coach of the same class, then an upgrade).
//! Stops no berth covers become one-hop standing segments.

use hashbrown::HashSet;
use log::{debug, trace};

use crate::Error;
use crate::model::plan::StandingStatus;
use crate::model::{
    RouteTimeline, SeatAssignmentPlan, SeatSegmentRecord, SeatedSegment, StandingSegment,
    TrainRoute,
};

const SAME_COACH_BONUS: i64 = 10_000;
const NEAR_BERTH_BONUS: i64 = 1_000;
const NEAR_COACH_BONUS: i64 = 500;
const UPGRADE_STEP_BONUS: i64 = 100;
const DOWNGRADE_ALLOWANCE: i64 = 50;
const CLASS_RANK_WEIGHT: i64 = 10;

/// A seat record clipped to the journey, in route indices
#[derive(Debug, Clone, Copy)]
struct Coverage {
    record: usize,
    start: usize,
    end: usize,
}

/// Builds seat assignment plans for one train route.
///
/// The optimizer borrows the route and keeps its timeline, so several
/// origin/destination pairs on the same train can be planned cheaply.
#[derive(Debug, Clone)]
pub struct SeatCoverageOptimizer<'a> {
    route: &'a TrainRoute,
    timeline: RouteTimeline,
}

impl<'a> SeatCoverageOptimizer<'a> {
    pub fn new(route: &'a TrainRoute) -> Self {
        Self {
            route,
            timeline: route.timeline(),
        }
    }

    fn index_of(&self, code: &str) -> Result<usize, Error> {
        self.route
            .position(code)
            .ok_or_else(|| Error::StationNotFound(code.trim().to_ascii_uppercase()))
    }

    fn station_code(&self, idx: usize) -> String {
        self.route
            .stops
            .get(idx)
            .map(|stop| stop.station_code.trim().to_ascii_uppercase())
            .unwrap_or_default()
    }

    /// Plans seats for `origin -> destination`.
    ///
    /// # Errors
    ///
    /// [`Error::StationNotFound`] if either station is not on the route,
    /// [`Error::InvalidRouteOrder`] if the origin is not strictly before the
    /// destination.
    pub fn plan(
        &self,
        records: &[SeatSegmentRecord],
        origin: &str,
        destination: &str,
    ) -> Result<SeatAssignmentPlan, Error> {
        let origin_idx = self.index_of(origin)?;
        let dest_idx = self.index_of(destination)?;
        if origin_idx >= dest_idx {
            return Err(Error::InvalidRouteOrder {
                origin: origin.to_string(),
                destination: destination.to_string(),
            });
        }

        let coverages = self.coverages(records, origin_idx, dest_idx);
        debug!(
            "Train {}: {} of {} seat segments cover part of {origin} -> {destination}",
            self.route.number,
            coverages.len(),
            records.len()
        );

        if coverages.is_empty() {
            return Ok(self.all_standing(origin_idx, dest_idx));
        }

        let mut seated = Vec::new();
        let mut standing = Vec::new();
        let mut used: HashSet<String> = HashSet::new();
        let mut previous: Option<&SeatSegmentRecord> = None;
        let mut position = origin_idx;

        while position < dest_idx {
            match self.best_seat(records, &coverages, &used, previous, position) {
                Some(cov) => {
                    let record = &records[cov.record];
                    let end = cov.end.min(dest_idx);
                    trace!(
                        "Seat {} covers {} -> {}",
                        record.seat_id(),
                        self.station_code(position),
                        self.station_code(end)
                    );
                    seated.push(SeatedSegment {
                        from_station: self.station_code(position),
                        to_station: self.station_code(end),
                        from_index: position,
                        to_index: end,
                        seat: record.clone(),
                        minutes: self.timeline.ride_minutes(position, end),
                    });
                    used.insert(record.seat_id());
                    previous = Some(record);
                    position = end;
                }
                None => {
                    standing.push(self.standing(position, position + 1, StandingStatus::Standing));
                    position += 1;
                }
            }
        }

        Ok(self.finish(origin_idx, dest_idx, seated, standing))
    }

    fn coverages(
        &self,
        records: &[SeatSegmentRecord],
        origin_idx: usize,
        dest_idx: usize,
    ) -> Vec<Coverage> {
        records
            .iter()
            .enumerate()
            .filter_map(|(record, seat)| {
                let from = self.route.position(&seat.from_code())?;
                let to = self.route.position(&seat.to_code())?;
                let start = from.max(origin_idx);
                let end = to.min(dest_idx);
                (start < end).then_some(Coverage { record, start, end })
            })
            .collect()
    }

    fn best_seat(
        &self,
        records: &[SeatSegmentRecord],
        coverages: &[Coverage],
        used: &HashSet<String>,
        previous: Option<&SeatSegmentRecord>,
        position: usize,
    ) -> Option<Coverage> {
        let mut best: Option<(Coverage, (usize, i64))> = None;
        for cov in coverages
            .iter()
            .filter(|cov| cov.start <= position && position < cov.end)
        {
            let record = &records[cov.record];
            if used.contains(&record.seat_id()) {
                continue;
            }
            let rank = (cov.end - position, preference_score(record, previous));
            // Strict comparison keeps the earliest record on full ties.
            if best.is_none_or(|(_, best_rank)| rank > best_rank) {
                best = Some((*cov, rank));
            }
        }
        best.map(|(cov, _)| cov)
    }

    fn standing(&self, from: usize, to: usize, status: StandingStatus) -> StandingSegment {
        StandingSegment {
            from_station: self.station_code(from),
            to_station: self.station_code(to),
            from_index: from,
            to_index: to,
            minutes: self.timeline.ride_minutes(from, to),
            status,
        }
    }

    fn all_standing(&self, origin_idx: usize, dest_idx: usize) -> SeatAssignmentPlan {
        let segment = self.standing(origin_idx, dest_idx, StandingStatus::NoSeatsAvailable);
        let minutes = segment.minutes;
        SeatAssignmentPlan {
            train_number: self.route.number.clone(),
            origin: self.station_code(origin_idx),
            destination: self.station_code(dest_idx),
            seated_segments: Vec::new(),
            standing_segments: vec![segment],
            total_minutes: minutes,
            seated_minutes: 0,
            standing_minutes: minutes,
            standing_percentage: 100.0,
        }
    }

    fn finish(
        &self,
        origin_idx: usize,
        dest_idx: usize,
        seated: Vec<SeatedSegment>,
        standing: Vec<StandingSegment>,
    ) -> SeatAssignmentPlan {
        let seated_minutes: i64 = seated.iter().map(|s| s.minutes).sum();
        let standing_minutes: i64 = standing.iter().map(|s| s.minutes).sum();
        let total_minutes = seated_minutes + standing_minutes;
        #[allow(clippy::cast_precision_loss)]
        let standing_percentage = if total_minutes > 0 {
            standing_minutes as f64 / total_minutes as f64 * 100.0
        } else {
            0.0
        };

        SeatAssignmentPlan {
            train_number: self.route.number.clone(),
            origin: self.station_code(origin_idx),
            destination: self.station_code(dest_idx),
            seated_segments: seated,
            standing_segments: standing,
            total_minutes,
            seated_minutes,
            standing_minutes,
            standing_percentage,
        }
    }
}

/// Tie-break score of `candidate` after `previous`
fn preference_score(candidate: &SeatSegmentRecord, previous: Option<&SeatSegmentRecord>) -> i64 {
    let class = candidate.seat_class();
    let mut score = 0;

    if let Some(prev) = previous {
        if candidate.coach == prev.coach {
            score += SAME_COACH_BONUS;
            if let (Some(a), Some(b)) = (candidate.berth_number(), prev.berth_number()) {
                score += (NEAR_BERTH_BONUS - (a - b).abs() * 10).max(0);
            }
        } else if candidate.category == prev.category {
            if let Some(diff) = coach_distance(&candidate.coach, &prev.coach) {
                score += (NEAR_COACH_BONUS - diff * 50).max(0);
            }
        } else if let (Some(curr), Some(prev)) = (class.rank(), prev.seat_class().rank()) {
            score += if curr > prev {
                (curr - prev) * UPGRADE_STEP_BONUS
            } else {
                (DOWNGRADE_ALLOWANCE - (prev - curr) * 10).max(0)
            };
        }
    }

    if let Some(rank) = class.rank() {
        score += rank * CLASS_RANK_WEIGHT;
    }
    score + candidate.berth().bonus()
}

/// Distance between the trailing characters of two coach labels, when both
/// end in a letter or both end in a digit
fn coach_distance(a: &str, b: &str) -> Option<i64> {
    let a = a.trim().chars().last()?;
    let b = b.trim().chars().last()?;
    if a.is_ascii_alphabetic() && b.is_ascii_alphabetic() {
        Some((i64::from(u32::from(a)) - i64::from(u32::from(b))).abs())
    } else if a.is_ascii_digit() && b.is_ascii_digit() {
        let a = i64::from(a.to_digit(10)?);
        let b = i64::from(b.to_digit(10)?);
        Some((a - b).abs())
    } else {
        None
    }
}

/// Plans seats for `origin -> destination` on `route`.
///
/// # Errors
///
/// See [`SeatCoverageOptimizer::plan`].
pub fn optimize(
    records: &[SeatSegmentRecord],
    route: &TrainRoute,
    origin: &str,
    destination: &str,
) -> Result<SeatAssignmentPlan, Error> {
    SeatCoverageOptimizer::new(route).plan(records, origin, destination)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Stop;

    fn route() -> TrainRoute {
        TrainRoute::new(
            "12345",
            vec![
                Stop::new("A", "Alpha", "Start", "08:00"),
                Stop::new("B", "Bravo", "09:00", "09:05"),
                Stop::new("C", "Charlie", "10:00", "10:05"),
                Stop::new("D", "Delta", "11:05", "11:10"),
                Stop::new("E", "Echo", "12:10", "Finish"),
            ],
        )
    }

    fn seat(coach: &str, berth: &str, from: &str, to: &str) -> SeatSegmentRecord {
        SeatSegmentRecord::new("SLEEPER", coach, berth, from, to)
    }

    #[test]
    fn seat_then_standing() {
        let plan = optimize(&[seat("S1", "10", "A", "C")], &route(), "A", "D").unwrap();
        assert_eq!(plan.seated_segments.len(), 1);
        assert_eq!(plan.seated_segments[0].from_station, "A");
        assert_eq!(plan.seated_segments[0].to_station, "C");
        assert_eq!(plan.standing_segments.len(), 1);
        assert_eq!(plan.standing_segments[0].from_station, "C");
        assert_eq!(plan.standing_segments[0].to_station, "D");
        assert_eq!(plan.seated_minutes, 120);
        assert_eq!(plan.standing_minutes, 60);
        assert_eq!(plan.total_minutes, 180);
    }

    #[test]
    fn longest_coverage_wins() {
        let records = [seat("S1", "1", "A", "C"), seat("S2", "2", "A", "E")];
        let plan = optimize(&records, &route(), "A", "E").unwrap();
        assert_eq!(plan.seated_segments.len(), 1);
        assert_eq!(plan.seated_segments[0].seat.coach, "S2");
        assert!(plan.standing_segments.is_empty());
        assert!(plan.standing_percentage.abs() < f64::EPSILON);
    }

    #[test]
    fn same_coach_breaks_ties() {
        let records = [
            seat("S1", "10", "A", "C"),
            seat("S4", "11", "C", "E"),
            seat("S1", "12", "C", "E"),
        ];
        let plan = optimize(&records, &route(), "A", "E").unwrap();
        assert_eq!(plan.seated_segments.len(), 2);
        assert_eq!(plan.seated_segments[1].seat.coach, "S1");
        assert_eq!(plan.seated_segments[1].seat.berth_no, "12");
    }

    #[test]
    fn upgrade_preferred_across_classes() {
        let first = SeatSegmentRecord::new("SLEEPER", "S1", "10", "A", "C");
        let downgrade = SeatSegmentRecord::new("THIRD AC (3E)", "M1", "10", "C", "E");
        let upgrade = SeatSegmentRecord::new("SECOND AC (2A)", "A1", "10", "C", "E");
        let plan = optimize(&[first, downgrade, upgrade], &route(), "A", "E").unwrap();
        assert_eq!(plan.seated_segments[1].seat.coach, "A1");
    }

    #[test]
    fn lower_berth_preferred() {
        let upper = seat("S1", "3", "A", "E").with_berth_type("Upper");
        let lower = seat("S2", "1", "A", "E").with_berth_type("Lower");
        let plan = optimize(&[upper, lower], &route(), "A", "E").unwrap();
        assert_eq!(plan.seated_segments[0].seat.coach, "S2");
    }

    #[test]
    fn seat_used_once() {
        // Same berth listed for two disjoint stretches
        let records = [seat("S1", "10", "A", "B"), seat("S1", "10", "C", "E")];
        let plan = optimize(&records, &route(), "A", "E").unwrap();
        assert_eq!(plan.seated_segments.len(), 1);
        assert_eq!(plan.standing_segments.len(), 3);
        assert_eq!(plan.spans(), vec![(0, 1), (1, 2), (2, 3), (3, 4)]);
    }

    #[test]
    fn no_coverage_is_all_standing() {
        let plan = optimize(&[seat("S1", "10", "D", "E")], &route(), "A", "C").unwrap();
        assert!(plan.seated_segments.is_empty());
        assert_eq!(plan.standing_segments.len(), 1);
        assert_eq!(plan.standing_segments[0].status, StandingStatus::NoSeatsAvailable);
        assert!((plan.standing_percentage - 100.0).abs() < f64::EPSILON);
        assert_eq!(plan.standing_minutes, 120);
    }

    #[test]
    fn rejects_bad_stations() {
        assert!(matches!(
            optimize(&[], &route(), "A", "Z"),
            Err(Error::StationNotFound(code)) if code == "Z"
        ));
        assert!(matches!(
            optimize(&[], &route(), "D", "B"),
            Err(Error::InvalidRouteOrder { .. })
        ));
        assert!(matches!(
            optimize(&[], &route(), "B", "B"),
            Err(Error::InvalidRouteOrder { .. })
        ));
    }

    #[test]
    fn coach_distance_compares_suffixes() {
        assert_eq!(coach_distance("S1", "S4"), Some(3));
        assert_eq!(coach_distance("A", "C"), Some(2));
        assert_eq!(coach_distance("S1", "B"), None);
    }
}
