//! Train stop sequences

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use super::station::StationId;
use crate::Minutes;
use crate::time::clock_time;

/// One stop of a train, as scraped. Times stay raw; they are interpreted
/// through [`crate::time`] when needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Stop {
    pub station_name: String,
    pub station_code: String,
    /// `Start` at the first stop
    pub arrival_time: String,
    /// `Finish` at the last stop
    pub departure_time: String,
    pub halt_duration: String,
}

impl Stop {
    pub fn new(
        station_code: &str,
        station_name: &str,
        arrival_time: &str,
        departure_time: &str,
    ) -> Self {
        Self {
            station_name: station_name.to_string(),
            station_code: station_code.to_string(),
            arrival_time: arrival_time.to_string(),
            departure_time: departure_time.to_string(),
            halt_duration: String::new(),
        }
    }

    pub fn station(&self) -> StationId {
        StationId::new(&self.station_code, self.station_name.clone())
    }

    pub fn matches_code(&self, code: &str) -> bool {
        self.station_code.trim().eq_ignore_ascii_case(code.trim())
    }
}

/// Ordered stop sequence of one train; `stops[0]` is the true origin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TrainRoute {
    pub number: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub stops: Vec<Stop>,
}

impl TrainRoute {
    pub fn new(number: impl Into<String>, stops: Vec<Stop>) -> Self {
        Self {
            number: number.into(),
            name: String::new(),
            stops,
        }
    }

    pub fn origin(&self) -> Option<&Stop> {
        self.stops.first()
    }

    /// Index of the first stop with this station code
    pub fn position(&self, code: &str) -> Option<usize> {
        self.stops.iter().position(|stop| stop.matches_code(code))
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn timeline(&self) -> RouteTimeline {
        RouteTimeline::new(&self.stops)
    }
}

/// Arrival and departure of every stop as minutes since midnight of the
/// origin's departure day.
///
/// Clock times are read in stop order and a day is added whenever the clock
/// goes backwards, so trains running several nights are measured correctly.
/// A missing arrival (the origin) borrows the departure and vice versa.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTimeline {
    arrivals: Vec<Minutes>,
    departures: Vec<Minutes>,
}

impl RouteTimeline {
    pub fn new(stops: &[Stop]) -> Self {
        let mut arrivals = Vec::with_capacity(stops.len());
        let mut departures = Vec::with_capacity(stops.len());
        let mut day_offset: Minutes = 0;
        let mut last: Option<Minutes> = None;

        let mut place = |clock: Option<NaiveTime>| -> Option<Minutes> {
            let time = clock?;
            let of_day = Minutes::from(time.num_seconds_from_midnight()) / 60;
            let mut absolute = of_day + day_offset;
            if let Some(prev) = last {
                if absolute < prev {
                    day_offset += 24 * 60;
                    absolute += 24 * 60;
                }
            }
            last = Some(absolute);
            Some(absolute)
        };

        for stop in stops {
            let arrival = place(clock_time(&stop.arrival_time));
            let departure = place(clock_time(&stop.departure_time));
            let (arrival, departure) = match (arrival, departure) {
                (Some(a), Some(d)) => (a, d),
                (Some(a), None) => (a, a),
                (None, Some(d)) => (d, d),
                (None, None) => {
                    let carried = departures.last().copied().unwrap_or(0);
                    (carried, carried)
                }
            };
            arrivals.push(arrival);
            departures.push(departure);
        }

        Self {
            arrivals,
            departures,
        }
    }

    pub fn arrival(&self, idx: usize) -> Option<Minutes> {
        self.arrivals.get(idx).copied()
    }

    pub fn departure(&self, idx: usize) -> Option<Minutes> {
        self.departures.get(idx).copied()
    }

    /// Riding time from departing stop `from` to arriving at stop `to`
    pub fn ride_minutes(&self, from: usize, to: usize) -> Minutes {
        match (self.departure(from), self.arrival(to)) {
            (Some(dep), Some(arr)) if to > from => (arr - dep).max(0),
            _ => 0,
        }
    }

    pub fn len(&self) -> usize {
        self.arrivals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrivals.is_empty()
    }
}
