#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::NaiveDate;
use railhop_core::prelude::*;

pub fn date(raw: &str) -> NaiveDate {
    railhop_core::time::parse_journey_date(raw).unwrap()
}

type Query = (String, String, NaiveDate);

/// Availability keyed by `(from code, to code, date)`; unknown queries
/// return no trains
#[derive(Default)]
pub struct StubAvailability {
    trains: HashMap<Query, Vec<TrainAvailability>>,
    failing: Vec<Query>,
    calls: Mutex<Vec<Query>>,
}

impl StubAvailability {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(
        mut self,
        from: &str,
        to: &str,
        on: NaiveDate,
        trains: Vec<TrainAvailability>,
    ) -> Self {
        self.trains.insert((from.into(), to.into(), on), trains);
        self
    }

    pub fn failing(mut self, from: &str, to: &str, on: NaiveDate) -> Self {
        self.failing.push((from.into(), to.into(), on));
        self
    }

    pub fn calls(&self) -> Vec<Query> {
        self.calls.lock().unwrap().clone()
    }
}

impl AvailabilityProvider for StubAvailability {
    fn search(
        &self,
        origin: &StationId,
        destination: &StationId,
        date: NaiveDate,
    ) -> Result<Vec<TrainAvailability>, Error> {
        let key = (origin.code().to_string(), destination.code().to_string(), date);
        self.calls.lock().unwrap().push(key.clone());
        if self.failing.contains(&key) {
            return Err(Error::ProviderUnavailable(format!("{key:?}")));
        }
        Ok(self.trains.get(&key).cloned().unwrap_or_default())
    }
}

/// Routes served regardless of the queried stations
#[derive(Default)]
pub struct StubRoutes {
    routes: Vec<TrainRoute>,
    broken: Vec<String>,
}

impl StubRoutes {
    pub fn new(routes: Vec<TrainRoute>) -> Self {
        Self {
            routes,
            broken: Vec::new(),
        }
    }

    /// Lookups targeting this train fail
    pub fn broken(mut self, number: &str) -> Self {
        self.broken.push(number.into());
        self
    }
}

impl RouteProvider for StubRoutes {
    fn routes(
        &self,
        _origin: &StationId,
        _destination: &StationId,
        _date: NaiveDate,
        target_train: Option<&str>,
    ) -> Result<Vec<TrainRoute>, Error> {
        match target_train {
            Some(target) if self.broken.iter().any(|b| b == target) => {
                Err(Error::ProviderUnavailable(format!("route of {target}")))
            }
            Some(target) => Ok(self
                .routes
                .iter()
                .filter(|r| r.number == target)
                .cloned()
                .collect()),
            None => Ok(self
                .routes
                .iter()
                .filter(|r| !self.broken.contains(&r.number))
                .cloned()
                .collect()),
        }
    }
}

#[derive(Default)]
pub struct StubCharts {
    charts: HashMap<String, Vec<SeatSegmentRecord>>,
    requests: Mutex<Vec<(String, ChartDay)>>,
}

impl StubCharts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, number: &str, records: Vec<SeatSegmentRecord>) -> Self {
        self.charts.insert(number.into(), records);
        self
    }

    pub fn requests(&self) -> Vec<(String, ChartDay)> {
        self.requests.lock().unwrap().clone()
    }
}

impl SeatChartProvider for StubCharts {
    fn seat_chart(
        &self,
        train_number: &str,
        day: ChartDay,
    ) -> Result<Vec<SeatSegmentRecord>, Error> {
        self.requests.lock().unwrap().push((train_number.into(), day));
        self.charts
            .get(train_number)
            .cloned()
            .ok_or_else(|| Error::ProviderUnavailable(format!("chart of {train_number}")))
    }
}

pub fn available(number: &str, departure: &str, arrival: &str) -> TrainAvailability {
    TrainAvailability::new(number, departure, arrival).with_class("SL", "AVL 42")
}

pub fn waitlisted(number: &str, departure: &str, arrival: &str) -> TrainAvailability {
    TrainAvailability::new(number, departure, arrival).with_class("SL", "WL 17")
}

/// `(code, arrival, departure)` triples to a route
pub fn route(number: &str, stops: &[(&str, &str, &str)]) -> TrainRoute {
    TrainRoute::new(
        number,
        stops
            .iter()
            .map(|(code, arrival, departure)| Stop::new(code, code, arrival, departure))
            .collect(),
    )
}
