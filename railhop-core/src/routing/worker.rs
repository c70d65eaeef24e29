use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use hashbrown::HashSet;
use log::{debug, info, trace, warn};

use super::state::{CancellationToken, Claim, FoundRoutes};
use crate::Error;
use crate::config::SearchConfig;
use crate::loading::{StopsCache, normalize_train_number};
use crate::model::{Itinerary, Leg, StationId, TrainAvailability, TrainRoute};
use crate::providers::{AvailabilityProvider, RouteProvider};
use crate::time::{next_day, parse_train_time};

/// Availability query where a failing provider just means "no trains"
pub(super) fn query(
    provider: &dyn AvailabilityProvider,
    from: &StationId,
    to: &StationId,
    date: NaiveDate,
) -> Vec<TrainAvailability> {
    match provider.search(from, to, date) {
        Ok(trains) => trains,
        Err(e) => {
            warn!("Availability lookup {from} -> {to} on {date} failed: {e}");
            Vec::new()
        }
    }
}

/// Legs of the trains in `trains` that have bookable seats. Trains with
/// unparseable times are dropped.
pub(super) fn bookable_legs(
    trains: &[TrainAvailability],
    from: &StationId,
    to: &StationId,
    date: NaiveDate,
) -> Vec<Leg> {
    trains
        .iter()
        .filter(|train| train.has_seats())
        .filter_map(|train| match Leg::from_availability(train, from, to, date) {
            Ok(leg) => Some(leg),
            Err(e) => {
                debug!("Skipping train {}: {e}", train.number);
                None
            }
        })
        .collect()
}

/// State shared by the workers of one transfer search
pub(super) struct TransferSearch {
    pub availability: Arc<dyn AvailabilityProvider>,
    pub routes: Arc<dyn RouteProvider>,
    pub cache: Arc<StopsCache>,
    pub config: SearchConfig,
    pub origin: StationId,
    pub destination: StationId,
    pub date: NaiveDate,
    pub found: Mutex<FoundRoutes>,
    pub cancel: CancellationToken,
}

impl TransferSearch {
    /// Searches transfers along one first-leg train. Errors end this train's
    /// branch only.
    pub fn run(&self, train: &TrainAvailability) -> Option<Itinerary> {
        let thread = std::thread::current();
        let worker = thread.name().unwrap_or("route-worker");
        match self.search_train(worker, train) {
            Ok(found) => found,
            Err(e) => {
                warn!("{worker}: error processing train {}: {e}", train.number);
                None
            }
        }
    }

    fn search_train(
        &self,
        worker: &str,
        train: &TrainAvailability,
    ) -> Result<Option<Itinerary>, Error> {
        if self.cancel.is_cancelled() {
            return Ok(None);
        }
        let number = normalize_train_number(&train.number);
        let Some(route) = self.route_of(worker, &number)? else {
            debug!("{worker}: no route data for train {number}");
            return Ok(None);
        };

        info!("{worker}: processing {} stops of train {number}", route.stops.len());
        let mut processed: HashSet<String> = HashSet::new();

        for stop in &route.stops {
            if self.cancel.is_cancelled() {
                return Ok(None);
            }
            let station = stop.station();
            if station == self.origin
                || station == self.destination
                || !processed.insert(station.code().to_string())
            {
                continue;
            }

            let arrival = match parse_train_time(&stop.arrival_time, self.date) {
                Ok(arrival) => arrival,
                Err(e) => {
                    debug!("{worker}: skipping {station}: {e}");
                    continue;
                }
            };
            let connection_date = if arrival.time() >= self.config.late_arrival_cutoff {
                next_day(self.date)
            } else {
                self.date
            };

            let second_legs = self.second_legs(&station, connection_date);
            if second_legs.is_empty() {
                trace!("{worker}: no seats from {station} to {}", self.destination);
                continue;
            }

            let first_legs = bookable_legs(
                &query(self.availability.as_ref(), &self.origin, &station, self.date),
                &self.origin,
                &station,
                self.date,
            );

            for first in &first_legs {
                for second in &second_legs {
                    if self.cancel.is_cancelled() {
                        return Ok(None);
                    }
                    let itinerary = Itinerary::with_transfer(first.clone(), second.clone());
                    if let Some(found) = self.offer(worker, itinerary) {
                        return Ok(found);
                    }
                }
            }
        }
        Ok(None)
    }

    /// `Some(result)` ends the worker, `None` keeps it searching
    fn offer(&self, worker: &str, itinerary: Itinerary) -> Option<Option<Itinerary>> {
        let key = itinerary.key()?;
        let mut found = self
            .found
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if found.contains(&key) || !itinerary.is_valid(self.config.min_connection_minutes) {
            return None;
        }
        match found.claim(key) {
            Claim::Accepted => {
                info!(
                    "{worker}: found valid route {} -> {} -> {}",
                    itinerary.legs[0].train_number,
                    itinerary.legs[0].to_station,
                    itinerary.legs[1].train_number
                );
                Some(Some(itinerary))
            }
            Claim::Duplicate => None,
            Claim::QuotaReached => {
                self.cancel.cancel();
                Some(None)
            }
        }
    }

    /// Bookable legs from `station` to the destination on `date`, or on the
    /// day after when `date` has none
    fn second_legs(&self, station: &StationId, date: NaiveDate) -> Vec<Leg> {
        let legs = bookable_legs(
            &query(self.availability.as_ref(), station, &self.destination, date),
            station,
            &self.destination,
            date,
        );
        if !legs.is_empty() {
            return legs;
        }
        let next = next_day(date);
        bookable_legs(
            &query(self.availability.as_ref(), station, &self.destination, next),
            station,
            &self.destination,
            next,
        )
    }

    /// Cached route of `number`, else fetched and written through
    fn route_of(&self, worker: &str, number: &str) -> Result<Option<TrainRoute>, Error> {
        if let Some(stops) = self.cache.get_any(number) {
            debug!("{worker}: using cached stops for train {number}");
            return Ok(Some(TrainRoute::new(number, stops)));
        }

        debug!("{worker}: fetching route for train {number}");
        let routes =
            self.routes
                .routes(&self.origin, &self.destination, self.date, Some(number))?;
        let Some(route) = pick_route(routes, number) else {
            return Ok(None);
        };
        if let Err(e) = self.cache.put(number, route.stops.clone()) {
            warn!("{worker}: could not cache stops of train {number}: {e}");
        }
        Ok(Some(route))
    }
}

/// The non-empty route numbered `number`, else the first non-empty one
pub(crate) fn pick_route(routes: Vec<TrainRoute>, number: &str) -> Option<TrainRoute> {
    let mut routes: Vec<TrainRoute> = routes.into_iter().filter(|r| !r.is_empty()).collect();
    let idx = routes
        .iter()
        .position(|r| normalize_train_number(&r.number) == number)
        .unwrap_or(0);
    (idx < routes.len()).then(|| routes.swap_remove(idx))
}
