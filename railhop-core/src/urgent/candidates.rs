use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use chrono::{Duration, NaiveDate, NaiveDateTime};
use hashbrown::HashMap;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::stations::boarding_index;
use crate::config::UrgentConfig;
use crate::loading::{StopsCache, normalize_train_number};
use crate::model::{ClassAvailability, StationGroups, StationId, TrainAvailability, TrainRoute};
use crate::providers::{AvailabilityProvider, RouteProvider};
use crate::routing::pick_route;
use crate::time::{Clock, clock_time, next_day, parse_train_time};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// No route could be found in the cache or fetched
    RouteScrapingFailed,
    /// The route was found but has no usable origin stop
    NoOriginInfo,
}

/// A train considered by urgent mode, valid for one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainCandidate {
    /// Numeric core of the train number
    pub number: String,
    /// Number as returned by the search
    pub original_number: String,
    pub name: String,
    pub boarding_departure_raw: String,
    pub boarding_departure: Option<NaiveDateTime>,
    pub true_origin: Option<StationId>,
    pub true_origin_departure: Option<NaiveDateTime>,
    pub is_fallback: bool,
    pub fallback_reason: Option<FallbackReason>,
    pub warning: Option<String>,
    pub classes: Vec<ClassAvailability>,
}

impl TrainCandidate {
    /// True-origin departure, or the boarding departure for fallbacks
    pub fn sort_key(&self) -> Option<NaiveDateTime> {
        self.true_origin_departure.or(self.boarding_departure)
    }

    fn from_search(train: &TrainAvailability, journey_date: NaiveDate) -> Self {
        let boarding_departure = match parse_train_time(&train.departure_time, journey_date) {
            Ok(departure) => Some(departure),
            Err(e) => {
                debug!("Train {}: {e}", train.number);
                None
            }
        };
        Self {
            number: normalize_train_number(&train.number),
            original_number: train.number.trim().to_string(),
            name: train.name.trim().to_string(),
            boarding_departure_raw: train.departure_time.trim().to_string(),
            boarding_departure,
            true_origin: None,
            true_origin_departure: None,
            is_fallback: false,
            fallback_reason: None,
            warning: None,
            classes: train.classes.clone(),
        }
    }

    fn into_fallback(mut self, reason: FallbackReason) -> Self {
        self.warning = Some(format!(
            "Could not verify the route of train {}; window checked at the boarding station",
            self.number
        ));
        self.is_fallback = true;
        self.fallback_reason = Some(reason);
        self
    }
}

type SearchKey = (String, String, NaiveDate);

/// Near-term trains between two stations ordered by true-origin departure.
///
/// Holds a per-request memo of processed train lists; build a new selector
/// for every analysis run.
pub struct CandidateSelector {
    availability: Arc<dyn AvailabilityProvider>,
    routes: Arc<dyn RouteProvider>,
    cache: Arc<StopsCache>,
    groups: Arc<StationGroups>,
    clock: Arc<dyn Clock>,
    config: UrgentConfig,
    memo: Mutex<HashMap<SearchKey, Vec<TrainCandidate>>>,
}

impl CandidateSelector {
    pub fn new(
        availability: Arc<dyn AvailabilityProvider>,
        routes: Arc<dyn RouteProvider>,
        cache: Arc<StopsCache>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            availability,
            routes,
            cache,
            groups: Arc::new(StationGroups::default()),
            clock,
            config: UrgentConfig::default(),
            memo: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn with_groups(mut self, groups: Arc<StationGroups>) -> Self {
        self.groups = groups;
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: UrgentConfig) -> Self {
        self.config = config;
        self
    }

    /// Urgent mode only serves today and tomorrow in the journey timezone
    pub fn is_supported_date(&self, journey_date: NaiveDate) -> bool {
        let today = self.clock.today();
        journey_date == today || journey_date == next_day(today)
    }

    /// Up to `max_candidates` trains not in `exclude`, earliest first
    pub fn get_candidates(
        &self,
        origin: &StationId,
        destination: &StationId,
        journey_date: NaiveDate,
        exclude: &BTreeSet<String>,
        max_candidates: usize,
    ) -> Vec<TrainCandidate> {
        let mut candidates: Vec<TrainCandidate> = self
            .all_candidates(origin, destination, journey_date)
            .into_iter()
            .filter(|candidate| !exclude.contains(&candidate.number))
            .collect();
        // Stable: trains without any usable time keep their order at the tail.
        candidates.sort_by_key(|c| (c.sort_key().is_none(), c.sort_key()));
        candidates.truncate(max_candidates);
        candidates
    }

    /// Every train in the window, memoized per search
    fn all_candidates(
        &self,
        origin: &StationId,
        destination: &StationId,
        journey_date: NaiveDate,
    ) -> Vec<TrainCandidate> {
        let key = (
            origin.code().to_string(),
            destination.code().to_string(),
            journey_date,
        );
        if let Some(cached) = self
            .memo
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(&key)
        {
            return cached.clone();
        }

        let candidates = self.collect_candidates(origin, destination, journey_date);
        self.memo
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(key, candidates.clone());
        candidates
    }

    fn collect_candidates(
        &self,
        origin: &StationId,
        destination: &StationId,
        journey_date: NaiveDate,
    ) -> Vec<TrainCandidate> {
        if !self.is_supported_date(journey_date) {
            info!("Journey date {journey_date} is neither today nor tomorrow");
            return Vec::new();
        }

        let trains = match self.availability.search(origin, destination, journey_date) {
            Ok(trains) => trains,
            Err(e) => {
                warn!("Train search {origin} -> {destination} failed: {e}");
                return Vec::new();
            }
        };

        let now = self.clock.now().naive_local();
        let window_end = now + self.config.lookahead();
        let in_window = |departure: NaiveDateTime| now <= departure && departure <= window_end;
        let origin_aliases = self.groups.aliases(origin.code());

        let mut candidates = Vec::new();
        for train in &trains {
            if train.number.trim().is_empty() {
                continue;
            }
            let mut candidate = TrainCandidate::from_search(train, journey_date);
            let Some(boarding) = candidate.boarding_departure else {
                continue;
            };

            let route = self.resolve_route(
                origin,
                destination,
                journey_date,
                &candidate.number,
                &candidate.original_number,
            );
            let origin_stop = route.as_ref().and_then(|r| r.origin().map(|stop| (r, stop)));

            let Some((route, first)) = origin_stop else {
                let reason = if route.is_some() {
                    FallbackReason::NoOriginInfo
                } else {
                    FallbackReason::RouteScrapingFailed
                };
                if in_window(boarding) {
                    warn!("Train {}: using boarding time as fallback", candidate.number);
                    candidates.push(candidate.into_fallback(reason));
                }
                continue;
            };

            let Some(departure) = true_origin_departure(
                route,
                &origin_aliases,
                &candidate.boarding_departure_raw,
                boarding,
                journey_date,
            ) else {
                debug!("Train {}: origin departure unusable", candidate.number);
                continue;
            };

            if departure < now {
                debug!(
                    "Train {} already left {} at {departure}",
                    candidate.number, first.station_code
                );
                continue;
            }
            if !in_window(departure) {
                debug!(
                    "Train {} leaves its origin at {departure}, outside window",
                    candidate.number
                );
                continue;
            }

            candidate.true_origin = Some(first.station());
            candidate.true_origin_departure = Some(departure);
            candidates.push(candidate);
        }

        info!(
            "{} of {} trains leave their origin within {}h",
            candidates.len(),
            trains.len(),
            self.config.lookahead_hours
        );
        candidates
    }

    /// Route of a train: cache first, then the provider targeted by the
    /// normalized number, by the raw number, and finally unfiltered.
    pub fn resolve_route(
        &self,
        origin: &StationId,
        destination: &StationId,
        journey_date: NaiveDate,
        number: &str,
        original_number: &str,
    ) -> Option<TrainRoute> {
        if let Some(stops) = self.cache.get_any(original_number) {
            return Some(TrainRoute::new(number, stops));
        }

        let mut targets = vec![Some(number)];
        if original_number != number && !original_number.is_empty() {
            targets.push(Some(original_number));
        }
        targets.push(None);

        for target in targets {
            let routes = match self.routes.routes(origin, destination, journey_date, target) {
                Ok(routes) => routes,
                Err(e) => {
                    debug!("Route lookup for {number} (target {target:?}) failed: {e}");
                    continue;
                }
            };
            let route = if target.is_some() {
                pick_route(routes, number)
            } else {
                routes
                    .into_iter()
                    .find(|r| !r.is_empty() && normalize_train_number(&r.number) == number)
            };
            if let Some(route) = route {
                if let Err(e) = self.cache.put(number, route.stops.clone()) {
                    warn!("Could not cache stops of train {number}: {e}");
                }
                return Some(route);
            }
        }
        None
    }
}

/// Departure from the first stop, dated by walking back from the boarding
/// departure along the route. Without a boarding stop the clock time of the
/// first stop is placed on the journey date.
fn true_origin_departure(
    route: &TrainRoute,
    origin_aliases: &[String],
    boarding_raw: &str,
    boarding: NaiveDateTime,
    journey_date: NaiveDate,
) -> Option<NaiveDateTime> {
    let timeline = route.timeline();
    let elapsed = boarding_index(route, origin_aliases, boarding_raw)
        .and_then(|idx| Some(timeline.departure(idx)? - timeline.departure(0)?));
    match elapsed {
        Some(minutes) => Some(boarding - Duration::minutes(minutes)),
        None => route
            .origin()
            .and_then(|stop| clock_time(&stop.departure_time))
            .map(|time| journey_date.and_time(time)),
    }
}
