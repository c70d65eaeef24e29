//! Direct and single-transfer itinerary search.
//!
//! Direct trains with bookable seats are always collected first. Only when
//! they do not fill the quota are the trains leaving the origin fanned out to
//! a bounded worker pool, each worker walking its train's stops for a transfer
//! station with seats onward.

mod engine;
mod state;
mod worker;

use std::sync::Arc;

use chrono::NaiveDate;

pub use engine::RouteSearchEngine;
pub use state::CancellationToken;
pub(crate) use worker::pick_route;

use crate::loading::StopsCache;
use crate::model::{Itinerary, StationId};
use crate::providers::{AvailabilityProvider, RouteProvider};

/// Up to `max_routes` itineraries from `origin` to `destination` on `date`,
/// with default settings and a throwaway in-memory stops cache.
pub fn find_routes(
    origin: &StationId,
    destination: &StationId,
    date: NaiveDate,
    availability: Arc<dyn AvailabilityProvider>,
    routes: Arc<dyn RouteProvider>,
    max_routes: usize,
) -> Vec<Itinerary> {
    RouteSearchEngine::new(availability, routes, Arc::new(StopsCache::in_memory()))
        .find_routes(origin, destination, date, max_routes)
}
