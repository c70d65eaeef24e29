//! Mapping user-facing stations onto the codes a train actually uses.
//!
//! A passenger asking for `NDLS` may be served by a train stopping at `NZM`;
//! alias groups decide which codes count as the same place, and the boarding
//! departure time picks the right stop when a group has several on one route.

use itertools::Itertools;
use log::debug;

use crate::model::{StationGroups, StationId, TrainRoute};
use crate::time::normalize_clock;

/// Index of the stop where the passenger boards.
///
/// Preference order: a stop of the origin's group departing at the boarding
/// time, then any stop departing at that time, then the first stop of the
/// group.
pub fn boarding_index(
    route: &TrainRoute,
    origin_aliases: &[String],
    boarding_departure_raw: &str,
) -> Option<usize> {
    let clock = normalize_clock(boarding_departure_raw);
    let in_group = |code: &str| {
        origin_aliases
            .iter()
            .any(|alias| alias.eq_ignore_ascii_case(code.trim()))
    };
    let on_time = |raw: &str| clock.is_some() && normalize_clock(raw) == clock;

    let stops = &route.stops;
    stops
        .iter()
        .position(|s| in_group(&s.station_code) && on_time(&s.departure_time))
        .or_else(|| stops.iter().position(|s| on_time(&s.departure_time)))
        .or_else(|| stops.iter().position(|s| in_group(&s.station_code)))
}

/// Boarding code for this train and the destination codes to try, in route
/// order.
///
/// Destination candidates are stops after the boarding stop belonging to the
/// destination's group. When the route has none the whole group is returned
/// so the caller can still try each code.
pub fn resolve_station_codes(
    route: &TrainRoute,
    origin: &StationId,
    destination: &StationId,
    boarding_departure_raw: &str,
    groups: &StationGroups,
) -> (String, Vec<String>) {
    let origin_aliases = groups.aliases(origin.code());
    let destination_aliases = groups.aliases(destination.code());

    let boarding = boarding_index(route, &origin_aliases, boarding_departure_raw);
    let origin_code = boarding
        .and_then(|idx| route.stops.get(idx))
        .map_or_else(
            || origin.code().to_string(),
            |stop| stop.station_code.trim().to_ascii_uppercase(),
        );
    if boarding.is_none() {
        debug!(
            "Train {}: no stop departs at {boarding_departure_raw:?}, using {origin_code}",
            route.number
        );
    }

    let after = boarding.map_or(0, |idx| idx + 1);
    let mut destinations: Vec<String> = route
        .stops
        .iter()
        .skip(after)
        .map(|stop| stop.station_code.trim().to_ascii_uppercase())
        .filter(|code| destination_aliases.contains(code))
        .unique()
        .collect();
    if destinations.is_empty() {
        debug!(
            "Train {}: none of {destination_aliases:?} found after {origin_code}",
            route.number
        );
        destinations = destination_aliases;
    }

    (origin_code, destinations)
}
