mod common;

use std::collections::HashSet;
use std::sync::Arc;

use common::{StubAvailability, StubRoutes, available, date, route, waitlisted};
use railhop_core::prelude::*;

fn station(code: &str) -> StationId {
    StationId::parse(code)
}

fn engine(availability: Arc<StubAvailability>, routes: StubRoutes) -> RouteSearchEngine {
    RouteSearchEngine::new(availability, Arc::new(routes), Arc::new(StopsCache::in_memory()))
}

fn assert_valid(itineraries: &[Itinerary]) {
    let mut keys = HashSet::new();
    for itinerary in itineraries {
        if let [first, second] = itinerary.legs.as_slice() {
            assert_eq!(first.to_station, second.from_station);
            assert!(itinerary.connection_minutes().unwrap() >= MIN_CONNECTION_MINUTES);
            assert!(keys.insert(itinerary.key().unwrap()), "duplicate itinerary");
        }
    }
}

#[test]
fn direct_routes_skip_transfer_search() {
    let day = date("20250601");
    let availability = Arc::new(
        StubAvailability::new().with(
            "NDLS",
            "BCT",
            day,
            vec![
                available("12952", "16:55", "08:35"),
                waitlisted("12954", "17:15", "10:05"),
                available("22210", "23:00", "15:50"),
            ],
        ),
    );
    let engine = engine(Arc::clone(&availability), StubRoutes::default());

    let found = engine.find_routes(&station("NDLS"), &station("BCT"), day, 2);
    assert_eq!(found.len(), 2);
    assert!(found.iter().all(Itinerary::is_direct));
    assert_eq!(found[0].legs[0].train_number, "12952");
    assert_eq!(found[1].legs[0].train_number, "22210");
    // Overnight arrival rolls to the next day
    assert_eq!(found[0].legs[0].arrival_date(), date("20250602"));
    assert_eq!(availability.calls().len(), 1);

    let again = engine.find_routes(&station("NDLS"), &station("BCT"), day, 2);
    assert_eq!(again, found);
}

#[test]
fn nothing_from_origin_is_empty() {
    let day = date("20250601");
    let availability = Arc::new(StubAvailability::new().failing("NDLS", "BCT", day));
    let found = engine(availability, StubRoutes::default())
        .find_routes(&station("NDLS"), &station("BCT"), day, 3);
    assert!(found.is_empty());
}

#[test]
fn finds_transfer_and_caches_route() {
    let day = date("20250601");
    let availability = Arc::new(
        StubAvailability::new()
            .with("A", "C", day, vec![waitlisted("11111", "08:00", "14:00")])
            .with("B", "C", day, vec![available("22222", "10:30", "13:00")])
            .with("A", "B", day, vec![available("11111", "08:00", "10:00")]),
    );
    let routes = StubRoutes::new(vec![route(
        "11111",
        &[("A", "Start", "08:00"), ("B", "10:00", "10:05"), ("C", "14:00", "Finish")],
    )]);
    let engine = engine(availability, routes);

    let found = engine.find_routes(&station("A"), &station("C"), day, 3);
    assert_eq!(found.len(), 1);
    assert_valid(&found);
    let itinerary = &found[0];
    assert_eq!(itinerary.transfer_station().map(StationId::code), Some("B"));
    assert_eq!(itinerary.legs[0].train_number, "11111");
    assert_eq!(itinerary.legs[1].train_number, "22222");
    assert_eq!(itinerary.connection_minutes(), Some(30));
    assert!(engine.cache().get("11111").is_some());
}

#[test]
fn short_connection_is_rejected() {
    let day = date("20250601");
    let availability = Arc::new(
        StubAvailability::new()
            .with("A", "C", day, vec![waitlisted("11111", "08:00", "14:00")])
            .with("B", "C", day, vec![available("22222", "10:20", "13:00")])
            .with("A", "B", day, vec![available("11111", "08:00", "10:00")]),
    );
    let routes = StubRoutes::new(vec![route(
        "11111",
        &[("A", "Start", "08:00"), ("B", "10:00", "10:05"), ("C", "14:00", "Finish")],
    )]);

    let found = engine(availability, routes).find_routes(&station("A"), &station("C"), day, 3);
    assert!(found.is_empty());
}

#[test]
fn late_arrival_searches_next_day() {
    let day = date("20250601");
    let next = date("20250602");
    let availability = Arc::new(
        StubAvailability::new()
            .with("A", "C", day, vec![waitlisted("11111", "20:00", "06:00")])
            .with("B", "C", next, vec![available("33333", "01:00", "05:00")])
            .with("A", "B", day, vec![available("11111", "20:00", "23:45")]),
    );
    let routes = StubRoutes::new(vec![route(
        "11111",
        &[("A", "Start", "20:00"), ("B", "23:45", "23:50"), ("C", "06:00", "Finish")],
    )]);

    let found = engine(Arc::clone(&availability), routes)
        .find_routes(&station("A"), &station("C"), day, 1);
    assert_eq!(found.len(), 1);
    assert_valid(&found);
    assert_eq!(found[0].legs[1].departure_date(), next);
    assert_eq!(found[0].connection_minutes(), Some(75));

    let calls = availability.calls();
    assert!(calls.contains(&("B".into(), "C".into(), next)));
    assert!(!calls.contains(&("B".into(), "C".into(), day)));
}

#[test]
fn waitlisted_connection_day_retries_next_day() {
    let day = date("20250601");
    let next = date("20250602");
    let availability = Arc::new(
        StubAvailability::new()
            .with("A", "C", day, vec![waitlisted("11111", "08:00", "14:00")])
            .with("B", "C", day, vec![waitlisted("33333", "12:00", "16:00")])
            .with("B", "C", next, vec![available("33333", "06:00", "10:00")])
            .with("A", "B", day, vec![available("11111", "08:00", "10:00")]),
    );
    let routes = StubRoutes::new(vec![route(
        "11111",
        &[("A", "Start", "08:00"), ("B", "10:00", "10:05"), ("C", "14:00", "Finish")],
    )]);

    let found = engine(Arc::clone(&availability), routes)
        .find_routes(&station("A"), &station("C"), day, 1);
    assert_eq!(found.len(), 1);
    assert_valid(&found);
    let second = &found[0].legs[1];
    assert_eq!(second.train_number, "33333");
    assert_eq!(second.departure_date(), next);
    assert_eq!(found[0].connection_minutes(), Some(20 * 60));

    let calls = availability.calls();
    assert!(calls.contains(&("B".into(), "C".into(), day)));
    assert!(calls.contains(&("B".into(), "C".into(), next)));
}

#[test]
fn concurrent_workers_do_not_duplicate() {
    let day = date("20250601");
    let stops = [("A", "Start", "08:00"), ("B", "10:00", "10:05"), ("C", "14:00", "Finish")];
    let availability = Arc::new(
        StubAvailability::new()
            .with(
                "A",
                "C",
                day,
                vec![
                    waitlisted("11111", "08:00", "14:00"),
                    waitlisted("11112", "08:00", "14:00"),
                    waitlisted("11113", "08:00", "14:00"),
                ],
            )
            .with("B", "C", day, vec![available("22222", "11:00", "13:00")])
            .with("A", "B", day, vec![available("11111", "08:00", "10:00")]),
    );
    let routes = StubRoutes::new(vec![
        route("11111", &stops),
        route("11112", &stops),
        route("11113", &stops),
    ]);

    let found = engine(availability, routes).find_routes(&station("A"), &station("C"), day, 5);
    assert_eq!(found.len(), 1);
    assert_valid(&found);
}

#[test]
fn stops_at_max_routes() {
    let day = date("20250601");
    let mut availability = StubAvailability::new().with(
        "A",
        "C",
        day,
        vec![
            waitlisted("11111", "08:00", "14:00"),
            waitlisted("11112", "08:00", "14:00"),
            waitlisted("11113", "08:00", "14:00"),
            waitlisted("11114", "08:00", "14:00"),
        ],
    );
    let mut routes = Vec::new();
    for (train, via, onward) in [
        ("11111", "B1", "22221"),
        ("11112", "B2", "22222"),
        ("11113", "B3", "22223"),
        ("11114", "B4", "22224"),
    ] {
        availability = availability
            .with(via, "C", day, vec![available(onward, "11:00", "13:00")])
            .with("A", via, day, vec![available(train, "08:00", "10:00")]);
        routes.push(route(
            train,
            &[("A", "Start", "08:00"), (via, "10:00", "10:05"), ("C", "14:00", "Finish")],
        ));
    }

    let found = engine(Arc::new(availability), StubRoutes::new(routes))
        .find_routes(&station("A"), &station("C"), day, 2);
    assert_eq!(found.len(), 2);
    assert_valid(&found);
}

#[test]
fn direct_results_count_toward_quota() {
    let day = date("20250601");
    let availability = Arc::new(
        StubAvailability::new()
            .with(
                "A",
                "C",
                day,
                vec![available("12000", "07:00", "12:00"), waitlisted("11111", "08:00", "14:00")],
            )
            .with("B", "C", day, vec![available("22222", "10:30", "13:00")])
            .with("A", "B", day, vec![available("11111", "08:00", "10:00")]),
    );
    let routes = StubRoutes::new(vec![route(
        "11111",
        &[("A", "Start", "08:00"), ("B", "10:00", "10:05"), ("C", "14:00", "Finish")],
    )]);

    let found = engine(availability, routes).find_routes(&station("A"), &station("C"), day, 2);
    assert_eq!(found.len(), 2);
    assert!(found[0].is_direct());
    assert!(!found[1].is_direct());
    assert_valid(&found);
}

#[test]
fn broken_route_provider_is_not_fatal() {
    let day = date("20250601");
    let availability = Arc::new(
        StubAvailability::new().with("A", "C", day, vec![waitlisted("11111", "08:00", "14:00")]),
    );
    let routes = StubRoutes::default().broken("11111");
    let found = find_routes(&station("A"), &station("C"), day, availability, Arc::new(routes), 2);
    assert!(found.is_empty());
}
