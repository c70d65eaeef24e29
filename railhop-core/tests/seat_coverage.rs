mod common;

use std::collections::HashSet;

use common::route;
use railhop_core::prelude::*;

#[test]
fn seat_to_c_then_standing_to_d() {
    let route = route(
        "12345",
        &[
            ("A", "Start", "06:00"),
            ("B", "07:00", "07:05"),
            ("C", "08:00", "08:05"),
            ("D", "09:30", "Finish"),
        ],
    );
    let chart = vec![SeatSegmentRecord::new("SLEEPER", "S3", "41", "A", "C")];

    let plan = optimize(&chart, &route, "A", "D").unwrap();

    assert_eq!(plan.seated_segments.len(), 1);
    let seated = &plan.seated_segments[0];
    assert_eq!((seated.from_station.as_str(), seated.to_station.as_str()), ("A", "C"));
    assert_eq!(plan.standing_segments.len(), 1);
    let standing = &plan.standing_segments[0];
    assert_eq!((standing.from_station.as_str(), standing.to_station.as_str()), ("C", "D"));
    assert_eq!(plan.standing_minutes, 85);
    assert_eq!(plan.total_minutes, 205);
}

#[test]
fn multi_day_journey_totals() {
    let route = route(
        "12951",
        &[
            ("NDLS", "Start", "16:55"),
            ("KOTA", "21:40", "21:50"),
            ("BRC", "03:48", "03:58"),
            ("BCT", "08:35", "Finish"),
        ],
    );
    let chart = vec![
        SeatSegmentRecord::new("THIRD AC (3A)", "B2", "14", "NDLS", "BRC"),
        SeatSegmentRecord::new("THIRD AC (3A)", "B4", "22", "BRC", "BCT"),
    ];

    let plan = optimize(&chart, &route, "NDLS", "BCT").unwrap();
    assert!(plan.standing_segments.is_empty());
    // Halts are not travel time
    assert_eq!(plan.total_minutes, 15 * 60 + 30);
    assert_eq!(plan.seat_changes(), 1);
}

/// Small deterministic generator for chart fuzzing
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: usize) -> usize {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        ((self.0 >> 33) % bound as u64) as usize
    }
}

#[test]
fn plans_always_tile_the_journey() {
    let codes = ["S0", "S1", "S2", "S3", "S4", "S5", "S6", "S7", "S8", "S9", "S10", "S11"];
    let stops: Vec<(String, String, String)> = codes
        .iter()
        .enumerate()
        .map(|(i, code)| {
            let arrival = if i == 0 {
                "Start".to_string()
            } else {
                format!("{:02}:00", (i * 3) % 24)
            };
            let departure = if i == codes.len() - 1 {
                "Finish".to_string()
            } else {
                format!("{:02}:10", (i * 3) % 24)
            };
            ((*code).to_string(), arrival, departure)
        })
        .collect();
    let borrowed: Vec<(&str, &str, &str)> = stops
        .iter()
        .map(|(c, a, d)| (c.as_str(), a.as_str(), d.as_str()))
        .collect();
    let route = route("99999", &borrowed);
    let categories = ["SLEEPER", "THIRD AC (3A)", "SECOND AC (2A)"];
    let coaches = ["S1", "S2", "B1", "A1"];

    let mut rng = Lcg(7);
    for _ in 0..200 {
        let chart: Vec<SeatSegmentRecord> = (0..rng.next(8))
            .map(|_| {
                let from = rng.next(codes.len());
                let to = rng.next(codes.len());
                SeatSegmentRecord::new(
                    categories[rng.next(categories.len())],
                    coaches[rng.next(coaches.len())],
                    &rng.next(6).to_string(),
                    codes[from],
                    codes[to],
                )
            })
            .collect();
        let origin = rng.next(codes.len() - 1);
        let destination = origin + 1 + rng.next(codes.len() - origin - 1);

        let plan = optimize(&chart, &route, codes[origin], codes[destination]).unwrap();

        let spans = plan.spans();
        assert_eq!(spans.first().map(|s| s.0), Some(origin));
        assert_eq!(spans.last().map(|s| s.1), Some(destination));
        for pair in spans.windows(2) {
            assert_eq!(pair[0].1, pair[1].0, "gap or overlap in {spans:?}");
        }
        assert!(spans.iter().all(|(from, to)| from < to));

        let mut seats = HashSet::new();
        for seated in &plan.seated_segments {
            assert!(seats.insert(seated.seat.seat_id()), "seat reused");
        }

        assert!((0.0..=100.0).contains(&plan.standing_percentage));
        assert_eq!(plan.total_minutes, plan.seated_minutes + plan.standing_minutes);
    }
}
